use serde::Serialize;

/// Provider engine identifier to connection driver name.
pub fn engine_alias(engine: &str) -> &str {
    match engine {
        "pg" => "pgsql",
        other => other,
    }
}

/// Finalized connection parameters for the deployment environment.
///
/// Serializes to the `DB_*` variable map in a fixed order.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CredentialBundle {
    #[serde(rename = "DB_CONNECTION")]
    pub engine_alias: String,
    #[serde(rename = "DB_DATABASE")]
    pub database: String,
    #[serde(rename = "DB_USERNAME")]
    pub username: String,
    #[serde(rename = "DB_HOST")]
    pub host: String,
    #[serde(rename = "DB_PORT")]
    pub port: u16,
    #[serde(rename = "DB_PASSWORD")]
    pub password: String,
    #[serde(rename = "DB_ALLOW_DISABLED_PK")]
    pub allow_disabled_primary_key: bool,
}

impl CredentialBundle {
    pub fn environment_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("DB_CONNECTION", self.engine_alias.clone()),
            ("DB_DATABASE", self.database.clone()),
            ("DB_USERNAME", self.username.clone()),
            ("DB_HOST", self.host.clone()),
            ("DB_PORT", self.port.to_string()),
            ("DB_PASSWORD", self.password.clone()),
            ("DB_ALLOW_DISABLED_PK", self.allow_disabled_primary_key.to_string()),
        ]
    }

    /// `KEY=value` lines readable by dotenv loaders.
    ///
    /// Values with whitespace, `#`, quotes, `\` or `$` are single-quoted, which disables
    /// escapes and substitution. Values containing `'` or a newline fall back to double
    /// quotes with `\`, `"`, `$` and newlines escaped.
    pub fn to_dotenv(&self) -> String {
        self.environment_variables()
            .into_iter()
            .map(|(key, value)| format!("{key}={}\n", dotenv_quote(&value)))
            .collect()
    }
}

fn dotenv_quote(value: &str) -> String {
    let needs_quotes = value
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'));
    if !needs_quotes {
        return value.to_string();
    }
    if !value.contains(['\'', '\n']) {
        return format!("'{value}'");
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('\n', "\\n");
    format!("\"{escaped}\"")
}
