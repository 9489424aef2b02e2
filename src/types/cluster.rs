use serde::{Deserialize, Deserializer, Serialize};

/// Envelope of `GET databases`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub databases: Vec<Cluster>,
}

/// A managed database cluster as listed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub engine: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub users: Vec<DatabaseUser>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub db_names: Vec<String>,
    #[serde(default)]
    pub private_connection: Option<Connection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseUser {
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub host: String,
    pub port: u16,
}

/// Envelope of `POST databases/{id}/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub user: DatabaseUser,
}

impl Cluster {
    /// Case-sensitive lookup by user name.
    pub fn find_user(&self, name: &str) -> Option<&DatabaseUser> {
        self.users.iter().find(|u| u.name == name)
    }

    pub fn has_database(&self, name: &str) -> bool {
        self.db_names.iter().any(|db| db == name)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
