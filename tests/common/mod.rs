use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use do_database::Config;
use do_database::service::TerminalConsole;
use serde_json::{Value, json};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

pub const TOKEN: &str = "test-token";

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub uri: String,
    pub body: Option<Value>,
}

/// In-process stand-in for the DigitalOcean databases API.
#[derive(Clone)]
pub struct FakeDigitalOcean {
    clusters: Value,
    requests: Arc<Mutex<Vec<Recorded>>>,
    /// Cluster listings still to answer with 503 before succeeding.
    unavailable_listings: Arc<AtomicUsize>,
}

impl FakeDigitalOcean {
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "GET")
            .collect()
    }

    pub fn posts(&self) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == "POST")
            .collect()
    }

    /// Answer the next `count` cluster listings with 503.
    pub fn fail_listings(&self, count: usize) {
        self.unavailable_listings.store(count, Ordering::SeqCst);
    }

    fn record(&self, method: &'static str, uri: &Uri, body: Option<Value>) {
        self.requests.lock().unwrap().push(Recorded {
            method,
            uri: uri.to_string(),
            body,
        });
    }
}

pub fn bellows_cluster() -> Value {
    json!({
        "id": "do-test-id",
        "name": "bellows_cluster",
        "engine": "mysql",
        "users": [{"name": "bellows_test_user", "role": "normal", "password": "btu_secretstuff"}],
        "db_names": ["bellows_tester"],
        "private_connection": {"host": "my-private-host.do.com", "port": 25060}
    })
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"id": "service_unavailable", "message": "try again later"})),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(auth) if auth == expected => Ok(()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"id": "unauthorized", "message": "Unable to authenticate you."})),
        )
            .into_response()),
    }
}

async fn list_databases(
    State(fake): State<FakeDigitalOcean>,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    fake.record("GET", &uri, None);
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let failing = fake
        .unavailable_listings
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    if failing.is_ok() {
        return unavailable();
    }
    Json(json!({ "databases": fake.clusters })).into_response()
}

async fn create_user(
    State(fake): State<FakeDigitalOcean>,
    headers: HeaderMap,
    uri: Uri,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    fake.record("POST", &uri, Some(body.clone()));
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    if id == "unavailable" {
        return unavailable();
    }
    if id == "broken" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"id": "unprocessable_entity", "message": "user limit reached"})),
        )
            .into_response();
    }
    Json(json!({
        "user": {"name": body["name"], "role": "normal", "password": "secretstuff"}
    }))
    .into_response()
}

async fn create_db(
    State(fake): State<FakeDigitalOcean>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    fake.record("POST", &uri, Some(body.clone()));
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    (StatusCode::CREATED, Json(json!({"db": {"name": body["name"]}}))).into_response()
}

/// Serve the fake API on an ephemeral port; returns it with a config pointed at it.
pub async fn spawn(clusters: Vec<Value>) -> (FakeDigitalOcean, Config) {
    let fake = FakeDigitalOcean {
        clusters: Value::Array(clusters),
        requests: Arc::default(),
        unavailable_listings: Arc::default(),
    };
    let app = Router::new()
        .route("/v2/databases", get(list_databases))
        .route("/v2/databases/{id}/users", post(create_user))
        .route("/v2/databases/{id}/dbs", post(create_db))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind fake API");
    let addr = listener.local_addr().expect("no local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake API crashed");
    });

    let api_url = Url::parse(&format!("http://{addr}/v2/")).expect("bad fake API url");
    let cfg = Config::default().with_api_url(api_url).with_token(TOKEN);
    (fake, cfg)
}

pub type ScriptedConsole = TerminalConsole<Cursor<Vec<u8>>, Vec<u8>>;

pub fn console(input: &str) -> ScriptedConsole {
    TerminalConsole::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

pub fn transcript(console: ScriptedConsole) -> String {
    String::from_utf8(console.into_inner().1).expect("console output was not utf-8")
}
