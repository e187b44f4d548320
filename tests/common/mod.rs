#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const MASTER_USERNAME: &str = "master";
pub const MASTER_PASSWORD: &str = "master1234";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Fresh database file per spawned server
        let db_path = std::env::temp_dir().join(format!("ems-api-test-{}.db", port));
        let _ = std::fs::remove_file(&db_path);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_ems-api-rust"));
        cmd.env("EMS_API_PORT", port.to_string())
            .env(
                "DATABASE_URL",
                format!("sqlite://{}?mode=rwc", db_path.display()),
            )
            .env("JWT_SECRET", "integration-test-secret")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Unique username per call so parallel tests never collide.
pub fn unique(prefix: &str) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    format!(
        "{}-{}-{}",
        prefix,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}

pub async fn post_json(
    server: &TestServer,
    token: Option<&str>,
    path: &str,
    body: Value,
) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let mut req = client.post(format!("{}{}", server.base_url, path)).json(&body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    Ok(req.send().await?)
}

pub async fn get(
    server: &TestServer,
    token: Option<&str>,
    path: &str,
) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let mut req = client.get(format!("{}{}", server.base_url, path));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    Ok(req.send().await?)
}

pub async fn put_json(
    server: &TestServer,
    token: Option<&str>,
    path: &str,
    body: Value,
) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let mut req = client.put(format!("{}{}", server.base_url, path)).json(&body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    Ok(req.send().await?)
}

pub async fn delete(
    server: &TestServer,
    token: Option<&str>,
    path: &str,
) -> Result<reqwest::Response> {
    let client = reqwest::Client::new();
    let mut req = client.delete(format!("{}{}", server.base_url, path));
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    Ok(req.send().await?)
}

pub async fn login(server: &TestServer, username: &str, password: &str) -> Result<String> {
    let res = post_json(
        server,
        None,
        "/auth/login",
        json!({ "username": username, "password": password }),
    )
    .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "login as {} failed: {}",
        username,
        res.status()
    );
    let body: Value = res.json().await?;
    body["data"]["token"]
        .as_str()
        .map(str::to_string)
        .context("login response carried no token")
}

pub async fn master_token(server: &TestServer) -> Result<String> {
    login(server, MASTER_USERNAME, MASTER_PASSWORD).await
}

/// Create an admin via the master token and log it in. Returns (id, token).
pub async fn provision_admin(
    server: &TestServer,
    master_token: &str,
    username: &str,
) -> Result<(i64, String)> {
    let res = post_json(
        server,
        Some(master_token),
        "/admins/create-admin",
        json!({ "username": username, "password": "pass1234" }),
    )
    .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create-admin {} failed: {}",
        username,
        res.status()
    );
    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_i64().context("admin id missing")?;
    let token = login(server, username, "pass1234").await?;
    Ok((id, token))
}

/// Create a user via an admin (or master) token and log it in. Returns (id, token).
pub async fn provision_user(
    server: &TestServer,
    creator_token: &str,
    username: &str,
) -> Result<(i64, String)> {
    let res = post_json(
        server,
        Some(creator_token),
        "/admins/create-user",
        json!({ "username": username, "password": "pass1234" }),
    )
    .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create-user {} failed: {}",
        username,
        res.status()
    );
    let body: Value = res.json().await?;
    let id = body["data"]["id"].as_i64().context("user id missing")?;
    let token = login(server, username, "pass1234").await?;
    Ok((id, token))
}

/// Create a reservation and return its JSON representation.
pub async fn create_reservation(
    server: &TestServer,
    token: &str,
    name: &str,
    date: &str,
    time: &str,
) -> Result<Value> {
    let res = post_json(
        server,
        Some(token),
        "/reservations",
        json!({
            "name": name,
            "phone": "010-1234-5678",
            "from": "Seoul Station",
            "to": "City Hospital",
            "date": date,
            "time": time,
        }),
    )
    .await?;
    anyhow::ensure!(
        res.status() == StatusCode::CREATED,
        "create reservation {} failed: {}",
        name,
        res.status()
    );
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

/// List reservations visible to the token's identity.
pub async fn list_reservations(server: &TestServer, token: &str) -> Result<Vec<Value>> {
    let res = get(server, Some(token), "/reservations").await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "list reservations failed: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    body["data"]
        .as_array()
        .cloned()
        .context("reservation list was not an array")
}
