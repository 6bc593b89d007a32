mod edit;
mod errors;
mod start_stop;

use actix_web::{web, App, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use std::{
    net::{SocketAddr, TcpListener},
    process::{Child, Command, Stdio},
    sync::Mutex,
    time::Duration,
};

#[derive(Debug, Default, PartialEq, Deserialize)]
struct Error {
    error: ErrorData,
}

#[derive(Debug, Default, PartialEq, Deserialize)]
struct ErrorData {
    code: String,
    reason: String,
    message: String,
    #[serde(default)]
    fields: Option<serde_json::Value>,
}

/// Requests the mock storage API received
#[derive(Debug, Default)]
struct Upstream {
    updates: Mutex<Vec<Vec<(String, String)>>>,
    uploads: Mutex<Vec<(String, String, String, Vec<u8>)>>,
}

async fn upstream_object(path: web::Path<String>) -> HttpResponse {
    match path.as_str() {
        "test:1" => HttpResponse::Ok().json(json!({
            "pid": "test:1",
            "datastreams": {
                "MODS": {"label": "MODS", "mimetype": "text/xml"},
                "PDF": {"label": "thesis.pdf", "mimetype": "application/pdf"},
            },
            "collections": [30],
            "children": ["test:2", "test:3"],
        })),
        _ => HttpResponse::NotFound().finish(),
    }
}

async fn upstream_datastream(path: web::Path<(String, String)>) -> HttpResponse {
    match path.1.as_str() {
        "MODS" => HttpResponse::Ok().content_type("text/xml").body("<mods/>"),
        _ => HttpResponse::NotFound().finish(),
    }
}

async fn upstream_update(
    state: web::Data<Upstream>,
    form: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    state.updates.lock().unwrap().push(form.into_inner());
    HttpResponse::Ok().finish()
}

async fn upstream_upload(
    state: web::Data<Upstream>,
    path: web::Path<(String, String)>,
    req: actix_web::HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let (pid, dsid) = path.into_inner();
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state
        .uploads
        .lock()
        .unwrap()
        .push((pid, dsid, content_type, body.to_vec()));
    HttpResponse::Ok().finish()
}

async fn upstream_folder(path: web::Path<String>) -> HttpResponse {
    match path.as_str() {
        "1" => HttpResponse::Ok().json(json!({
            "id": 1,
            "name": "Library",
            "child_folders": [
                {"id": 30, "name": "Theses"},
                {"id": 31, "name": "Maps"},
            ],
        })),
        _ => HttpResponse::NotFound().finish(),
    }
}

/// Starts the mock storage and folder APIs on a random local port.
fn start_upstream() -> (SocketAddr, web::Data<Upstream>) {
    let state = web::Data::new(Upstream::default());
    let app_state = state.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/items/", web::put().to(upstream_update))
            .route("/items/{pid}/", web::get().to(upstream_object))
            .route("/items/{pid}/{dsid}/", web::get().to(upstream_datastream))
            .route("/items/{pid}/{dsid}/", web::put().to(upstream_upload))
            .route("/folders/{id}/", web::get().to(upstream_folder))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind mock upstream");

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    (addr, state)
}

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("Failed to find a free port")
}

#[derive(Debug)]
struct Server {
    process: Child,
    // Keep the root dir alive for the lifetime of the process
    _root_dir: tempfile::TempDir,
    api_port: u16,
    client: reqwest::Client,
    base_url: String,
}

impl Drop for Server {
    fn drop(&mut self) {
        self.process.kill().expect("Failed to stop repo_direct");
    }
}

impl Server {
    fn command(root_dir: &tempfile::TempDir, api_port: u16) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_repo_direct"));
        command
            .env_clear()
            .arg("--root-dir")
            .arg(root_dir.path())
            .arg("--rpc-laddr")
            .arg(format!("127.0.0.1:{api_port}"));

        if !std::env::var("LOG_REPO_DIRECT_OUTPUT")
            .map(|v| v == "1")
            .unwrap_or(false)
        {
            command.stdout(Stdio::null()).stderr(Stdio::null());
        }

        command
    }

    fn setup(upstream: SocketAddr) -> Self {
        Self::setup_with_urls(
            format!("http://{upstream}/items/"),
            format!("http://{upstream}/folders/"),
        )
    }

    fn setup_with_urls(items_url: String, folders_url: String) -> Self {
        let root_dir = tempfile::tempdir().expect("Failed to create temp root dir");
        let api_port = free_port();

        let process = Self::command(&root_dir, api_port)
            .env("BDR_API_URL", items_url)
            .env("FOLDER_API_PUBLIC", folders_url)
            .env("LIBRARY_PARENT_FOLDER_ID", "1")
            .env("REQUEST_TIMEOUT", "5")
            .spawn()
            .expect("Failed to start repo_direct");

        Self {
            process,
            _root_dir: root_dir,
            api_port,
            client: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap(),
            base_url: format!("http://127.0.0.1:{api_port}"),
        }
    }

    async fn setup_and_wait(upstream: SocketAddr) -> Self {
        let server = Self::setup(upstream);
        server.wait().await.expect("Failed to wait for server");
        server
    }

    async fn wait(&self) -> Result<(), Box<dyn std::error::Error>> {
        let time_between_requests = Duration::from_millis(100);
        let max_retries = 10000 / time_between_requests.as_millis() as usize;

        let mut retry = 0;
        loop {
            let is_last_retry = retry == max_retries - 1;

            match self.get("/v0/health").send().await {
                Ok(res) if res.status().is_success() => return Ok(()),
                Ok(res) if is_last_retry => {
                    return Err(format!("health check returned {}", res.status()).into())
                }
                Err(e) if is_last_retry => return Err(e.into()),
                _ => {}
            }

            retry += 1;
            tokio::time::sleep(time_between_requests).await;
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{path}", self.base_url))
    }

    fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .form(form)
    }
}
