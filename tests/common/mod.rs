//! Shared test support: a scripted network fetcher and worker builders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use url::Url;

use rifugio::cache::{CacheStorage, EntryKey};
use rifugio::domain::{ResponseKind, WorkerRequest, WorkerResponse};
use rifugio::worker::{
    ClientRegistry, FetchError, NetworkFetcher, Worker, WorkerConfig, WorkerEvent,
};

pub const TEST_VERSION: &str = "test-v1";

pub fn origin() -> Url {
    Url::parse("http://origin.test").expect("valid test origin")
}

pub fn test_config() -> WorkerConfig {
    WorkerConfig {
        cache_version: TEST_VERSION.to_string(),
        precache: [
            "/",
            "/offline",
            "/fonts/inter-var.woff2",
            "/favicon.svg",
            "/manifest.json",
        ]
        .map(String::from)
        .to_vec(),
        offline_path: "/offline".to_string(),
        exclude_substrings: ["/api/", "google-analytics.com", "giscus.app"]
            .map(String::from)
            .to_vec(),
        origin: origin(),
    }
}

pub fn entry_key(path: &str) -> EntryKey {
    EntryKey::for_path(&origin(), path).expect("valid entry key")
}

#[derive(Clone)]
enum Script {
    Ok {
        status: u16,
        kind: ResponseKind,
        body: String,
    },
    Fail,
}

/// Serves canned responses per URL and fails anything unscripted.
#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, Script>>,
    fetched: Mutex<Vec<String>>,
    forwarded: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, path: &str, status: u16, kind: ResponseKind, body: &str) {
        let url = origin().join(path).expect("valid scripted path");
        self.scripts.lock().expect("scripts lock").insert(
            url.to_string(),
            Script::Ok {
                status,
                kind,
                body: body.to_string(),
            },
        );
    }

    /// Script a 200 same-origin response.
    pub fn serve_ok(&self, path: &str, body: &str) {
        self.serve(path, 200, ResponseKind::Basic, body);
    }

    /// Script a network failure for `path`, replacing any prior script.
    pub fn fail(&self, path: &str) {
        let url = origin().join(path).expect("valid scripted path");
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(url.to_string(), Script::Fail);
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().expect("fetched lock").clone()
    }

    pub fn forwarded_urls(&self) -> Vec<String> {
        self.forwarded.lock().expect("forwarded lock").clone()
    }

    fn lookup(&self, url: &str) -> Result<WorkerResponse, FetchError> {
        let scripts = self.scripts.lock().expect("scripts lock");
        match scripts.get(url) {
            Some(Script::Ok { status, kind, body }) => Ok(WorkerResponse::new(
                StatusCode::from_u16(*status).expect("valid scripted status"),
                *kind,
                vec![("content-type".to_string(), "text/html".to_string())],
                Bytes::from(body.clone()),
            )),
            Some(Script::Fail) | None => Err(FetchError::network("scripted network failure")),
        }
    }
}

#[async_trait]
impl NetworkFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse, FetchError> {
        self.fetched
            .lock()
            .expect("fetched lock")
            .push(request.url().to_string());
        self.lookup(request.url().as_str())
    }

    async fn forward(
        &self,
        request: &WorkerRequest,
        _headers: Vec<(String, String)>,
        _body: Bytes,
    ) -> Result<WorkerResponse, FetchError> {
        self.forwarded
            .lock()
            .expect("forwarded lock")
            .push(request.url().to_string());
        self.lookup(request.url().as_str())
    }
}

pub struct TestWorker {
    pub worker: Arc<Worker>,
    pub storage: Arc<CacheStorage>,
    pub fetcher: Arc<ScriptedFetcher>,
    pub clients: Arc<ClientRegistry>,
}

impl TestWorker {
    /// Build a worker over a scripted fetcher with the whole precache
    /// set already scripted as 200s.
    pub fn with_precache_available() -> Self {
        let config = test_config();
        let fetcher = Arc::new(ScriptedFetcher::new());
        for path in &config.precache {
            fetcher.serve_ok(path, &format!("precached {path}"));
        }
        Self::build(config, fetcher)
    }

    pub fn build(config: WorkerConfig, fetcher: Arc<ScriptedFetcher>) -> Self {
        let storage = Arc::new(CacheStorage::new());
        let clients = Arc::new(ClientRegistry::new());
        let worker = Arc::new(Worker::new(
            config,
            Arc::clone(&storage),
            fetcher.clone() as Arc<dyn NetworkFetcher>,
            Arc::clone(&clients),
        ));
        Self {
            worker,
            storage,
            fetcher,
            clients,
        }
    }

    pub async fn install_and_activate(&self) {
        self.worker
            .dispatch(WorkerEvent::Install)
            .await
            .expect("install succeeds");
        self.worker
            .dispatch(WorkerEvent::Activate)
            .await
            .expect("activate succeeds");
    }
}
