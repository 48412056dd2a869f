//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use wheeltracker_client::{ApiClient, ClientConfig, MemoryStorage, Navigator, TokenStorage};
use wiremock::MockServer;

/// Remembers every redirect instead of performing it
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub struct Harness {
    pub server: MockServer,
    pub api: ApiClient,
    pub storage: Arc<MemoryStorage>,
    pub navigator: Arc<RecordingNavigator>,
}

impl Harness {
    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.get(key).unwrap()
    }
}

/// Client pointed at `<mock>/api` with an empty session
pub async fn harness() -> Harness {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let navigator = Arc::new(RecordingNavigator::default());

    let config = ClientConfig::new(&format!("{}/api", server.uri())).with_timeout(Duration::from_secs(5));
    let api = ApiClient::new(config, storage.clone(), navigator.clone()).unwrap();

    Harness {
        server,
        api,
        storage,
        navigator,
    }
}

/// Same as [`harness`], already signed in as `access`/`refresh`
pub async fn signed_in(access: &str, refresh: &str) -> Harness {
    let h = harness().await;
    h.api.auth().login(access, refresh);
    h
}
