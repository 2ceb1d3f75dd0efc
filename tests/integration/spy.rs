//! Call-counting backend for tests that must prove no request was made

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use voice_tool_dispatch::{
    Backend, BackendOutcome, BackendRequest, Credentials, CredentialsProvider, Dispatcher,
};

pub struct SpyBackend {
    calls: AtomicUsize,
    /// Never answer; used to exercise cancellation.
    hang: bool,
}

impl SpyBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            hang: false,
        })
    }

    pub fn hanging() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            hang: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for SpyBackend {
    async fn call(&self, _: &Credentials, _: &BackendRequest) -> BackendOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        BackendOutcome::Ok(Value::Array(Vec::new()))
    }
}

pub fn spy_dispatcher(
    backend: Arc<SpyBackend>,
    credentials: Arc<dyn CredentialsProvider>,
) -> Dispatcher {
    Dispatcher::builder()
        .backend(backend)
        .credentials(credentials)
        .validate_arguments(true)
        .build()
        .expect("dispatcher should build")
}
