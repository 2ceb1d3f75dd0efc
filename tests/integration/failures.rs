//! Failure paths: unknown tools, missing credentials, backend and transport errors, cancellation

use crate::integration::mock_server::MockBackendFixture;
use crate::integration::spy::{spy_dispatcher, SpyBackend};
use serde_json::json;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;
use voice_tool_dispatch::{
    Credentials, Dispatcher, FailureKind, FunctionCallRequest, SharedCredentials, ToolRegistry,
};

fn call(name: &str, args: serde_json::Value) -> FunctionCallRequest {
    FunctionCallRequest::from_value(name, args).expect("valid request")
}

fn configured() -> Arc<SharedCredentials> {
    Arc::new(SharedCredentials::new(Credentials::new(
        "https://abc.supabase.co",
        "anon",
    )))
}

/// Valid arguments for every built-in tool.
fn valid_call(tool: &str) -> FunctionCallRequest {
    let args = match tool {
        "get_user_info" => json!({"phone": "+391111111"}),
        "get_appointments" | "find_available_slots" => json!({"date": "2025-03-01"}),
        "get_practice_status" => json!({"practice_id": "P-19"}),
        "book_appointment" => json!({
            "slot_id": "42",
            "customer_name": "Mario",
            "customer_phone": "+391234567"
        }),
        other => panic!("no fixture arguments for {other}"),
    };
    call(tool, args)
}

/// In-memory log sink for the fmt subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[tokio::test]
async fn test_unknown_tool_makes_no_backend_call() {
    let spy = SpyBackend::new();
    let dispatcher = spy_dispatcher(spy.clone(), configured());

    for name in ["launch_rockets", "", "GET_USER_INFO", "get_user_info "] {
        let result = dispatcher.invoke(&call(name, json!({}))).await;
        assert_eq!(result.failure_kind(), Some(FailureKind::UnknownTool), "{name:?}");
        assert_eq!(result.to_value(), json!({"error": "Funzione non trovata"}));
    }
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_missing_credentials_short_circuit_every_tool() {
    let registry = ToolRegistry::standard().unwrap();
    let blank = Arc::new(SharedCredentials::new(Credentials::new("", "anon")));
    let no_key = Arc::new(SharedCredentials::new(Credentials::new(
        "https://abc.supabase.co",
        " ",
    )));

    for provider in [Arc::new(SharedCredentials::empty()), blank, no_key] {
        let spy = SpyBackend::new();
        let dispatcher = spy_dispatcher(spy.clone(), provider);

        for tool in registry.names() {
            let result = dispatcher.invoke(&valid_call(tool)).await;
            assert_eq!(result.failure_kind(), Some(FailureKind::Unconfigured), "{tool}");
            assert_eq!(result.to_value(), json!({"error": "Sistema non configurato"}));
        }
        assert_eq!(spy.calls(), 0);
    }
}

#[tokio::test]
async fn test_every_tool_returns_a_discriminated_result() {
    let spy = SpyBackend::new();
    let dispatcher = spy_dispatcher(spy.clone(), configured());
    let registry = ToolRegistry::standard().unwrap();

    for tool in registry.names() {
        let value = dispatcher.invoke(&valid_call(tool)).await.to_value();
        let discriminated = value.get("success").is_some() || value.get("error").is_some();
        assert!(discriminated, "{tool}: {value}");
    }
    assert_eq!(spy.calls(), registry.len());
}

#[tokio::test]
async fn test_invalid_arguments_reported_without_backend_call() {
    let spy = SpyBackend::new();
    let dispatcher = spy_dispatcher(spy.clone(), configured());

    let result = dispatcher
        .invoke(&call("find_available_slots", json!({"date": 20250301})))
        .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::InvalidArguments));
    let message = result.to_value()["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Argomenti non validi: date:"), "{message}");
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_wildcard_only_name_rejected_without_backend_call() {
    let spy = SpyBackend::new();
    let dispatcher = spy_dispatcher(spy.clone(), configured());

    for name in ["*", "%", "*%*"] {
        let result = dispatcher
            .invoke(&call("get_user_info", json!({"name": name})))
            .await;
        assert_eq!(result.failure_kind(), Some(FailureKind::InvalidArguments), "{name:?}");
    }
    assert_eq!(spy.calls(), 0);
}

#[tokio::test]
async fn test_procedure_empty_body_is_discriminated() {
    let fixture = MockBackendFixture::new().await;
    let args = json!({
        "slot_id": "42",
        "customer_name": "Mario",
        "customer_phone": "+391234567"
    });
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", "/functions/v1/book-appointment")
            .match_body(mockito::Matcher::Json(args.clone()))
            .with_status(204)
            .expect(1)
            .create_async()
            .await
    };

    let result = fixture
        .dispatcher()
        .invoke(&call("book_appointment", args))
        .await;

    mock.assert_async().await;
    assert!(result.is_success());
    assert_eq!(result.to_value(), json!({"success": true}));
}

#[tokio::test]
async fn test_procedure_http_500_logs_body_once() {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_env_filter(EnvFilter::new("voice_tool_dispatch=debug"))
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let fixture = MockBackendFixture::new().await;
    let args = json!({
        "slot_id": "42",
        "customer_name": "Mario",
        "customer_phone": "+391234567"
    });
    let mock = fixture
        .mock_procedure(
            "functions/v1/book-appointment",
            args.clone(),
            500,
            r#"{"message":"slot table exploded","code":"XX000"}"#,
        )
        .await;

    let result = fixture
        .dispatcher()
        .invoke(&call("book_appointment", args))
        .await;

    mock.assert_async().await;
    assert_eq!(result.failure_kind(), Some(FailureKind::BackendStatus));
    assert_eq!(
        result.to_value(),
        json!({"error": "Il servizio ha restituito un errore", "status": 500})
    );
    assert!(!result.to_value().to_string().contains("slot table exploded"));
    assert_eq!(logs.contents().matches("slot table exploded").count(), 1);
}

#[tokio::test]
async fn test_read_http_error_carries_status() {
    let fixture = MockBackendFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/rest/v1/practices")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body("Invalid API key")
            .expect(1)
            .create_async()
            .await
    };

    let result = fixture
        .dispatcher()
        .invoke(&call("get_practice_status", json!({"practice_id": "1"})))
        .await;

    mock.assert_async().await;
    assert_eq!(result.to_value()["status"], 401);
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_failure() {
    let credentials = Arc::new(SharedCredentials::new(Credentials::new(
        "http://127.0.0.1:1",
        "anon",
    )));
    let dispatcher = Dispatcher::builder()
        .credentials(credentials)
        .build()
        .unwrap();

    let result = dispatcher
        .invoke(&call("get_practice_status", json!({"practice_id": "1"})))
        .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::Transport));
    assert_eq!(
        result.to_value(),
        json!({"error": "Servizio temporaneamente non disponibile"})
    );
}

#[tokio::test]
async fn test_cancellation_abandons_in_flight_call() {
    let spy = SpyBackend::hanging();
    let dispatcher = spy_dispatcher(spy.clone(), configured());
    let token = CancellationToken::new();

    let canceller = {
        let token = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        })
    };

    let result = dispatcher
        .invoke_cancellable(&valid_call("book_appointment"), &token)
        .await;
    canceller.await.unwrap();

    assert_eq!(result.failure_kind(), Some(FailureKind::Cancelled));
    assert_eq!(spy.calls(), 1);
}

#[tokio::test]
async fn test_cancelled_before_start_sends_nothing() {
    let spy = SpyBackend::new();
    let dispatcher = spy_dispatcher(spy.clone(), configured());
    let token = CancellationToken::new();
    token.cancel();

    let result = dispatcher
        .invoke_cancellable(&valid_call("get_practice_status"), &token)
        .await;

    assert_eq!(result.failure_kind(), Some(FailureKind::Cancelled));
    assert_eq!(spy.calls(), 0);
}
