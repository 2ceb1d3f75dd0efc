//! End-to-end tool calls against a mock backend

use crate::integration::mock_server::MockBackendFixture;
use serde_json::json;
use voice_tool_dispatch::{Credentials, FailureKind, FunctionCallRequest};

fn call(name: &str, args: serde_json::Value) -> FunctionCallRequest {
    FunctionCallRequest::from_value(name, args).expect("valid request")
}

#[tokio::test]
async fn test_find_available_slots_maps_rows() {
    let fixture = MockBackendFixture::new().await;
    let mock = fixture
        .mock_read(
            "bookings",
            &[
                ("date", "eq.2025-03-01"),
                ("status", "eq.available"),
                ("select", "*"),
            ],
            r#"[{"time":"09:00"},{"time":"10:30"}]"#,
        )
        .await;

    let result = fixture
        .dispatcher()
        .invoke(&call("find_available_slots", json!({"date": "2025-03-01"})))
        .await;

    mock.assert_async().await;
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({
            "success": true,
            "appuntamenti": [
                {"ora": "09:00", "disponibile": true},
                {"ora": "10:30", "disponibile": true}
            ]
        })
    );
}

#[tokio::test]
async fn test_book_appointment_passes_response_through() {
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
            200,
            r#"{"booked":true,"id":"42"}"#,
        )
        .await;

    let result = fixture
        .dispatcher()
        .invoke(&call("book_appointment", args))
        .await;

    mock.assert_async().await;
    assert!(result.is_success());
    assert_eq!(result.to_value(), json!({"booked": true, "id": "42"}));
}

#[tokio::test]
async fn test_get_user_info_not_found() {
    let fixture = MockBackendFixture::new().await;
    let mock = fixture
        .mock_read(
            "clienti",
            &[
                ("or", "(telefono.eq.+391111111)"),
                ("select", "*"),
                ("limit", "1"),
            ],
            "[]",
        )
        .await;

    let result = fixture
        .dispatcher()
        .invoke(&call("get_user_info", json!({"phone": "+391111111"})))
        .await;

    mock.assert_async().await;
    assert_eq!(result.failure_kind(), Some(FailureKind::NotFound));
    assert_eq!(
        result.to_value(),
        json!({"success": false, "message": "Cliente non trovato"})
    );
}

#[tokio::test]
async fn test_get_user_info_by_phone_or_name() {
    let fixture = MockBackendFixture::new().await;
    let mock = fixture
        .mock_read(
            "clienti",
            &[
                ("or", "(telefono.eq.+391111111,nome.ilike.*Mario*)"),
                ("select", "*"),
                ("limit", "1"),
            ],
            r#"[{"id":3,"nome":"Mario","cognome":"Rossi","telefono":"+391111111","email":"mario@example.it","note":"vip"}]"#,
        )
        .await;

    let result = fixture
        .dispatcher()
        .invoke(&call(
            "get_user_info",
            json!({"phone": "+391111111", "name": "Mario"}),
        ))
        .await;

    mock.assert_async().await;
    assert_eq!(
        result.to_value(),
        json!({
            "success": true,
            "cliente": {
                "nome": "Mario",
                "cognome": "Rossi",
                "telefono": "+391111111",
                "email": "mario@example.it"
            }
        })
    );
}

#[tokio::test]
async fn test_get_practice_status_found() {
    let fixture = MockBackendFixture::new().await;
    let mock = fixture
        .mock_read(
            "practices",
            &[("id", "eq.P-19"), ("select", "*"), ("limit", "1")],
            r#"[{"id":"P-19","status":"in lavorazione","description":"Rimborso spese"}]"#,
        )
        .await;

    let result = fixture
        .dispatcher()
        .invoke(&call("get_practice_status", json!({"practice_id": "P-19"})))
        .await;

    mock.assert_async().await;
    assert_eq!(
        result.to_value(),
        json!({
            "success": true,
            "pratica": {"id": "P-19", "stato": "in lavorazione", "descrizione": "Rimborso spese"}
        })
    );
}

#[tokio::test]
async fn test_rotated_key_used_by_next_call() {
    let fixture = MockBackendFixture::new().await;
    let dispatcher = fixture.dispatcher();

    let first = fixture
        .mock_read("practices", &[("id", "eq.1")], "[]")
        .await;
    dispatcher
        .invoke(&call("get_practice_status", json!({"practice_id": "1"})))
        .await;
    first.assert_async().await;

    fixture
        .credentials
        .store(Credentials::new(fixture.base_url.clone(), "rotated-key"));

    let rotated = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/rest/v1/practices")
            .match_query(mockito::Matcher::Any)
            .match_header("apikey", "rotated-key")
            .match_header("authorization", "Bearer rotated-key")
            .with_status(200)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await
    };
    let result = dispatcher
        .invoke(&call("get_practice_status", json!({"practice_id": "2"})))
        .await;

    rotated.assert_async().await;
    assert_eq!(result.failure_kind(), Some(FailureKind::NotFound));
}

#[tokio::test]
async fn test_realtime_event_round_trip() {
    let fixture = MockBackendFixture::new().await;
    let _mock = fixture
        .mock_read("bookings", &[("date", "eq.2025-03-02")], "[]")
        .await;

    let event = json!({
        "type": "response.function_call_arguments.done",
        "call_id": "call_77",
        "name": "get_appointments",
        "arguments": "{\"date\":\"2025-03-02\"}"
    });
    let request = FunctionCallRequest::from_realtime_event(&event).unwrap();
    let result = fixture.dispatcher().invoke(&request).await;

    let item = result.to_conversation_item(request.call_id.as_deref().unwrap());
    assert_eq!(item["type"], "conversation.item.create");
    assert_eq!(item["item"]["call_id"], "call_77");
    let output: serde_json::Value =
        serde_json::from_str(item["item"]["output"].as_str().unwrap()).unwrap();
    assert_eq!(output, json!({"success": true, "appuntamenti": []}));
}
