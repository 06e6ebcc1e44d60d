// SPDX-License-Identifier: MIT OR Apache-2.0
//! Backend client against a mock HTTP server.

use genui_core::{DashboardState, SessionMode, SessionStatus, Theme, UiEnvelope};
use genui_error::ErrorCode;
use genui_http::BackendClient;
use genui_reduce::reduce_document;
use genui_session::{ByteSource, StreamSession};
use genui_wire::DecodeOptions;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_with(route: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn basic_exchange_returns_response_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/level1/basic"))
        .and(body_json(json!({"message": "Explain Quantum Physics"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "Waves."})))
        .expect(1)
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri());
    let resp = client.basic("Explain Quantum Physics").await.unwrap();
    assert_eq!(resp.response, "Waves.");
}

#[tokio::test]
async fn streamed_body_drives_session_to_completion() {
    let body = "data: Roses \n\ndata: are\\nred\n\ndata: [DONE]\n\n";
    let server = server_with(
        "/api/level2/stream",
        ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
    )
    .await;

    let client = BackendClient::new(server.uri());
    let mut session = StreamSession::new(SessionMode::FreeText, DecodeOptions::default());
    let handle = session.handle();

    let status = session.run(client.stream("poem")).await.unwrap();
    assert_eq!(status, SessionStatus::Completed);
    assert_eq!(handle.snapshot().view.text(), Some("Roses are\nred"));
}

#[tokio::test]
async fn error_status_fails_the_session() {
    let server = server_with(
        "/api/level2/stream",
        ResponseTemplate::new(503).set_body_string("overloaded"),
    )
    .await;

    let client = BackendClient::new(server.uri());
    let mut session = StreamSession::new(SessionMode::FreeText, DecodeOptions::default());
    let handle = session.handle();

    assert_eq!(
        session.run(client.stream("x")).await.unwrap(),
        SessionStatus::Failed
    );
    let error = handle.snapshot().error.unwrap();
    assert_eq!(error.code, ErrorCode::TransportStatus);
    assert_eq!(error.context["status"], json!(503));
    assert_eq!(error.context["body"], json!("overloaded"));
}

#[tokio::test]
async fn unreachable_backend_is_connect_error() {
    // Bind then drop a listener to get a port nobody is serving.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = BackendClient::new(format!("http://127.0.0.1:{port}"));
    let mut source = client.stream("x");
    let err = source.open().await.unwrap_err();
    assert_eq!(err.code, ErrorCode::TransportConnect);
    assert!(err.code.is_fatal());
}

#[tokio::test]
async fn ui_document_updates_dashboard() {
    let server = server_with(
        "/api/level3/ui",
        ResponseTemplate::new(200).set_body_json(UiEnvelope::update(DashboardState::new(
            Theme::Dark,
            "Night Watch",
        ))),
    )
    .await;

    let client = BackendClient::new(server.uri());
    let doc = client.ui_document("Turn on dark mode").await.unwrap();
    let r = reduce_document(DashboardState::default(), &doc);
    assert_eq!(r.state, DashboardState::new(Theme::Dark, "Night Watch"));
    assert!(r.report.is_none());
}

#[tokio::test]
async fn ui_error_envelope_leaves_dashboard() {
    let server = server_with(
        "/api/level3/ui",
        ResponseTemplate::new(200)
            .set_body_json(json!({"type": "error", "message": "No UI update triggered"})),
    )
    .await;

    let client = BackendClient::new(server.uri());
    let prior = DashboardState::new(Theme::Blue, "Calm");
    let doc = client.ui_document("hello").await.unwrap();
    let r = reduce_document(prior.clone(), &doc);
    assert_eq!(r.state, prior);
    assert_eq!(r.report.unwrap().code, ErrorCode::DecodeMalformed);
}

#[tokio::test]
async fn non_json_basic_response_is_decode_error() {
    let server = server_with(
        "/api/level1/basic",
        ResponseTemplate::new(200).set_body_string("<html>"),
    )
    .await;
    let err = BackendClient::new(server.uri())
        .basic("x")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DecodeMalformed);
}
