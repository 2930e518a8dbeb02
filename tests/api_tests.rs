use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use cks_ai::api::HubEvent;
use cks_ai::config::Config;
use cks_ai::services::ProviderRegistry;
use futures::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use std::time::Duration;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.storage.media_dir = std::env::temp_dir()
        .join(format!("cks-api-test-{}", uuid::Uuid::new_v4()))
        .display()
        .to_string();

    let state = cks_ai::api::create_app_state_with_providers(config, ProviderRegistry::empty())
        .await
        .expect("Failed to create app state");
    cks_ai::api::router(state)
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_chat_answers_locally_without_providers() {
    let app = spawn_app().await;

    let response = app
        .oneshot(post_json(
            "/api/chat",
            &serde_json::json!({"message": "What is photosynthesis"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["sources"], serde_json::json!([]));
    assert_eq!(body["data"]["intent"], "definition");
    assert!(body["data"]["timestamp"].is_string());

    let text = body["data"]["response"].as_str().unwrap();
    assert!(text.starts_with("## Definition: Photosynthesis"));
    assert!(text.contains("### Sources"));
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/api/chat", &serde_json::json!({"message": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let response = app
        .oneshot(post_json("/api/chat", &serde_json::json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_rejects_malformed_body() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chat")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_files_validation_and_not_found() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/files")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(get("/api/files?filename=..%2Fetc%2Fpasswd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/api/files?filename=missing.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_files_synthesizes_wav_on_demand() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(get("/api/files?filename=tone.wav"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "audio/wav");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"tone.wav\""
    );
    assert_eq!(headers[header::CONTENT_LENGTH], "264644");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.len(), 44 + 44_100 * 3 * 2);
    assert_eq!(&body[0..4], b"RIFF");
    assert_eq!(&body[8..12], b"WAVE");

    // persisted, so it now shows up in the library
    let response = app.oneshot(get("/api/media")).await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["files"][0]["name"], "tone.wav");
    assert_eq!(body["data"]["files"][0]["media_type"], "audio");
}

#[tokio::test]
async fn test_media_actions() {
    let app = spawn_app().await;

    let response = app.clone().oneshot(get("/api/media")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["count"], 0);

    let response = app
        .clone()
        .oneshot(post_json("/api/media", &serde_json::json!({"action": "download"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["action"], "download");
    assert_eq!(body["data"]["count"], 3);

    let response = app
        .clone()
        .oneshot(post_json("/api/media", &serde_json::json!({"action": "list"})))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["data"]["count"], 3);

    let response = app
        .oneshot(post_json("/api/media", &serde_json::json!({"action": "delete"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_downloader_analysis() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/downloader",
            &serde_json::json!({
                "url": "https://youtu.be/dQw4w9WgXcQ",
                "platform": "youtube",
                "quality": "720p"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["data"]["platform"], "youtube");
    assert_eq!(body["data"]["media_id"], "dQw4w9WgXcQ");

    let options = body["data"]["options"].as_array().unwrap();
    assert_eq!(options.len(), 5);
    let recommended: Vec<_> = options.iter().filter(|o| o["recommended"] == true).collect();
    assert_eq!(recommended.len(), 1);
    assert_eq!(recommended[0]["quality"], "720p");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/downloader",
            &serde_json::json!({"url": "https://example.com/watch?v=abc", "platform": "youtube"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(post_json(
            "/api/downloader",
            &serde_json::json!({"url": "https://youtu.be/abc", "platform": "myspace"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");

    let body = json_body(response).await;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["data"]["providers"]["search"], serde_json::json!([]));
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let app = spawn_app().await;

    let response = app.oneshot(get("/api/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_events_stream_carries_chat_answers() {
    let app = spawn_app().await;

    let events = app.clone().oneshot(get("/api/events")).await.unwrap();
    assert_eq!(events.status(), StatusCode::OK);
    assert_eq!(
        events.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let response = app
        .oneshot(post_json(
            "/api/chat",
            &serde_json::json!({"message": "What is photosynthesis"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = events.into_body();
    let data = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let frame = body.frame().await.unwrap().unwrap();
            let Ok(bytes) = frame.into_data() else {
                continue;
            };
            let text = String::from_utf8(bytes.to_vec()).unwrap();
            if let Some(line) = text.lines().find_map(|l| l.strip_prefix("data:")) {
                break line.trim().to_string();
            }
        }
    })
    .await
    .expect("no event within timeout");

    let event: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(event["type"], "ChatAnswered");
    assert_eq!(event["payload"]["intent"], "definition");
    assert_eq!(event["payload"]["sources"], 0);
}

#[tokio::test]
async fn test_websocket_echoes_text_frames() {
    let mut config = Config::default();
    config.storage.media_dir = std::env::temp_dir()
        .join(format!("cks-ws-test-{}", uuid::Uuid::new_v4()))
        .display()
        .to_string();
    let state = cks_ai::api::create_app_state_with_providers(config, ProviderRegistry::empty())
        .await
        .expect("Failed to create app state");
    let mut hub_rx = state.hub().subscribe();
    let app = cks_ai::api::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (mut ws, _) = connect_async(format!("ws://{addr}/api/ws")).await.unwrap();
    ws.send(WsMessage::text("hello")).await.unwrap();
    ws.send(WsMessage::text("again")).await.unwrap();

    for expected in ["hello", "again"] {
        let reply = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("no echo within timeout")
            .unwrap()
            .unwrap();
        let WsMessage::Text(text) = reply else {
            panic!("expected a text frame, got {reply:?}");
        };
        let json: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Echo", "payload": {"message": expected}})
        );
    }

    ws.close(None).await.unwrap();

    for expected in ["hello", "again"] {
        match hub_rx.recv().await.unwrap() {
            HubEvent::Echo { message } => assert_eq!(message, expected),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
