//! HTTP contract of the analysis endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use mystem_gateway::config::ListenerConfig;
use mystem_gateway::http::X_REQUEST_ID;
use mystem_gateway::{Gateway, HttpServer, Shutdown};
use serde_json::Value;
use tower::ServiceExt;

mod common;
use common::{fixed, mystem_json, spawn_fake_analyzer, tagged, FakeStats};

fn form_body(text: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("text", text)
        .finish()
}

fn post_form(body: String) -> Request<Body> {
    Request::builder()
        .uri("/mystem")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn app(delay: Duration, deadline: Duration) -> (Router, Arc<FakeStats>) {
    let (channel, stats) = spawn_fake_analyzer(fixed(delay), mystem_json);
    let gateway = Arc::new(Gateway::with_limits(channel, deadline, None));
    let server = HttpServer::new(ListenerConfig::default(), gateway);
    (server.router(), stats)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_post_word() {
    let (app, _stats) = app(Duration::ZERO, Duration::from_secs(1));

    let response = app.oneshot(post_form(form_body("слон"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_string(response).await, mystem_json(0, "слон"));
}

#[tokio::test]
async fn test_post_sentence() {
    let (app, _stats) = app(Duration::ZERO, Duration::from_secs(1));
    let sentence = "Съешь еще этих мягких французских булок";

    let response = app.oneshot(post_form(form_body(sentence))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 6);
    assert_eq!(body, mystem_json(0, sentence));
}

#[tokio::test]
async fn test_get_with_query_string() {
    let (app, _stats) = app(Duration::ZERO, Duration::from_secs(1));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/mystem?{}", form_body("мама")))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, mystem_json(0, "мама"));
}

#[tokio::test]
async fn test_empty_and_missing_text_are_no_content() {
    let (app, stats) = app(Duration::ZERO, Duration::from_secs(1));

    for body in [form_body(""), String::new(), "other=field".to_string()] {
        let response = app.clone().oneshot(post_form(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(stats.received().is_empty(), "empty input reached the analyzer");
}

#[tokio::test]
async fn test_post_without_form_content_type_is_no_content() {
    let (app, stats) = app(Duration::ZERO, Duration::from_secs(1));

    let bare = Request::builder()
        .uri("/mystem")
        .method(Method::POST)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(bare).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json_body = Request::builder()
        .uri("/mystem")
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"text":"слон"}"#))
        .unwrap();
    let response = app.oneshot(json_body).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(stats.received().is_empty());
}

#[tokio::test]
async fn test_post_reads_query_string() {
    let (app, _stats) = app(Duration::ZERO, Duration::from_secs(1));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/mystem?{}", form_body("слон")))
                .method(Method::POST)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, mystem_json(0, "слон"));
}

#[tokio::test]
async fn test_form_body_wins_over_query_string() {
    let (app, stats) = app(Duration::ZERO, Duration::from_secs(1));

    let mut request = post_form(form_body("из тела"));
    *request.uri_mut() = format!("/mystem?{}", form_body("из адреса")).parse().unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stats.received(), vec!["из тела"]);
}

#[tokio::test]
async fn test_undecodable_form_is_internal_error() {
    let (app, stats) = app(Duration::ZERO, Duration::from_secs(1));

    let response = app
        .oneshot(post_form("text=one&text=two".to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(stats.received().is_empty());
}

#[tokio::test]
async fn test_timeout_is_internal_error() {
    let (app, _stats) = app(Duration::from_millis(50), Duration::from_millis(10));

    let response = app.oneshot(post_form(form_body("слон"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response).await.contains("did not answer within 10ms"));
}

#[tokio::test]
async fn test_dead_analyzer_is_internal_error() {
    let (to_analyzer, analyzer_stdin) = tokio::io::duplex(64);
    let (analyzer_stdout, from_analyzer) = tokio::io::duplex(64);
    drop(analyzer_stdin);
    drop(analyzer_stdout);
    let gateway = Arc::new(Gateway::with_limits(
        mystem_gateway::PipeChannel::new(to_analyzer, from_analyzer),
        Duration::from_secs(1),
        None,
    ));
    let app = HttpServer::new(ListenerConfig::default(), gateway).router();

    let response = app.oneshot(post_form(form_body("слон"))).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(response).await.contains("analyzer pipe I/O failed"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (app, _stats) = app(Duration::ZERO, Duration::from_secs(1));

    let generated = app
        .clone()
        .oneshot(post_form(form_body("слон")))
        .await
        .unwrap();
    assert!(generated.headers().contains_key(X_REQUEST_ID));

    let mut request = post_form(form_body("слон"));
    request
        .headers_mut()
        .insert(X_REQUEST_ID, "client-chosen".parse().unwrap());
    let echoed = app.oneshot(request).await.unwrap();
    assert_eq!(echoed.headers().get(X_REQUEST_ID).unwrap(), "client-chosen");
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _stats) = app(Duration::ZERO, Duration::from_secs(1));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "operational");
    assert_eq!(json["analyzer"], "idle");
    assert_eq!(json["waiting"], 0);
    assert_eq!(json["deadline_ms"], 1000);
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_silent_analyzer_degrades_instead_of_hanging() {
    let (channel, _stats) = spawn_fake_analyzer(fixed(Duration::from_secs(3600)), tagged);
    let gateway = Arc::new(
        Gateway::with_limits(channel, Duration::from_millis(20), None)
            .with_grace(Duration::from_millis(50)),
    );
    let app = HttpServer::new(ListenerConfig::default(), gateway).router();

    let first = app.clone().oneshot(post_form(form_body("a"))).await.unwrap();
    assert_eq!(first.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let second = tokio::time::timeout(
        Duration::from_secs(3),
        app.clone().oneshot(post_form(form_body("b"))),
    )
    .await
    .expect("request stuck behind a silent analyzer")
    .unwrap();
    assert_eq!(second.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_string(second).await.contains("out of sync"));

    let health = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let json: Value = serde_json::from_str(&body_string(health).await).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["analyzer"], "out_of_sync");
}

#[tokio::test]
async fn test_concurrent_clients_over_tcp() {
    let (channel, stats) = spawn_fake_analyzer(fixed(Duration::from_millis(5)), tagged);
    let gateway = Arc::new(Gateway::with_limits(channel, Duration::from_secs(2), None));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(ListenerConfig::default(), gateway);
    let server_shutdown = shutdown.subscribe();
    let server_task = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let url = format!("http://{addr}/mystem");

    let requests: Vec<_> = (0..8)
        .map(|i| {
            let client = client.clone();
            let url = url.clone();
            tokio::spawn(async move {
                let text = format!("запрос {i}");
                let res = client
                    .post(&url)
                    .form(&[("text", text.as_str())])
                    .send()
                    .await
                    .expect("Gateway unreachable");
                (text, res.status(), res.text().await.unwrap())
            })
        })
        .collect();

    for request in futures_util::future::join_all(requests).await {
        let (text, status, body) = request.unwrap();
        assert_eq!(status, 200);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["text"], text.as_str());
    }
    assert_eq!(stats.max_in_flight(), 1);

    drop(client);
    shutdown.trigger();
    server_task.await.unwrap().unwrap();
}
