use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

mod common;

const TOKEN: &str = "secret-token";

fn app() -> Router {
    common::create_test_app(false, &[(TOKEN, "api-user")])
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_is_public() {
    let app = app();
    let (status, body) = send(
        &app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["vocabularySize"], 40);
}

#[tokio::test]
async fn test_unauthorized_without_token() {
    let app = app();
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/vocab/status")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_token_rejected() {
    let app = app();
    let req = Request::builder()
        .uri("/api/vocab/status")
        .header(header::AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_desktop_mode_skips_token() {
    let app = common::create_test_app(true, &[]);
    let (status, body) = send(
        &app,
        Request::builder()
            .uri("/api/vocab/status")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], "local");
    assert_eq!(body["data"]["phase"], "NO_CYCLE");
}

#[tokio::test]
async fn test_quiz_flow_over_http() {
    let app = app();

    let (status, body) = send(&app, request(Method::GET, "/api/vocab/quiz/current", None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NO_ACTIVE_CYCLE");

    let (status, body) = send(
        &app,
        request(Method::POST, "/api/vocab/init", Some(json!({ "mode": 2 }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let batches = body["data"]["batches"].as_array().unwrap();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0]["words"].as_array().unwrap().len(), 5);

    let (status, _) = send(
        &app,
        request(Method::POST, "/api/vocab/init", Some(json!({}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, request(Method::GET, "/api/vocab/quiz/current", None)).await;
    assert_eq!(status, StatusCode::OK);
    let word = body["data"]["word"].as_str().unwrap().to_string();
    assert_eq!(word, batches[0]["words"][0]);
    assert!(body["data"].get("translations").is_none());

    let answer = common::translation_for(&word);
    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/vocab/quiz/answer",
            Some(json!({ "answer": answer })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["evaluation"]["feedback"], "Perfect");
    assert_eq!(body["data"]["evaluation"]["verdict"], "correct");
    assert_eq!(body["data"]["next"]["wordIndex"], 1);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/vocab/quiz/answer",
            Some(json!({ "answer": "almost" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["evaluation"]["feedback"], "Close");

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/vocab/select-batch",
            Some(json!({ "batchIndex": 1 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["batchIndex"], 1);

    let (status, body) = send(&app, request(Method::POST, "/api/vocab/advance-day", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["day"], 2);

    let (status, body) = send(&app, request(Method::GET, "/api/vocab/status", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["phase"], "ACTIVE");
    assert_eq!(body["data"]["day"], 2);
}

#[tokio::test]
async fn test_replace_known_over_http() {
    let app = app();
    let (_, body) = send(
        &app,
        request(Method::POST, "/api/vocab/init", Some(json!({ "mode": 1 }))),
    )
    .await;
    let batch = &body["data"]["batches"][0];
    let batch_id = batch["id"].as_str().unwrap().to_string();
    let known = batch["words"][2].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/vocab/replace-known",
            Some(json!({ "batchId": batch_id, "remove": [known] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["removed"][0], known.as_str());
    assert_eq!(body["data"]["batch"]["words"].as_array().unwrap().len(), 5);

    let (status, body) = send(&app, request(Method::GET, "/api/vocab/learned", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["words"][0], known.as_str());

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/api/vocab/replace-known",
            Some(json!({ "batchId": uuid::Uuid::new_v4(), "words": ["word001"] })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_profile_and_lookup_routes() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            Method::PUT,
            "/api/vocab/profile",
            Some(json!({ "level": "Beginner", "mode": 3 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], "beginner");
    assert_eq!(body["data"]["mode"], 3);

    let (status, body) = send(
        &app,
        request(Method::PUT, "/api/vocab/profile", Some(json!({ "level": "" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, request(Method::GET, "/api/vocab/words/Word007", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["translations"][0], "t7");

    let (status, body) = send(&app, request(Method::GET, "/api/vocab/words/zebra", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_search_route() {
    let app = app();
    let (status, body) = send(&app, request(Method::GET, "/api/vocab/search?q=T7", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["query"], "T7");
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["word"], "word007");
    assert_eq!(body["data"]["results"][0]["translations"][0], "t7");

    let (status, body) = send(&app, request(Method::GET, "/api/vocab/search?q=word03", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 10);

    for uri in ["/api/vocab/search?q=", "/api/vocab/search"] {
        let (status, body) = send(&app, request(Method::GET, uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let app = app();
    let (status, body) = send(&app, request(Method::GET, "/api/nothing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
