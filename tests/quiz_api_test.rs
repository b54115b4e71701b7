use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use skillbridge_backend::models::question::Question;
use skillbridge_backend::models::quiz::Quiz;
use skillbridge_backend::{routes, AppState};

fn setup() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        for var in [
            "OPENAI_API_KEY",
            "SMTP_HOST",
            "SMTP_USER",
            "SMTP_PASS",
            "AWS_S3_BUCKET",
            "AWS_REGION",
        ] {
            env::remove_var(var);
        }
        env::set_var("FRONTEND_BASE_URL", "http://localhost:3000");
        let _ = skillbridge_backend::config::init_config();
    });
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health::root))
        .route("/generate_quiz", post(routes::quiz::generate_quiz))
        .route(
            "/resend_quiz_email",
            post(routes::quiz::resend_quiz_email).get(routes::quiz::resend_quiz_email_get),
        )
        .route("/resend_quiz_email/", post(routes::quiz::resend_quiz_email))
        .route("/quiz/:quiz_id", get(routes::quiz::get_quiz))
        .route("/submit_quiz", post(routes::quiz::submit_quiz))
        .route("/quiz_result/:quiz_id", get(routes::quiz::quiz_result))
        .route("/final_result/:quiz_id", get(routes::quiz::final_result))
        .with_state(state)
}

async fn json_body(resp: axum::response::Response) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Three questions with known correct indices, bypassing the generator.
fn seed_quiz(state: &AppState) -> String {
    let questions: Vec<Question> = (0..3)
        .map(|i| Question {
            id: format!("q{}", i + 1),
            text: format!("Question {}", i + 1),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: i,
        })
        .collect();
    state.store.create_quiz(
        Quiz::new("seed@example.com".into(), "Rust".into(), 3),
        questions,
    )
}

#[tokio::test]
async fn quiz_lifecycle_end_to_end() {
    setup();
    let state = AppState::new();
    let app = app(state.clone());

    let resp = app.clone().oneshot(get_req("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "skillbridge-backend");

    // Offline generation falls back to local templates.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/generate_quiz",
            json!({"email": "alice@example.com", "topic": "Rust", "num_questions": 5}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let quiz_id = body["quiz_id"].as_str().unwrap().to_string();
    assert!(quiz_id.starts_with("quiz_"));
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);
    assert_eq!(body["expires_in_seconds"], 3600);
    assert_eq!(body["email_queued"], false);
    assert_eq!(
        body["quiz_url"],
        format!("http://localhost:3000/quiz/{}", quiz_id)
    );
    // The answer key must never reach the client.
    let first = &body["questions"][0];
    assert_eq!(first["options"].as_array().unwrap().len(), 4);
    assert!(first.get("correct_index").is_none());

    let resp = app
        .clone()
        .oneshot(get_req(&format!("/quiz/{}", quiz_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);

    // Wrong answer count is rejected before any scoring happens.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/submit_quiz",
            json!({"quiz_id": quiz_id, "answers": [0, 1]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/submit_quiz",
            json!({"quiz_id": quiz_id, "answers": [0, 0, 0, 0, 0]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let score = body["score"].as_u64().unwrap();
    let total = body["total"].as_u64().unwrap();
    assert_eq!(total, 5);
    let threshold = std::cmp::max(1, (0.7 * total as f64) as u64);
    assert_eq!(body["passed"].as_bool().unwrap(), score >= threshold);
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 1);

    let resp = app
        .clone()
        .oneshot(get_req(&format!("/quiz_result/{}", quiz_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["score"].as_u64().unwrap(), score);
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    setup();
    let state = AppState::new();
    let app = app(state);

    for uri in ["/quiz/quiz_0", "/quiz_result/quiz_0"] {
        let resp = app.clone().oneshot(get_req(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {}", uri);
    }

    let resp = app
        .clone()
        .oneshot(post_json(
            "/submit_quiz",
            json!({"quiz_id": "quiz_0", "answers": [0]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn question_count_is_validated() {
    setup();
    let state = AppState::new();
    let app = app(state);

    for bad_count in [0, 31] {
        let resp = app
            .clone()
            .oneshot(post_json(
                "/generate_quiz",
                json!({"email": "a@example.com", "topic": "Rust", "num_questions": bad_count}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "count {}", bad_count);
    }
}

#[tokio::test]
async fn later_submission_overwrites_prior() {
    setup();
    let state = AppState::new();
    let quiz_id = seed_quiz(&state);
    let app = app(state.clone());

    // All correct: 3/3, passed (threshold for 3 questions is 2).
    let resp = app
        .clone()
        .oneshot(post_json(
            "/submit_quiz",
            json!({"quiz_id": quiz_id, "answers": [0, 1, 2]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["score"], 3);
    assert_eq!(body["passed"], true);

    // All wrong: the earlier pass is gone, no history kept.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/submit_quiz",
            json!({"quiz_id": quiz_id, "answers": [3, 3, 3]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get_req(&format!("/quiz_result/{}", quiz_id)))
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["score"], 0);
    assert_eq!(body["passed"], false);
}

#[tokio::test]
async fn resend_reports_unconfigured_smtp() {
    setup();
    let state = AppState::new();
    let quiz_id = seed_quiz(&state);
    let app = app(state.clone());

    let expected_status = json!({"queued": false, "sent": false, "error": "not_configured"});

    let resp = app
        .clone()
        .oneshot(post_json(
            "/resend_quiz_email",
            json!({"quiz_id": quiz_id, "email": "bob@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], expected_status);

    // Trailing-slash and GET variants behave identically, and resend is
    // accepted even for quiz ids this process has never seen.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/resend_quiz_email/",
            json!({"quiz_id": "quiz_gone", "email": "bob@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(get_req(&format!(
            "/resend_quiz_email?quiz_id={}&email=carol@example.com",
            quiz_id
        )))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["status"], expected_status);

    // The known quiz picked up the new address and status.
    let quiz = state.store.get_quiz(&quiz_id).unwrap();
    assert_eq!(quiz.email, "carol@example.com");
    assert!(quiz.email_status.is_some());
}

#[tokio::test]
async fn final_result_is_null_before_stages_run() {
    setup();
    let state = AppState::new();
    let quiz_id = seed_quiz(&state);
    let app = app(state);

    let resp = app
        .clone()
        .oneshot(get_req(&format!("/final_result/{}", quiz_id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["quiz_id"], quiz_id);
    assert!(body["passed_quiz"].is_null());
    assert!(body["selected"].is_null());
    assert!(body["feedback"].is_null());
    assert!(body["video_score"].is_null());
}
