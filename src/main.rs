use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use skillbridge_backend::{
    config::{get_config, init_config},
    middleware::{cors, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let app_state = AppState::new();

    let api = Router::new()
        .route("/", get(routes::health::root))
        .route("/generate_quiz", post(routes::quiz::generate_quiz))
        .route(
            "/resend_quiz_email",
            post(routes::quiz::resend_quiz_email).get(routes::quiz::resend_quiz_email_get),
        )
        // Some clients append a trailing slash.
        .route(
            "/resend_quiz_email/",
            post(routes::quiz::resend_quiz_email),
        )
        .route("/quiz/:quiz_id", get(routes::quiz::get_quiz))
        .route("/submit_quiz", post(routes::quiz::submit_quiz))
        .route("/quiz_result/:quiz_id", get(routes::quiz::quiz_result))
        .route("/submit_video", post(routes::video::submit_video))
        .route("/submit_video_url", post(routes::video::submit_video_url))
        .route("/final_result/:quiz_id", get(routes::quiz::final_result))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::RateLimiter::new(config.public_rps),
            rate_limit::rps_middleware,
        ));

    let app = api
        .with_state(app_state)
        .layer(cors::reflective_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
