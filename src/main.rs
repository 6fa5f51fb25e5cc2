mod agent;
mod db;
mod entities;
mod models;
mod notify;
mod routes;
mod state;
mod token;
mod wallet;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::CorsLayer;

use notify::Notifier;
use state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Database path
    #[arg(short, long, env = "DATABASE_PATH", default_value = "icolite.db")]
    db_path: String,

    /// External host the site is served from (e.g. your domain)
    #[arg(long, env = "EXTERNAL_HOST", default_value = "localhost")]
    external_host: String,

    /// Support address shown in notification-failure messages
    #[arg(long, env = "SITE_EMAIL", default_value = "support@localhost")]
    site_email: String,

    /// Webhook URL notifications are delivered to
    #[arg(long, env = "NOTIFY_WEBHOOK")]
    notify_webhook: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let port = args.port;

    // JWT secret: from env, from file, or generate and save to file
    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        let secret_path = std::path::Path::new("jwt_secret.key");
        if let Ok(saved) = std::fs::read_to_string(secret_path) {
            let saved = saved.trim().to_string();
            if !saved.is_empty() {
                tracing::info!("Loaded JWT secret from jwt_secret.key");
                return saved;
            }
        }
        // Generate new secret and persist it
        use rand::Rng;
        let secret: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();
        if let Err(e) = std::fs::write(secret_path, &secret) {
            tracing::warn!("Could not save JWT secret to file: {e}");
        } else {
            tracing::info!("Generated and saved JWT secret to jwt_secret.key");
        }
        secret
    });

    tracing::info!("Initializing database at {}", args.db_path);
    let conn = db::init_db(&args.db_path).await;

    if args.notify_webhook.is_none() {
        tracing::warn!("NOTIFY_WEBHOOK not set; account notifications will not be delivered");
    }

    let state = AppState::new(
        conn,
        jwt_secret,
        args.external_host,
        args.site_email,
        Notifier::new(args.notify_webhook),
    );

    let allowed_host = state.external_host.clone();

    let app = Router::new()
        // Auth
        .route("/api/register", post(routes::auth::register))
        .route("/api/login", post(routes::auth::login))
        .route("/api/logout", post(routes::auth::logout))
        .route("/api/verified", get(routes::auth::verified))
        .route("/api/registered", get(routes::auth::registered))
        .route("/api/me", get(routes::auth::get_me))
        // Account
        .route("/api/account", get(routes::account::get_account))
        .route("/api/account/update", post(routes::account::account_update))
        .route(
            "/api/account/password/{token}",
            get(routes::account::password_confirm),
        )
        .route(
            "/api/account/wallet-form",
            get(routes::account::wallet_form),
        )
        .route("/api/referrals", get(routes::account::referrals))
        // Activity
        .route("/api/activity", get(routes::activity::list_activity))
        .route(
            "/api/activity/delete",
            post(routes::activity::delete_activity),
        )
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(move |req, next| {
            validate_host(req, next, allowed_host.clone())
        }))
        // State
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .unwrap();
}

/// Reject requests with an unexpected Host header (DNS rebinding protection).
async fn validate_host(req: Request, next: Next, allowed_host: String) -> Response {
    if let Some(host_val) = req.headers().get("host").and_then(|v| v.to_str().ok()) {
        let host_str = host_val.split(':').next().unwrap_or(host_val);
        let is_local = host_str == "localhost" || host_str == "127.0.0.1" || host_str == "[::1]";
        let is_allowed = host_str == allowed_host;
        if !is_local && !is_allowed {
            return axum::http::Response::builder()
                .status(421)
                .body(axum::body::Body::from("Misdirected Request"))
                .unwrap()
                .into_response();
        }
    }
    next.run(req).await
}
