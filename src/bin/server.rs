use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use panel_nesting::input::NestingRequest;
use panel_nesting::{BoardRuleResolver, Error, NestingReport};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

async fn nest(
    State(resolver): State<Arc<BoardRuleResolver>>,
    Json(req): Json<NestingRequest>,
) -> Result<Json<NestingReport>, (StatusCode, String)> {
    tracing::info!(
        pieces = req.pieces.len(),
        gap_mm = req.settings.gap_mm,
        edge_margin_mm = req.settings.edge_margin_mm,
        "POST /nest"
    );

    match panel_nesting::nest(&req, &resolver) {
        Ok(report) => Ok(Json(report)),
        Err(e @ Error::Internal(_)) => {
            tracing::error!(error = %e, "nesting failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

fn load_resolver() -> BoardRuleResolver {
    match std::env::var("NESTING_RULES") {
        Ok(path) => BoardRuleResolver::from_json_file(&path).unwrap_or_else(|e| {
            eprintln!("Error: {path}: {e}");
            std::process::exit(1);
        }),
        Err(_) => BoardRuleResolver::default(),
    }
}

fn main() {
    let _sentry = sentry::init((
        std::env::var("SENTRY_DSN").ok(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    ));

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(serve(load_resolver()));
}

async fn serve(resolver: BoardRuleResolver) {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/nest", post(nest))
        .with_state(Arc::new(resolver))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
