//! `cooplink serve` -- long-running webhook host plus background poller.
//!
//! The HTTP edge stays thin: it converts each delivery into a
//! transport-agnostic `WebhookRequest`, hands it to the receiver, and
//! maps the outcome to a status code. Token checks, debouncing, and
//! refresh scheduling all live in the core.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use cooplink_core::{WebhookOutcome, WebhookReceiver, WebhookRequest};

use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;

use super::App;

const DEFAULT_BIND: &str = "0.0.0.0:8787";

pub async fn run(args: ServeArgs, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.engine.refresh().await?;
    app.engine.set_polling_interval(app.polling).await;

    let receiver = Arc::new(WebhookReceiver::new(app.engine.clone(), app.webhook.clone()));
    let router = Router::new()
        .route("/webhook", post(receive))
        .route("/healthz", get(healthz))
        .with_state(receiver);

    let bind = args
        .bind
        .or_else(|| app.webhook_bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.into());
    let listener = tokio::net::TcpListener::bind(&bind).await?;

    info!(%bind, devices = app.engine.store().device_count(), "webhook host listening");
    if !global.quiet {
        eprintln!("listening on http://{bind}/webhook, press Ctrl-C to stop");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("webhook host stopped");
    Ok(())
}

async fn receive(
    State(receiver): State<Arc<WebhookReceiver>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request = WebhookRequest {
        headers: headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_owned(), v.to_owned()))
            })
            .collect(),
        query: query
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default(),
        body: serde_json::from_slice(&body).ok(),
    };

    match receiver.handle(request).await {
        WebhookOutcome::Accepted { .. } => (StatusCode::OK, "ok"),
        WebhookOutcome::Rejected => (StatusCode::UNAUTHORIZED, "unauthorized"),
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    // Shutdown on Ctrl-C; if the signal handler can't install, run
    // until killed rather than exiting immediately.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
