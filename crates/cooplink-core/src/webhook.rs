// ── Webhook ingestion ──
//
// Transport-agnostic receiver for vendor push notifications. The HTTP
// edge (axum in the CLI) converts its request into a `WebhookRequest`
// and maps the outcome back to a status code. The receiver never
// applies payload contents to the store; an accepted event only
// schedules a full re-sync, debounced so notification bursts collapse
// into one pass.

use std::time::Instant;

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::WebhookConfig;
use crate::engine::SyncEngine;

/// Auth schemes accepted in the `Authorization` header.
const AUTH_SCHEMES: [&str; 4] = ["bearer", "token", "apikey", "api-key"];

/// Vendor headers checked for a token, most specific first.
const TOKEN_HEADERS: [&str; 9] = [
    "x-omlet-token",
    "x-omlet-webhook-token",
    "x-webhook-token",
    "x-webhook-secret",
    "x-omlet-secret",
    "x-omlet-auth-token",
    "x-omlet-auth",
    "x-api-key",
    "x-auth-token",
];

const TOKEN_PAYLOAD_KEYS: [&str; 4] = ["token", "secret", "webhook_token", "webhookToken"];
const TOKEN_QUERY_KEYS: [&str; 3] = ["token", "secret", "webhook_token"];

/// A webhook delivery, decoupled from any HTTP framework.
#[derive(Debug, Clone, Default)]
pub struct WebhookRequest {
    /// Header name/value pairs; names matched case-insensitively.
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl WebhookRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// The parsed notification body. Every field is optional; vendors
/// change payload shapes without notice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub payload: Option<WebhookPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub parameter_name: Option<String>,
    #[serde(default)]
    pub old_value: Option<Value>,
    #[serde(default)]
    pub new_value: Option<Value>,
}

/// What the HTTP edge should answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Event accepted (HTTP 200). `refresh_scheduled` is false when the
    /// event landed inside the debounce window.
    Accepted { refresh_scheduled: bool },
    /// Token required but missing or wrong (HTTP 401).
    Rejected,
}

pub struct WebhookReceiver {
    engine: SyncEngine,
    config: WebhookConfig,
    last_scheduled: Mutex<Option<Instant>>,
}

impl WebhookReceiver {
    pub fn new(engine: SyncEngine, config: WebhookConfig) -> Self {
        Self {
            engine,
            config,
            last_scheduled: Mutex::new(None),
        }
    }

    /// Authenticate, log, debounce, schedule. Returns before the
    /// triggered sync pass runs.
    pub async fn handle(&self, request: WebhookRequest) -> WebhookOutcome {
        if let Some(expected) = &self.config.token {
            let provided = extract_token(&request);
            if provided.as_deref() != Some(expected.expose_secret()) {
                warn!(
                    token_present = provided.is_some(),
                    "webhook rejected: token mismatch"
                );
                return WebhookOutcome::Rejected;
            }
        }

        if let Some(body) = &request.body {
            match serde_json::from_value::<WebhookEvent>(body.clone()) {
                Ok(event) => {
                    if let Some(p) = event.payload {
                        debug!(
                            device = p.device_id.as_deref().unwrap_or("?"),
                            parameter = p.parameter_name.as_deref().unwrap_or("?"),
                            "webhook event received"
                        );
                    }
                }
                Err(e) => debug!(error = %e, "webhook body not in expected shape"),
            }
        }

        let mut last = self.last_scheduled.lock().await;
        let now = Instant::now();
        if let Some(previous) = *last {
            if now.duration_since(previous) < self.config.debounce {
                debug!("webhook debounced");
                return WebhookOutcome::Accepted {
                    refresh_scheduled: false,
                };
            }
        }
        *last = Some(now);
        drop(last);

        self.engine.schedule_refresh().await;
        WebhookOutcome::Accepted {
            refresh_scheduled: true,
        }
    }
}

/// Pull a token out of a delivery, in priority order: `Authorization`
/// header, vendor headers, payload fields (top level then nested
/// `payload`), query parameters.
fn extract_token(request: &WebhookRequest) -> Option<String> {
    if let Some(auth) = request.header("authorization") {
        let auth = auth.trim();
        let value = match auth.split_once(' ') {
            Some((scheme, rest)) if AUTH_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) => {
                rest.trim()
            }
            _ => auth,
        };
        if !value.is_empty() {
            return Some(value.to_owned());
        }
    }

    for header in TOKEN_HEADERS {
        if let Some(value) = request.header(header) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }

    if let Some(Value::Object(body)) = &request.body {
        let mut candidates = vec![body];
        if let Some(Value::Object(nested)) = body.get("payload") {
            candidates.push(nested);
        }
        for candidate in candidates {
            for key in TOKEN_PAYLOAD_KEYS {
                if let Some(value) = candidate.get(key) {
                    let token = match value {
                        Value::String(s) => s.trim().to_owned(),
                        Value::Number(n) => n.to_string(),
                        _ => continue,
                    };
                    if !token.is_empty() {
                        return Some(token);
                    }
                }
            }
        }
    }

    for key in TOKEN_QUERY_KEYS {
        if let Some(value) = request.query_param(key) {
            let value = value.trim();
            if !value.is_empty() {
                return Some(value.to_owned());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_headers(pairs: &[(&str, &str)]) -> WebhookRequest {
        WebhookRequest {
            headers: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            ..WebhookRequest::default()
        }
    }

    #[test]
    fn authorization_schemes_are_stripped() {
        for auth in ["Bearer s3cret", "token s3cret", "ApiKey s3cret", "api-key s3cret"] {
            let req = with_headers(&[("Authorization", auth)]);
            assert_eq!(extract_token(&req).as_deref(), Some("s3cret"), "{auth}");
        }
    }

    #[test]
    fn bare_authorization_value_is_a_token() {
        let req = with_headers(&[("Authorization", "s3cret")]);
        assert_eq!(extract_token(&req).as_deref(), Some("s3cret"));
    }

    #[test]
    fn authorization_outranks_vendor_headers() {
        let req = with_headers(&[
            ("X-Omlet-Token", "vendor"),
            ("Authorization", "Bearer auth"),
        ]);
        assert_eq!(extract_token(&req).as_deref(), Some("auth"));
    }

    #[test]
    fn vendor_header_lookup_is_case_insensitive() {
        let req = with_headers(&[("X-OMLET-TOKEN", "s3cret")]);
        assert_eq!(extract_token(&req).as_deref(), Some("s3cret"));
    }

    #[test]
    fn payload_fields_top_level_then_nested() {
        let req = WebhookRequest {
            body: Some(serde_json::json!({"payload": {"webhookToken": "nested"}})),
            ..WebhookRequest::default()
        };
        assert_eq!(extract_token(&req).as_deref(), Some("nested"));

        let req = WebhookRequest {
            body: Some(serde_json::json!({
                "token": "top",
                "payload": {"webhookToken": "nested"}
            })),
            ..WebhookRequest::default()
        };
        assert_eq!(extract_token(&req).as_deref(), Some("top"));
    }

    #[test]
    fn query_params_are_last_resort() {
        let req = WebhookRequest {
            query: vec![("token".into(), "query".into())],
            ..WebhookRequest::default()
        };
        assert_eq!(extract_token(&req).as_deref(), Some("query"));
    }

    #[test]
    fn whitespace_tokens_do_not_count() {
        let req = with_headers(&[("X-Omlet-Token", "   ")]);
        assert_eq!(extract_token(&req), None);
    }
}
