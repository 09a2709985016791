// Hand-crafted async HTTP client for the Omlet smart-coop cloud API.
//
// Base path: /api/v1/
// Auth: Authorization: Bearer <api key>

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::types::{ConfigurationEnvelope, DeviceEnvelope, WhoAmI};
use crate::{Error, TransportConfig};

// ── Error response shape from the Omlet API ──────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Omlet cloud API.
///
/// Uses bearer-token authentication and communicates via JSON REST
/// endpoints under `/api/v1/`.
#[derive(Clone)]
pub struct CoopClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl CoopClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API key and transport config.
    ///
    /// Injects `Authorization: Bearer <key>` as a sensitive default
    /// header on every request.
    pub fn from_api_key(
        base_url: &str,
        api_key: &secrecy::SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(api_key)?;
        Self::from_reqwest(base_url, http, transport)
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout_secs: transport.timeout.as_secs(),
        })
    }

    /// Build the base URL ending in `/api/v1/`.
    ///
    /// Accepts `https://host`, `https://host/api/v1`, or either with a
    /// trailing slash.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        // Strip trailing slash for uniform handling
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/api/v1") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/v1/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"device"`) onto the base URL.
    ///
    /// Leading slashes are stripped so that action URLs advertised by
    /// the API as `/device/{id}/action/{name}` resolve under `/api/v1/`
    /// instead of replacing the whole path.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await.map_err(|e| self.wrap(e))?;
        self.handle_response(resp).await
    }

    async fn post_optional<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.wrap(e))?;
        self.handle_optional(resp).await
    }

    async fn patch_optional<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<Value>, Error> {
        let url = self.url(path)?;
        debug!("PATCH {url}");

        let resp = self
            .http
            .patch(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.wrap(e))?;
        self.handle_optional(resp).await
    }

    /// Map reqwest timeouts onto the dedicated variant so callers can
    /// report the configured deadline.
    fn wrap(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(e)
        }
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    /// Like `handle_response`, but a 204 or an empty body yields `None`.
    async fn handle_optional(&self, resp: reqwest::Response) -> Result<Option<Value>, Error> {
        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if status.is_success() {
            let body = resp.text().await?;
            if body.trim().is_empty() {
                return Ok(None);
            }
            return serde_json::from_str(&body)
                .map(Some)
                .map_err(|e| Error::Deserialization {
                    message: e.to_string(),
                    body,
                });
        }
        Err(Self::parse_error(status, resp).await)
    }

    async fn parse_error(status: StatusCode, resp: reqwest::Response) -> Error {
        if status == StatusCode::UNAUTHORIZED {
            return Error::Authentication;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
            Error::Api {
                status: status.as_u16(),
                message: err
                    .message
                    .or(err.error)
                    .unwrap_or_else(|| status.to_string()),
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `GET /whoami` — validates the credential and identifies the account.
    pub async fn whoami(&self) -> Result<WhoAmI, Error> {
        self.get("whoami").await
    }

    /// `GET /device` — every device on the account, with nested state,
    /// configuration, and advertised actions.
    pub async fn list_devices(&self) -> Result<Vec<DeviceEnvelope>, Error> {
        self.get("device").await
    }

    /// `GET /device/{id}` — a single device envelope.
    pub async fn get_device(&self, device_id: &str) -> Result<DeviceEnvelope, Error> {
        self.get(&format!("device/{device_id}")).await
    }

    /// `GET /device/{id}/configuration` — just the settable configuration.
    pub async fn get_configuration(
        &self,
        device_id: &str,
    ) -> Result<ConfigurationEnvelope, Error> {
        self.get(&format!("device/{device_id}/configuration")).await
    }

    /// `PATCH /device/{id}/configuration` with a partial configuration
    /// document. Only the keys present in `patch` are changed upstream.
    ///
    /// Returns the response body if the API sends one, `None` on 204.
    pub async fn patch_configuration(
        &self,
        device_id: &str,
        patch: &Value,
    ) -> Result<Option<Value>, Error> {
        self.patch_optional(&format!("device/{device_id}/configuration"), patch)
            .await
    }

    /// `POST` to an action URL previously advertised by the API.
    ///
    /// `action_path` may carry a leading slash (the API advertises
    /// absolute-looking paths like `/device/{id}/action/open`).
    pub async fn execute_action(&self, action_path: &str) -> Result<Option<Value>, Error> {
        self.post_optional(action_path, &Value::Object(serde_json::Map::new()))
            .await
    }
}
