//! Year lookup client.
//!
//! Resolves an invention name to a year through one of two backends:
//! a local HTTP endpoint (`POST {"item": ...}` → `{"year": ...}`) or the
//! generative-language `generateContent` API queried with a fixed prompt.
//! Every failure mode collapses to "no year" at the worker boundary.
//!
//! The client runs on its own Tokio task so the UI loop never waits on the
//! network.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::sync::mpsc;

use crate::error::LookupError;
use crate::models::{GenerateContentRequest, GenerateContentResponse, YearRequest, YearResponse};

/// Default local lookup endpoint
pub const DEFAULT_LOCAL_ENDPOINT: &str = "http://localhost:5000/api/invention-date";
/// Default generative-language API base
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model name
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where year lookups are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupBackend {
    /// Local `/api/invention-date` style endpoint
    Local { endpoint: String },
    /// Generative-language API, prompted directly
    Gemini {
        base_url: String,
        model: String,
        api_key: String,
    },
}

impl LookupBackend {
    pub fn local(endpoint: impl Into<String>) -> Self {
        LookupBackend::Local {
            endpoint: endpoint.into(),
        }
    }

    /// Gemini backend; fails when no API key is configured
    pub fn gemini(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, LookupError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(LookupError::MissingApiKey)?;
        Ok(LookupBackend::Gemini {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
        })
    }

    /// Short name for logs and the header bar
    pub fn name(&self) -> &'static str {
        match self {
            LookupBackend::Local { .. } => "local",
            LookupBackend::Gemini { .. } => "gemini",
        }
    }
}

/// Prompt sent to the generative-language backend
pub fn invention_prompt(item: &str) -> String {
    format!(
        "When was the {} invented? Please respond with just the year \
         (use negative numbers for BCE). If you're not certain, respond with 'unknown'.",
        item
    )
}

/// Parse a model answer into a year.
///
/// The trimmed answer must be a whole signed integer, optionally followed by
/// one `.` (`"1440"`, `"-3500"`, `"1440."`). An unsigned year with a `BC` or
/// `BCE` suffix is negated (`"3500 BCE"` is -3500). Anything else, `unknown`
/// included, yields `None`.
pub fn parse_year_text(text: &str) -> Option<i32> {
    let text = text.trim();
    let text = text.strip_suffix('.').unwrap_or(text).trim_end();
    if text.eq_ignore_ascii_case("unknown") {
        return None;
    }

    if let Some(digits) = strip_era_suffix(text) {
        let digits = digits.trim_end();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        return digits.parse::<i32>().ok().map(|year| -year);
    }

    text.parse().ok()
}

/// Text before a trailing `BCE`/`BC` (any case), if present
fn strip_era_suffix(text: &str) -> Option<&str> {
    let upper = text.to_ascii_uppercase();
    ["BCE", "BC"]
        .iter()
        .find(|suffix| upper.ends_with(*suffix))
        .map(|suffix| &text[..text.len() - suffix.len()])
}

/// HTTP client for the configured lookup backend
#[derive(Debug, Clone)]
pub struct LookupClient {
    client: Client,
    backend: LookupBackend,
}

impl LookupClient {
    pub fn new(backend: LookupBackend, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, backend })
    }

    pub fn backend(&self) -> &LookupBackend {
        &self.backend
    }

    /// Look up the invention year for `item`
    pub async fn lookup_year(&self, item: &str) -> Result<i32, LookupError> {
        match &self.backend {
            LookupBackend::Local { endpoint } => self.lookup_local(endpoint, item).await,
            LookupBackend::Gemini {
                base_url,
                model,
                api_key,
            } => self.lookup_gemini(base_url, model, api_key, item).await,
        }
    }

    /// Look up `item`, logging and discarding the failure reason
    pub async fn resolve(&self, item: &str) -> Option<i32> {
        match self.lookup_year(item).await {
            Ok(year) => {
                tracing::info!(item, year, backend = self.backend.name(), "lookup resolved");
                Some(year)
            }
            Err(err) => {
                tracing::warn!(item, backend = self.backend.name(), error = %err, "lookup failed");
                None
            }
        }
    }

    async fn lookup_local(&self, endpoint: &str, item: &str) -> Result<i32, LookupError> {
        let response = self
            .client
            .post(endpoint)
            .json(&YearRequest {
                item: item.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<YearResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or(body);
            return Err(LookupError::Status { status, detail });
        }

        let parsed: YearResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        parsed
            .year
            .ok_or_else(|| LookupError::Unknown(item.to_string()))
    }

    async fn lookup_gemini(
        &self,
        base_url: &str,
        model: &str,
        api_key: &str,
        item: &str,
    ) -> Result<i32, LookupError> {
        let url = format!(
            "{}/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&GenerateContentRequest::from_prompt(invention_prompt(item)))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LookupError::Status {
                status,
                detail: body,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Decode(e.to_string()))?;
        let text = parsed
            .first_text()
            .ok_or_else(|| LookupError::Decode("response has no candidate text".to_string()))?;

        tracing::debug!(item, answer = text, "model answer");
        parse_year_text(text).ok_or_else(|| LookupError::Unknown(item.to_string()))
    }
}

/// Commands sent from the UI loop to the lookup worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupCommand {
    /// Resolve the year for a normalized label
    Lookup(String),
    /// Stop the worker
    Shutdown,
}

/// Messages sent from the lookup worker back to the UI loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupMessage {
    /// A lookup finished; `year` is `None` for every kind of failure
    Resolved { label: String, year: Option<i32> },
}

/// Serve lookup commands one at a time until shutdown or channel close
pub async fn run_lookup_worker(
    client: LookupClient,
    tx: mpsc::Sender<LookupMessage>,
    mut rx: mpsc::Receiver<LookupCommand>,
) {
    tracing::debug!(backend = client.backend().name(), "lookup worker started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            LookupCommand::Lookup(label) => {
                let year = client.resolve(&label).await;
                if tx.send(LookupMessage::Resolved { label, year }).await.is_err() {
                    break;
                }
            }
            LookupCommand::Shutdown => break,
        }
    }

    tracing::debug!("lookup worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tiny_http::{Header, Response, Server};
    use tokio::task::JoinHandle;

    /// What the stub server saw
    #[derive(Debug)]
    struct CapturedRequest {
        method: String,
        url: String,
        api_key: Option<String>,
        body: String,
    }

    /// Answer exactly one request with `status` and a JSON `body`
    fn one_shot_server(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let body = body.to_string();

        let handle = tokio::task::spawn_blocking(move || {
            let mut request = server.recv().unwrap();

            let mut request_body = String::new();
            request.as_reader().read_to_string(&mut request_body).unwrap();
            let captured = CapturedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                api_key: request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("x-goog-api-key"))
                    .map(|h| h.value.as_str().to_string()),
                body: request_body,
            };

            let content_type = Header::from_bytes("Content-Type", "application/json").unwrap();
            let response = Response::from_string(body)
                .with_status_code(status)
                .with_header(content_type);
            request.respond(response).unwrap();
            captured
        });

        (format!("http://{}", addr), handle)
    }

    fn local_client(base: &str) -> LookupClient {
        let endpoint = format!("{}/api/invention-date", base);
        LookupClient::new(LookupBackend::local(endpoint), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_year_text() {
        assert_eq!(parse_year_text("1440"), Some(1440));
        assert_eq!(parse_year_text("  -3500\n"), Some(-3500));
        assert_eq!(parse_year_text("1440."), Some(1440));
        assert_eq!(parse_year_text("+1876"), Some(1876));
        assert_eq!(parse_year_text("unknown"), None);
        assert_eq!(parse_year_text("Unknown."), None);
        assert_eq!(parse_year_text("around 1440"), None);
        assert_eq!(parse_year_text("-"), None);
        assert_eq!(parse_year_text(""), None);
        assert_eq!(parse_year_text("99999999999"), None);
    }

    #[test]
    fn test_parse_year_text_rejects_partial_numbers() {
        assert_eq!(parse_year_text("1440s"), None);
        assert_eq!(parse_year_text("1440-1450"), None);
        assert_eq!(parse_year_text("1440 CE or so"), None);
        assert_eq!(parse_year_text("1440.5"), None);
    }

    #[test]
    fn test_parse_year_text_era_suffix_is_bce() {
        assert_eq!(parse_year_text("3500 BCE"), Some(-3500));
        assert_eq!(parse_year_text("3500 BC"), Some(-3500));
        assert_eq!(parse_year_text("3500bce."), Some(-3500));
        assert_eq!(parse_year_text("-3500 BCE"), None);
        assert_eq!(parse_year_text("BCE"), None);
        assert_eq!(parse_year_text("about 3500 BC"), None);
    }

    #[test]
    fn test_prompt_mentions_item() {
        let prompt = invention_prompt("printing press");
        assert!(prompt.starts_with("When was the printing press invented?"));
        assert!(prompt.contains("'unknown'"));
    }

    #[test]
    fn test_gemini_backend_requires_key() {
        let missing = LookupBackend::gemini(DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, None);
        assert!(matches!(missing, Err(LookupError::MissingApiKey)));

        let blank = LookupBackend::gemini(
            DEFAULT_GEMINI_BASE_URL,
            DEFAULT_GEMINI_MODEL,
            Some("  ".to_string()),
        );
        assert!(matches!(blank, Err(LookupError::MissingApiKey)));

        let ok = LookupBackend::gemini(
            DEFAULT_GEMINI_BASE_URL,
            DEFAULT_GEMINI_MODEL,
            Some("k".to_string()),
        )
        .unwrap();
        assert_eq!(ok.name(), "gemini");
    }

    #[tokio::test]
    async fn test_local_lookup_success() {
        let (base, server) = one_shot_server(200, r#"{"year": 1876}"#);
        let client = local_client(&base);

        let year = client.lookup_year("telephone").await.unwrap();
        assert_eq!(year, 1876);

        let request = server.await.unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.url, "/api/invention-date");
        let sent: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(sent, serde_json::json!({ "item": "telephone" }));
    }

    #[tokio::test]
    async fn test_local_lookup_not_found() {
        let (base, _server) =
            one_shot_server(404, r#"{"error": "Could not determine invention date"}"#);
        let client = local_client(&base);

        match client.lookup_year("flux capacitor").await {
            Err(LookupError::Status { status, detail }) => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(detail, "Could not determine invention date");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_local_lookup_null_year_is_unknown() {
        let (base, _server) = one_shot_server(200, r#"{"year": null}"#);
        let client = local_client(&base);

        assert!(matches!(
            client.lookup_year("thing").await,
            Err(LookupError::Unknown(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_collapses_transport_errors() {
        // Bind and drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = local_client(&format!("http://{}", addr));
        assert_eq!(client.resolve("wheel").await, None);
    }

    #[tokio::test]
    async fn test_gemini_lookup() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"-3500\n"}]}}]}"#;
        let (base, server) = one_shot_server(200, body);
        let backend =
            LookupBackend::gemini(base.clone(), "gemini-pro", Some("secret".to_string())).unwrap();
        let client = LookupClient::new(backend, Duration::from_secs(5)).unwrap();

        assert_eq!(client.lookup_year("wheel").await.unwrap(), -3500);

        let request = server.await.unwrap();
        assert_eq!(request.url, "/models/gemini-pro:generateContent");
        assert_eq!(request.api_key.as_deref(), Some("secret"));
        let sent: GenerateContentRequest = serde_json::from_str(&request.body).unwrap();
        let prompt = sent.contents[0].parts[0].text.as_deref().unwrap();
        assert!(prompt.starts_with("When was the wheel invented?"));
    }

    #[tokio::test]
    async fn test_gemini_unknown_answer() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"unknown"}]}}]}"#;
        let (base, _server) = one_shot_server(200, body);
        let backend = LookupBackend::gemini(base, "gemini-pro", Some("k".to_string())).unwrap();
        let client = LookupClient::new(backend, Duration::from_secs(5)).unwrap();

        assert!(matches!(
            client.lookup_year("time machine").await,
            Err(LookupError::Unknown(_))
        ));
    }

    #[tokio::test]
    async fn test_worker_replies_and_stops() {
        let (base, _server) = one_shot_server(200, r#"{"year": 1969}"#);
        let client = local_client(&base);

        let (msg_tx, mut msg_rx) = mpsc::channel(4);
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let worker = tokio::spawn(run_lookup_worker(client, msg_tx, cmd_rx));

        cmd_tx
            .send(LookupCommand::Lookup("internet".to_string()))
            .await
            .unwrap();
        assert_eq!(
            msg_rx.recv().await,
            Some(LookupMessage::Resolved {
                label: "internet".to_string(),
                year: Some(1969),
            })
        );

        cmd_tx.send(LookupCommand::Shutdown).await.unwrap();
        worker.await.unwrap();
    }
}
