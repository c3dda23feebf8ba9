//! Gemini generateContent translation client.
//! Connection pooling via reqwest, simple token-bucket rate limiting, and
//! retry logic: 429 honors Retry-After, 5xx backs off exponentially,
//! timeouts retry once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{Lang, RawTranslations, TranslateError, Translator};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini chat client requesting all three target languages in one call.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    /// Simple token-bucket: tracks the next allowed request time.
    next_allowed: Arc<tokio::sync::Mutex<Instant>>,
    /// Minimum interval between requests (e.g. 100ms = 10 req/s).
    min_interval: Duration,
}

impl GeminiClient {
    /// Create a new client. Reads `GEMINI_API_KEY` from the environment.
    pub fn new() -> Result<Self, TranslateError> {
        let api_key = std::env::var("GEMINI_API_KEY").map_err(|_| {
            TranslateError::InvalidInput("GEMINI_API_KEY environment variable not set".into())
        })?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TranslateError::ApiError(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: DEFAULT_MODEL.into(),
            next_allowed: Arc::new(tokio::sync::Mutex::new(Instant::now())),
            min_interval: Duration::from_millis(100), // 10 req/s
        })
    }

    /// Wait until the rate limiter allows a request.
    async fn rate_limit_wait(&self) {
        let mut next = self.next_allowed.lock().await;
        let now = Instant::now();
        if *next > now {
            tokio::time::sleep(*next - now).await;
        }
        *next = Instant::now() + self.min_interval;
    }

    /// Send request with retry logic.
    /// 429: Retry-After or 1s/2s/4s (max 3).
    /// 5xx: exponential backoff (max 2).
    /// Timeout: immediate retry once.
    async fn send_with_retry(
        &self,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, TranslateError> {
        let mut attempt: u32 = 0;
        let max_429_retries: u32 = 3;
        let max_5xx_retries: u32 = 2;
        let mut timeout_retried = false;

        loop {
            let result = self
                .http
                .post(format!(
                    "{}/v1beta/models/{}:generateContent",
                    self.base_url, self.model
                ))
                .header("x-goog-api-key", &self.api_key)
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await;

            match result {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(resp);
                }
                Ok(resp) if resp.status().as_u16() == 429 => {
                    if attempt >= max_429_retries {
                        return Err(TranslateError::RateLimited { retry_after_ms: 0 });
                    }
                    let wait = resp
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .map(Duration::from_secs)
                        .unwrap_or_else(|| Duration::from_secs(1 << attempt));
                    warn!(attempt, wait_ms = wait.as_millis() as u64, "429 rate limited, retrying");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Ok(resp) if resp.status().is_server_error() => {
                    if attempt >= max_5xx_retries {
                        return Err(TranslateError::ApiError(format!(
                            "server error: {}",
                            resp.status()
                        )));
                    }
                    let wait = Duration::from_millis(500 * (1 << attempt));
                    warn!(
                        attempt,
                        status = resp.status().as_u16(),
                        wait_ms = wait.as_millis() as u64,
                        "5xx error, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body_text = resp.text().await.unwrap_or_default();
                    return Err(TranslateError::ApiError(format!(
                        "unexpected status {}: {}",
                        status,
                        body_text.chars().take(200).collect::<String>()
                    )));
                }
                Err(e) if e.is_timeout() => {
                    if timeout_retried {
                        return Err(TranslateError::Timeout);
                    }
                    warn!("request timeout, retrying once");
                    timeout_retried = true;
                }
                Err(e) => {
                    return Err(TranslateError::ApiError(e.to_string()));
                }
            }
        }
    }
}

#[async_trait]
impl Translator for GeminiClient {
    async fn translate(
        &self,
        raw_name: &str,
        input_lang: Lang,
    ) -> Result<RawTranslations, TranslateError> {
        let name = raw_name.trim();
        if name.is_empty() {
            return Err(TranslateError::InvalidInput("empty product name".into()));
        }

        self.rate_limit_wait().await;

        let body = serde_json::json!({
            "contents": [
                { "parts": [{ "text": build_prompt(name, input_lang) }] }
            ],
            "generationConfig": { "temperature": 0.1, "maxOutputTokens": 256 }
        });

        let response = self.send_with_retry(&body).await?;
        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TranslateError::Malformed(e.to_string()))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
            .ok_or_else(|| TranslateError::Malformed("response carried no candidate text".into()))?;

        parse_translations(text)
    }
}

// --- Prompt construction ---

/// One compact prompt per submission; the model answers with bare JSON.
fn build_prompt(name: &str, input_lang: Lang) -> String {
    format!(
        "You are a professional kitchen translator. Translate the following \
         food or kitchen product name into Turkish (tr), German (de) and \
         Punjabi (pa, written in Latin script).\n\n\
         Product name: \"{name}\"\n\
         Input language: {}\n\n\
         Answer with JSON only, no explanation:\n\
         {{\"tr\": \"...\", \"de\": \"...\", \"pa\": \"...\"}}\n\n\
         Translate the product name only, never add quantities or units. If \
         a slot is already in the right language, keep it unchanged.",
        input_lang.prompt_name()
    )
}

/// The model sometimes wraps its JSON in markdown fences; strip them before
/// parsing. Anything that still fails to parse is malformed output and the
/// resolver falls back to identity names.
fn parse_translations(text: &str) -> Result<RawTranslations, TranslateError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim())
        .map_err(|e| TranslateError::Malformed(format!("unparseable translation payload: {e}")))
}

// --- Response types ---

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let parsed =
            parse_translations(r#"{"tr": "Domates", "de": "Tomaten", "pa": "Tamatar"}"#).unwrap();
        assert_eq!(parsed.tr.as_deref(), Some("Domates"));
        assert_eq!(parsed.de.as_deref(), Some("Tomaten"));
        assert_eq!(parsed.pa.as_deref(), Some("Tamatar"));
    }

    #[test]
    fn strips_markdown_fences() {
        let parsed = parse_translations(
            "```json\n{\"tr\": \"Süt\", \"de\": \"Milch\", \"pa\": \"Dudh\"}\n```",
        )
        .unwrap();
        assert_eq!(parsed.de.as_deref(), Some("Milch"));
    }

    #[test]
    fn tolerates_missing_slots() {
        let parsed = parse_translations(r#"{"tr": "Biber"}"#).unwrap();
        assert_eq!(parsed.tr.as_deref(), Some("Biber"));
        assert!(parsed.de.is_none());
        assert!(parsed.pa.is_none());
    }

    #[test]
    fn rejects_prose_answers() {
        assert!(matches!(
            parse_translations("Sure! Here is the translation."),
            Err(TranslateError::Malformed(_))
        ));
    }

    #[test]
    fn prompt_names_the_product_and_language() {
        let prompt = build_prompt("Domates", Lang::Tr);
        assert!(prompt.contains("\"Domates\""));
        assert!(prompt.contains("Turkish"));
    }
}
