//! Optional mood-inference enrichment over an OpenAI-compatible chat API.
//!
//! The pipeline treats this service as untrusted: whatever goes wrong —
//! network failure, error status, unparseable reply, out-of-range values —
//! the outcome is [`HintOutcome::Unavailable`] and the rule-based
//! interpretation stands. Nothing in this module can fail a queue request.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::InferenceConfig;
use crate::mood::{HintOutcome, MoodHint};

/// Request timeout for inference calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum spacing between inference calls.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(500);

const TEMPERATURE: f32 = 0.3;

const SYSTEM_PROMPT: &str = "You translate human mood descriptions into structured music targets. \
Reply with a single JSON object with fields: valence (0-1), energy (0-1), \
search_terms (list of strings), prefer_popular, prefer_obscure, prefer_recent, \
prefer_classics (booleans). No prose.";

/// Minimum-interval limiter, owned by whichever client it is injected into.
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Block until the next request is allowed.
    pub fn wait(&self) {
        let mut last = self.last_request.lock().unwrap();
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

/// Seam between the pipeline and the inference backend.
pub trait MoodInference {
    /// Ask for a mood hint. Must never panic or error; any failure mode is
    /// reported as [`HintOutcome::Unavailable`].
    fn infer(&self, mood_text: &str, intense: bool, soft: bool) -> HintOutcome;
}

/// Blocking HTTP client for an OpenAI-compatible chat-completions endpoint.
pub struct InferenceClient {
    http: reqwest::blocking::Client,
    cfg: InferenceConfig,
    limiter: RateLimiter,
}

impl InferenceClient {
    pub fn new(cfg: InferenceConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            cfg,
            limiter: RateLimiter::new(MIN_REQUEST_INTERVAL),
        })
    }
}

impl MoodInference for InferenceClient {
    fn infer(&self, mood_text: &str, intense: bool, soft: bool) -> HintOutcome {
        let Some(api_key) = self.cfg.api_key.as_deref() else {
            debug!("Inference disabled: no API key configured");
            return HintOutcome::Unavailable;
        };

        self.limiter.wait();

        let url = format!("{}/chat/completions", self.cfg.base_url);
        let request = ChatRequest {
            model: self.cfg.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Mood description: {mood_text:?}\nFlags: intense={intense}, soft={soft}"
                    ),
                },
            ],
            temperature: TEMPERATURE,
        };

        debug!("Requesting mood hint from {} (model {})", self.cfg.base_url, self.cfg.model);
        let response = match self.http.post(&url).bearer_auth(api_key).json(&request).send() {
            Ok(response) => response,
            Err(e) => {
                warn!("Inference request failed: {e}; keeping rule-based interpretation");
                return HintOutcome::Unavailable;
            }
        };

        if !response.status().is_success() {
            warn!(
                "Inference service returned {}; keeping rule-based interpretation",
                response.status()
            );
            return HintOutcome::Unavailable;
        }

        let payload: ChatResponse = match response.json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not parse inference response: {e}");
                return HintOutcome::Unavailable;
            }
        };

        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        match hint_from_reply(&content) {
            Some(hint) => {
                debug!(
                    "Inference hint accepted: valence {:.2}, energy {:.2}",
                    hint.valence, hint.energy
                );
                HintOutcome::Hint(hint)
            }
            None => {
                warn!("Inference reply carried no usable hint");
                HintOutcome::Unavailable
            }
        }
    }
}

/// Pull a usable hint out of a model reply.
///
/// Replies may wrap the JSON in markdown fences or surround it with prose;
/// both are tolerated. Returns `None` for anything that does not
/// deserialize into an in-range [`MoodHint`].
fn hint_from_reply(content: &str) -> Option<MoodHint> {
    let json = extract_json(content)?;
    let hint: MoodHint = serde_json::from_str(&json).ok()?;
    hint.is_valid().then_some(hint)
}

/// Locate the JSON object inside a chat reply: strip a ```json fence when
/// present, then take the outermost brace pair.
fn extract_json(text: &str) -> Option<String> {
    let mut text = text.trim();
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        if let Some(end) = rest.find("```") {
            text = rest[..end].trim();
        }
    } else if let Some(start) = text.find("```") {
        let rest = &text[start + 3..];
        if let Some(end) = rest.find("```") {
            text = rest[..end].trim();
        }
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (close > open).then(|| text[open..=close].to_string())
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_from_plain_json() {
        let hint = hint_from_reply(r#"{"valence": 0.8, "energy": 0.3}"#).expect("usable hint");
        assert_eq!(hint.valence, 0.8);
        assert_eq!(hint.energy, 0.3);
        assert!(hint.search_terms.is_empty());
        assert_eq!(hint.prefer_popular, None);
    }

    #[test]
    fn test_hint_from_fenced_reply() {
        let reply = "Here is the interpretation:\n```json\n{\"valence\": 0.9, \"energy\": 0.1, \"search_terms\": [\"deep focus\"], \"prefer_obscure\": true}\n```\nHope that helps!";
        let hint = hint_from_reply(reply).expect("usable hint");
        assert_eq!(hint.valence, 0.9);
        assert_eq!(hint.search_terms, vec!["deep focus".to_string()]);
        assert_eq!(hint.prefer_obscure, Some(true));
    }

    #[test]
    fn test_hint_from_prose_wrapped_json() {
        let reply = "Sure! {\"valence\": 0.4, \"energy\": 0.6} is my reading.";
        let hint = hint_from_reply(reply).expect("usable hint");
        assert_eq!(hint.valence, 0.4);
    }

    #[test]
    fn test_unusable_replies_yield_none() {
        assert!(hint_from_reply("").is_none());
        assert!(hint_from_reply("no json here").is_none());
        assert!(hint_from_reply("{broken json").is_none());
        // Out-of-range vector values invalidate the whole hint.
        assert!(hint_from_reply(r#"{"valence": 1.5, "energy": 0.5}"#).is_none());
        assert!(hint_from_reply(r#"{"valence": 0.5, "energy": -0.2}"#).is_none());
        // Missing required fields.
        assert!(hint_from_reply(r#"{"energy": 0.5}"#).is_none());
    }

    #[test]
    fn test_extract_json_variants() {
        assert_eq!(extract_json("{\"a\": 1}"), Some("{\"a\": 1}".to_string()));
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), Some("{\"a\": 1}".to_string()));
        assert_eq!(extract_json("x ```json\n{\"a\": 1}\n``` y"), Some("{\"a\": 1}".to_string()));
        assert_eq!(extract_json("nothing"), None);
    }

    #[test]
    fn test_rate_limiter_spaces_requests() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.wait();
        let first = start.elapsed();
        limiter.wait();
        let second = start.elapsed();

        assert!(first < Duration::from_millis(40), "first call should not block");
        assert!(second >= Duration::from_millis(45), "second call should be spaced out");
    }

    #[test]
    fn test_missing_api_key_is_unavailable() {
        let client = InferenceClient::new(InferenceConfig::default()).expect("client builds");
        assert!(matches!(
            client.infer("some mood", false, false),
            HintOutcome::Unavailable
        ));
    }
}
