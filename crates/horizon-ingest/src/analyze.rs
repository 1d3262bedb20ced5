//! LLM analysis backend: summarize and classify collected text.
//!
//! The backend talks to an OpenAI-compatible chat completions endpoint and
//! post-processes whatever comes back into a fully bounded [`Analysis`]:
//! missing or invalid fields are replaced with deterministic defaults, never
//! left to vary between retries of the same input. Grounding is enforced in
//! the prompt: the model analyzes only the supplied text and reports
//! insufficient content instead of inventing an analysis.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use horizon_core::{
    defaults, Analysis, AnalysisBackend, Certainty, Error, Horizon, Result, SignalStub,
};

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_OPENAI_URL: &str = defaults::OPENAI_URL;

/// OpenAI-compatible analysis backend.
pub struct OpenAiAnalysisBackend {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
}

impl OpenAiAnalysisBackend {
    /// Create a backend with explicit configuration.
    pub fn with_config(base_url: String, api_key: Option<String>, model: String) -> Self {
        let timeout_secs = std::env::var("HORIZON_ANALYZE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::ANALYZE_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url,
            api_key,
            model,
            timeout_secs,
        }
    }

    /// Create from environment variables (`OPENAI_BASE_URL`,
    /// `OPENAI_API_KEY`, `HORIZON_ANALYZE_MODEL`).
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string());
        let api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        let model = std::env::var("HORIZON_ANALYZE_MODEL")
            .unwrap_or_else(|_| defaults::ANALYZE_MODEL.to_string());
        Self::with_config(base_url, api_key, model)
    }

    async fn chat(&self, system: &str, user: &str, json_mode: bool) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is not set".to_string()))?;

        let start = Instant::now();
        debug!(
            subsystem = "ingest",
            component = "analyze",
            provider = "openai",
            model = %self.model,
            json_mode,
            "Starting completion"
        );

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: 0.2,
            response_format: json_mode.then(|| serde_json::json!({"type": "json_object"})),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(Duration::from_secs(self.timeout_secs))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => {
                    Error::Config("OPENAI_API_KEY was rejected by the provider".to_string())
                }
                429 if body.contains("insufficient_quota") => {
                    Error::QuotaExhausted(format!("analysis provider: {}", body))
                }
                429 => Error::RateLimited(format!("analysis provider: {}", body)),
                _ => Error::Inference(format!("provider returned {}: {}", status, body)),
            });
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("completion payload: {}", e)))?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::MalformedResponse("no choices in completion".to_string()))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = content.len(),
            duration_ms = elapsed,
            "Completion finished"
        );
        if elapsed > 60_000 {
            warn!(duration_ms = elapsed, slow = true, "Slow analysis operation");
        }

        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

const ANALYZE_SYSTEM_PROMPT: &str = "You are a strategic foresight analyst. \
You classify collected evidence for a horizon-scanning team. Ground every \
statement strictly in the supplied text; never infer from the URL or title \
alone, and never invent facts the text does not support.";

fn analyze_prompt(content: &str, title: Option<&str>, url: Option<&str>) -> String {
    let preview: String = content.chars().take(defaults::ANALYZE_CONTENT_PREVIEW).collect();
    let mut header = String::new();
    if let Some(t) = title {
        header.push_str(&format!("Title: {}\n", t));
    }
    if let Some(u) = url {
        header.push_str(&format!("URL: {}\n", u));
    }

    format!(
        r#"Analyze the following text and respond with a single JSON object:

{{
  "summary": "<= 1200 character summary of the text itself",
  "takeaways": ["exactly three short takeaways"],
  "tags": ["2 to 6 lowercase-hyphenated topic tags"],
  "relevance": <integer 0-100, how relevant this is for foresight work>,
  "horizon": "0_5" | "5_10" | "10_plus",
  "certainty": "certain" | "uncertain" | "wildcard"
}}

If the text does not contain enough substance to analyze, respond with
{{"insufficient_content": true}} instead of guessing.

{}Text:
{}"#,
        header, preview
    )
}

/// Raw, untrusted shape of the model's analysis JSON. Every field is
/// optional; `finalize_analysis` fills the gaps deterministically.
#[derive(Debug, Default, Deserialize)]
pub struct RawAnalysis {
    #[serde(default)]
    pub insufficient_content: bool,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub takeaways: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub relevance: Option<serde_json::Value>,
    #[serde(default)]
    pub horizon: Option<String>,
    #[serde(default)]
    pub certainty: Option<String>,
}

/// Extract the JSON object embedded in a model response, tolerating code
/// fences and surrounding prose.
pub fn extract_json_object(raw: &str) -> Result<RawAnalysis> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let slice = match (start, end) {
        (Some(s), Some(e)) if e > s => &raw[s..=e],
        _ => {
            return Err(Error::MalformedResponse(
                "no JSON object in model output".to_string(),
            ))
        }
    };
    serde_json::from_str(slice)
        .map_err(|e| Error::MalformedResponse(format!("analysis JSON: {}", e)))
}

/// Truncate to a maximum number of characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

/// Normalize a tag to lowercase-hyphenated form. Returns an empty string
/// when nothing usable remains.
pub fn normalize_tag(raw: &str) -> String {
    let mut out = String::new();
    let mut prev_hyphen = true; // suppress leading hyphens
    for c in raw.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_hyphen = false;
        } else if c.is_whitespace() || matches!(c, '_' | '-' | '/' | '.') {
            if !prev_hyphen {
                out.push('-');
                prev_hyphen = true;
            }
        }
        // Anything else (emoji, punctuation) is dropped.
    }
    out.trim_end_matches('-').to_string()
}

fn coerce_relevance(value: Option<&serde_json::Value>) -> i32 {
    let parsed = match value {
        Some(serde_json::Value::Number(n)) => {
            n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))
        }
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) => v.clamp(0, 100) as i32,
        None => defaults::RELEVANCE_DEFAULT,
    }
}

/// Convert a raw model payload into a fully bounded [`Analysis`].
///
/// Deterministic for a given input: clamps the summary, forces exactly
/// three takeaways (padding from summary sentences, then a fixed filler),
/// normalizes tags into the 2-6 band, clamps relevance, and substitutes
/// enum defaults for missing or invalid values.
pub fn finalize_analysis(raw: RawAnalysis) -> Analysis {
    let summary = truncate_chars(raw.summary.unwrap_or_default().trim(), defaults::SUMMARY_MAX);

    let mut takeaways: Vec<String> = raw
        .takeaways
        .unwrap_or_default()
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(defaults::TAKEAWAY_COUNT)
        .collect();
    if takeaways.len() < defaults::TAKEAWAY_COUNT {
        for sentence in summary.split('.') {
            if takeaways.len() >= defaults::TAKEAWAY_COUNT {
                break;
            }
            let s = sentence.trim();
            if s.is_empty() {
                continue;
            }
            let candidate = format!("{}.", s);
            if !takeaways.contains(&candidate) {
                takeaways.push(candidate);
            }
        }
    }
    while takeaways.len() < defaults::TAKEAWAY_COUNT {
        takeaways.push(defaults::TAKEAWAY_FILLER.to_string());
    }

    let mut tags: Vec<String> = Vec::new();
    for raw_tag in raw.tags.unwrap_or_default() {
        let tag = normalize_tag(&raw_tag);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
        if tags.len() >= defaults::TAG_MAX {
            break;
        }
    }
    for fallback in defaults::FALLBACK_TAGS {
        if tags.len() >= defaults::TAG_MIN {
            break;
        }
        if !tags.contains(&fallback.to_string()) {
            tags.push(fallback.to_string());
        }
    }

    let horizon = raw
        .horizon
        .as_deref()
        .and_then(|h| h.parse::<Horizon>().ok())
        .unwrap_or_default();
    let certainty = raw
        .certainty
        .as_deref()
        .and_then(|c| c.parse::<Certainty>().ok())
        .unwrap_or_default();

    Analysis {
        summary,
        takeaways,
        tags,
        relevance: coerce_relevance(raw.relevance.as_ref()),
        horizon,
        certainty,
    }
}

#[async_trait]
impl AnalysisBackend for OpenAiAnalysisBackend {
    async fn analyze(
        &self,
        content: &str,
        title: Option<&str>,
        url: Option<&str>,
    ) -> Result<Analysis> {
        let trimmed = content.trim();
        let len = trimmed.chars().count();
        if len < defaults::ANALYZE_MIN_CONTENT_CHARS {
            return Err(Error::ContentTooShort(len));
        }

        let raw = self
            .chat(ANALYZE_SYSTEM_PROMPT, &analyze_prompt(trimmed, title, url), true)
            .await?;

        let parsed = extract_json_object(&raw)?;
        if parsed.insufficient_content {
            return Err(Error::NoContent(
                "model reported insufficient content".to_string(),
            ));
        }

        let analysis = finalize_analysis(parsed);
        info!(
            subsystem = "ingest",
            component = "analyze",
            op = "summarize",
            model = %self.model,
            relevance = analysis.relevance,
            tag_count = analysis.tags.len(),
            "Analysis complete"
        );
        Ok(analysis)
    }

    async fn describe(&self, title: &str, signals: &[SignalStub]) -> Result<String> {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".to_string()));
        }

        let mut evidence = String::new();
        for stub in signals.iter().take(defaults::DESCRIBE_MAX_SIGNALS) {
            evidence.push_str(&format!("- {}", stub.title));
            if let Some(summary) = &stub.summary {
                evidence.push_str(&format!(": {}", truncate_chars(summary, 200)));
            }
            evidence.push('\n');
        }
        if evidence.is_empty() {
            evidence.push_str("(no linked signals)\n");
        }

        let prompt = format!(
            r#"Write a trend description of at most 1800 characters for the trend "{}".

Base it only on the linked signals below. Plain prose, no headings, no
bullet lists, no invented evidence.

Signals:
{}"#,
            title.trim(),
            evidence
        );

        let raw = self
            .chat(
                "You are a strategic foresight analyst writing concise trend descriptions.",
                &prompt,
                false,
            )
            .await?;

        let description = truncate_chars(raw.trim(), defaults::TREND_DESCRIPTION_MAX);
        if description.is_empty() {
            return Err(Error::NoContent("model returned an empty description".to_string()));
        }
        Ok(description)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag_lowercases_and_hyphenates() {
        assert_eq!(normalize_tag("Quantum Computing"), "quantum-computing");
        assert_eq!(normalize_tag("AI/ML ops"), "ai-ml-ops");
        assert_eq!(normalize_tag("  gene_editing  "), "gene-editing");
    }

    #[test]
    fn test_normalize_tag_strips_invalid_chars() {
        assert_eq!(normalize_tag("CRISPR!!!"), "crispr");
        assert_eq!(normalize_tag("--weird--"), "weird");
        assert_eq!(normalize_tag("🚀"), "");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let s = "é".repeat(10);
        assert_eq!(truncate_chars(&s, 5).chars().count(), 5);
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_extract_json_object_tolerates_fences() {
        let raw = "```json\n{\"summary\": \"ok\"}\n```";
        let parsed = extract_json_object(raw).unwrap();
        assert_eq!(parsed.summary.as_deref(), Some("ok"));
    }

    #[test]
    fn test_extract_json_object_rejects_prose() {
        assert!(extract_json_object("I could not analyze this.").is_err());
    }

    #[test]
    fn test_finalize_fills_all_defaults_from_empty_payload() {
        let analysis = finalize_analysis(RawAnalysis::default());
        assert_eq!(analysis.relevance, defaults::RELEVANCE_DEFAULT);
        assert_eq!(analysis.horizon, Horizon::FiveToTen);
        assert_eq!(analysis.certainty, Certainty::Uncertain);
        assert_eq!(analysis.takeaways.len(), defaults::TAKEAWAY_COUNT);
        assert!(analysis.tags.len() >= defaults::TAG_MIN);
        assert!(analysis.tags.len() <= defaults::TAG_MAX);
    }

    #[test]
    fn test_finalize_clamps_relevance() {
        let raw = RawAnalysis {
            relevance: Some(serde_json::json!(250)),
            ..Default::default()
        };
        assert_eq!(finalize_analysis(raw).relevance, 100);

        let raw = RawAnalysis {
            relevance: Some(serde_json::json!(-3)),
            ..Default::default()
        };
        assert_eq!(finalize_analysis(raw).relevance, 0);
    }

    #[test]
    fn test_finalize_coerces_string_relevance() {
        let raw = RawAnalysis {
            relevance: Some(serde_json::json!("72")),
            ..Default::default()
        };
        assert_eq!(finalize_analysis(raw).relevance, 72);
    }

    #[test]
    fn test_finalize_defaults_invalid_enums() {
        let raw = RawAnalysis {
            horizon: Some("next_week".to_string()),
            certainty: Some("definitely".to_string()),
            ..Default::default()
        };
        let analysis = finalize_analysis(raw);
        assert_eq!(analysis.horizon, Horizon::FiveToTen);
        assert_eq!(analysis.certainty, Certainty::Uncertain);
    }

    #[test]
    fn test_finalize_truncates_excess_takeaways_and_pads_short_lists() {
        let raw = RawAnalysis {
            takeaways: Some(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
            ..Default::default()
        };
        assert_eq!(finalize_analysis(raw).takeaways, vec!["a", "b", "c"]);

        let raw = RawAnalysis {
            summary: Some("First point. Second point. Third point.".to_string()),
            takeaways: Some(vec!["Only one".into()]),
            ..Default::default()
        };
        let analysis = finalize_analysis(raw);
        assert_eq!(analysis.takeaways.len(), 3);
        assert_eq!(analysis.takeaways[0], "Only one");
        assert_eq!(analysis.takeaways[1], "First point.");
    }

    #[test]
    fn test_finalize_caps_summary_at_1200() {
        let raw = RawAnalysis {
            summary: Some("x".repeat(5000)),
            ..Default::default()
        };
        assert_eq!(
            finalize_analysis(raw).summary.chars().count(),
            defaults::SUMMARY_MAX
        );
    }

    #[test]
    fn test_finalize_dedupes_and_caps_tags() {
        let raw = RawAnalysis {
            tags: Some(vec![
                "AI".into(),
                "ai".into(),
                "robotics".into(),
                "energy".into(),
                "climate".into(),
                "policy".into(),
                "security".into(),
                "extra".into(),
            ]),
            ..Default::default()
        };
        let tags = finalize_analysis(raw).tags;
        assert_eq!(tags.len(), defaults::TAG_MAX);
        assert_eq!(tags[0], "ai");
        assert_eq!(tags.iter().filter(|t| *t == "ai").count(), 1);
    }

    #[test]
    fn test_analyze_prompt_mentions_escape_hatch() {
        let prompt = analyze_prompt("some content", Some("Title"), None);
        assert!(prompt.contains("insufficient_content"));
        assert!(prompt.contains("Title: Title"));
    }
}
