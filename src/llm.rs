//! LLM provider capability: playbill extraction, metadata enrichment, and
//! category matching.
//!
//! A provider is a polymorphic capability, not a class hierarchy: the three
//! operations the catalog needs are one trait, and each backend (Anthropic
//! Messages, OpenAI Chat Completions) is a struct implementing it. Prompts
//! demand bare JSON, but models routinely wrap answers in markdown code
//! fences anyway, so every response goes through [`strip_code_fence`] before
//! parsing.
//!
//! All HTTP is synchronous (`reqwest::blocking`) — the tool is a
//! run-to-completion CLI with no async runtime.

use crate::config::LlmConfig;
use crate::types::{Enrichment, ExtractedShow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::{Value, json};
use thiserror::Error;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("no API key configured for provider {0:?}")]
    MissingApiKey(String),
    #[error("unknown provider {0:?}")]
    UnknownProvider(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned an unexpected response shape: {0}")]
    BadResponse(String),
    #[error("provider returned unparsable JSON: {0}")]
    BadJson(#[from] serde_json::Error),
}

/// The three things the catalog asks of a language model.
pub trait Provider {
    fn name(&self) -> &'static str;

    /// Identify shows in a playbill or poster image.
    fn extract_shows(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<Vec<ExtractedShow>, ProviderError>;

    /// Fetch metadata for a show. When `missing_fields` is given, the
    /// provider is asked for only those fields; `None` asks for everything.
    fn enrich(
        &self,
        show_name: &str,
        theater_name: &str,
        missing_fields: Option<&[&str]>,
    ) -> Result<Enrichment, ProviderError>;

    /// Which of the user's predefined categories clearly fit this show.
    fn match_categories(
        &self,
        show_name: &str,
        theater_name: &str,
        plot_summary: &str,
        predefined: &[String],
    ) -> Result<Vec<String>, ProviderError>;
}

/// Build the configured provider.
pub fn provider_from_config(cfg: &LlmConfig) -> Result<Box<dyn Provider>, ProviderError> {
    let key = cfg
        .active_api_key()
        .ok_or_else(|| ProviderError::MissingApiKey(cfg.provider.clone()))?
        .to_string();
    match cfg.provider.as_str() {
        "anthropic" => Ok(Box::new(AnthropicProvider::new(key, &cfg.model))),
        "openai" => Ok(Box::new(OpenAiProvider::new(key, &cfg.model))),
        other => Err(ProviderError::UnknownProvider(other.to_string())),
    }
}

// ============================================================================
// Prompts (shared across providers)
// ============================================================================

const EXTRACT_PROMPT: &str = "\
Analyze this playbill or Broadway show poster image and extract:
1. Show name (the title of the Broadway show)
2. Theater name (the venue where it's performed)

Return ONLY a JSON array in this exact format, with no additional text:
[{\"show_name\": \"Show Title\", \"theater_name\": \"Theater Name\"}]

If you cannot clearly identify the information, return an empty array [].";

fn enrich_prompt(show_name: &str, theater_name: &str, missing_fields: Option<&[&str]>) -> String {
    let fields_prompt = match missing_fields {
        Some(fields) => format!(
            "Provide ONLY the following information: {}",
            fields.join(", ")
        ),
        None => "Provide the following information:
- lead_cast (list of dicts with \"role\" and \"actor\" keys for main cast members)
- director (name of director)
- choreographer (name of choreographer, if applicable)
- composer (name of composer, if applicable)
- lyricist (name of lyricist, if applicable)
- book_writer (name of book writer, if applicable)
- opening_date (YYYY-MM-DD format)
- closing_date (YYYY-MM-DD format or \"still running\")
- is_revival (true/false)
- original_production_year (year of original production if revival)
- production_type (\"Broadway\", \"Off-Broadway\", \"Tour\", etc.)
- plot_summary (2-3 sentences)
- genre (\"Musical\", \"Play\", \"Musical Revival\", etc.)
- tony_awards (list of Tony Awards won)
- other_awards (list of other major awards)
- musical_numbers (list of song titles, if applicable)
- themes (list of main themes)
- running_time (in minutes)
- intermission_count (number of intermissions)
- categories (list of auto-detected categories like \"jukebox musical\", \"comedy\", \"drama\", \"golden age musical\", etc.)"
            .to_string(),
    };

    format!(
        "Provide detailed information about the Broadway show \"{show_name}\" that played/is \
         playing at {theater_name}.\n\n{fields_prompt}\n\nReturn ONLY a JSON object with those \
         keys and no additional text. If information is not available, use null for single \
         values or empty arrays [] for lists."
    )
}

fn match_categories_prompt(
    show_name: &str,
    theater_name: &str,
    plot_summary: &str,
    predefined: &[String],
) -> String {
    let categories: Vec<String> = predefined.iter().map(|c| format!("{:?}", c)).collect();
    format!(
        "Given this Broadway show:\nShow Name: {show_name}\nTheater: {theater_name}\n\
         Plot Summary: {plot_summary}\n\n\
         Which of these predefined categories does it fit into? {}\n\n\
         Return ONLY a JSON array of matching category names, with no additional text:\n\
         [\"category1\", \"category2\"]\n\n\
         Only include categories that clearly match. If no categories match, return an empty \
         array [].",
        categories.join(", ")
    )
}

/// Strip a wrapping markdown code fence (``` or ```json) from a model reply.
/// Replies without a fence pass through untouched.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

// ============================================================================
// Anthropic
// ============================================================================

pub struct AnthropicProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, model: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            model: if model.is_empty() {
                ANTHROPIC_DEFAULT_MODEL.to_string()
            } else {
                model.to_string()
            },
        }
    }

    /// POST to the Messages API and pull out the first text block.
    fn complete(&self, content: Value, max_tokens: u32) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": content}],
        });
        let response: Value = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        response["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::BadResponse(response.to_string()))
    }
}

impl Provider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn extract_shows(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<Vec<ExtractedShow>, ProviderError> {
        let content = json!([
            {
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": media_type,
                    "data": BASE64.encode(image),
                }
            },
            {"type": "text", "text": EXTRACT_PROMPT},
        ]);
        let reply = self.complete(content, 500)?;
        Ok(serde_json::from_str(strip_code_fence(&reply))?)
    }

    fn enrich(
        &self,
        show_name: &str,
        theater_name: &str,
        missing_fields: Option<&[&str]>,
    ) -> Result<Enrichment, ProviderError> {
        let prompt = enrich_prompt(show_name, theater_name, missing_fields);
        let reply = self.complete(json!(prompt), 2000)?;
        Ok(serde_json::from_str(strip_code_fence(&reply))?)
    }

    fn match_categories(
        &self,
        show_name: &str,
        theater_name: &str,
        plot_summary: &str,
        predefined: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let prompt = match_categories_prompt(show_name, theater_name, plot_summary, predefined);
        let reply = self.complete(json!(prompt), 200)?;
        Ok(serde_json::from_str(strip_code_fence(&reply))?)
    }
}

// ============================================================================
// OpenAI
// ============================================================================

pub struct OpenAiProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key,
            model: if model.is_empty() {
                OPENAI_DEFAULT_MODEL.to_string()
            } else {
                model.to_string()
            },
        }
    }

    fn complete(&self, content: Value, max_tokens: u32) -> Result<String, ProviderError> {
        let body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": [{"role": "user", "content": content}],
        });
        let response: Value = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ProviderError::BadResponse(response.to_string()))
    }
}

impl Provider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn extract_shows(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<Vec<ExtractedShow>, ProviderError> {
        let content = json!([
            {"type": "text", "text": EXTRACT_PROMPT},
            {
                "type": "image_url",
                "image_url": {
                    "url": format!("data:{};base64,{}", media_type, BASE64.encode(image)),
                }
            },
        ]);
        let reply = self.complete(content, 500)?;
        Ok(serde_json::from_str(strip_code_fence(&reply))?)
    }

    fn enrich(
        &self,
        show_name: &str,
        theater_name: &str,
        missing_fields: Option<&[&str]>,
    ) -> Result<Enrichment, ProviderError> {
        let prompt = enrich_prompt(show_name, theater_name, missing_fields);
        let reply = self.complete(json!(prompt), 2000)?;
        Ok(serde_json::from_str(strip_code_fence(&reply))?)
    }

    fn match_categories(
        &self,
        show_name: &str,
        theater_name: &str,
        plot_summary: &str,
        predefined: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        let prompt = match_categories_prompt(show_name, theater_name, plot_summary, predefined);
        let reply = self.complete(json!(prompt), 200)?;
        Ok(serde_json::from_str(strip_code_fence(&reply))?)
    }
}

/// Media type for an image path, by extension. JPEG unless clearly PNG,
/// which matches the formats the scan directories accept.
pub fn media_type_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    // =========================================================================
    // Fence stripping
    // =========================================================================

    #[test]
    fn bare_json_passes_through() {
        assert_eq!(strip_code_fence(r#"{"a": 1}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn plain_fence_stripped() {
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn json_fence_stripped() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        assert_eq!(strip_code_fence("  \n[]\n  "), "[]");
    }

    #[test]
    fn fenced_reply_parses_as_extraction() {
        let reply = "```json\n[{\"show_name\": \"Hadestown\", \"theater_name\": \"Walter Kerr Theatre\"}]\n```";
        let shows: Vec<ExtractedShow> =
            serde_json::from_str(strip_code_fence(reply)).unwrap();
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].show_name, "Hadestown");
    }

    // =========================================================================
    // Prompt construction
    // =========================================================================

    #[test]
    fn enrich_prompt_limits_to_missing_fields() {
        let p = enrich_prompt("Chess", "Imperial Theatre", Some(&["genre", "themes"]));
        assert!(p.contains("ONLY the following information: genre, themes"));
        assert!(!p.contains("lead_cast (list of dicts"));
    }

    #[test]
    fn enrich_prompt_full_when_no_missing_list() {
        let p = enrich_prompt("Chess", "Imperial Theatre", None);
        assert!(p.contains("lead_cast"));
        assert!(p.contains("intermission_count"));
        assert!(p.contains("Chess"));
        assert!(p.contains("Imperial Theatre"));
    }

    #[test]
    fn match_prompt_quotes_predefined_categories() {
        let cats = vec!["date night".to_string(), "sondheim".to_string()];
        let p = match_categories_prompt("Company", "Jacobs", "A birthday.", &cats);
        assert!(p.contains("\"date night\""));
        assert!(p.contains("\"sondheim\""));
    }

    // =========================================================================
    // Factory and misc
    // =========================================================================

    #[test]
    fn factory_requires_api_key() {
        let cfg = LlmConfig::default();
        assert!(matches!(
            provider_from_config(&cfg),
            Err(ProviderError::MissingApiKey(_))
        ));
    }

    #[test]
    fn factory_builds_configured_provider() {
        let mut cfg = LlmConfig::default();
        cfg.anthropic_api_key = "sk-ant-test".to_string();
        let provider = provider_from_config(&cfg).unwrap();
        assert_eq!(provider.name(), "anthropic");

        cfg.provider = "openai".to_string();
        cfg.openai_api_key = "sk-test".to_string();
        let provider = provider_from_config(&cfg).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn media_type_by_extension() {
        assert_eq!(media_type_for(Path::new("a.png")), "image/png");
        assert_eq!(media_type_for(Path::new("a.PNG")), "image/png");
        assert_eq!(media_type_for(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(media_type_for(Path::new("a.jpeg")), "image/jpeg");
    }
}
