//! Translation pipeline: the three fixed languages, three-language name
//! records, and the external translation capability boundary.

pub mod cache;
pub mod gateway;
pub mod gemini;
pub mod normalize;
pub mod resolver;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The three fixed languages of the ordering list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Tr,
    De,
    Pa,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Tr, Lang::De, Lang::Pa];

    pub fn tag(self) -> &'static str {
        match self {
            Lang::Tr => "tr",
            Lang::De => "de",
            Lang::Pa => "pa",
        }
    }

    /// Decode a stored language tag. Unknown tags fall back to Turkish,
    /// the list's default language.
    pub fn from_tag(tag: &str) -> Lang {
        match tag {
            "de" => Lang::De,
            "pa" => Lang::Pa,
            _ => Lang::Tr,
        }
    }

    /// Language name as spelled out in the translation prompt.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Lang::Tr => "Turkish",
            Lang::De => "German",
            Lang::Pa => "Punjabi",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Display names for one product in all three languages.
///
/// Invariant: every slot is non-empty. Resolution substitutes the raw input
/// name for any language the capability omits, and the identity record maps
/// all three slots to the raw name. Records are immutable once cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub tr: String,
    pub de: String,
    pub pa: String,
}

impl TranslationRecord {
    /// Record mapping every language to the raw input name. Used when the
    /// external capability is unavailable or fails: the submitter sees their
    /// own input in all three slots and the line stays fully usable.
    pub fn identity(raw: &str) -> Self {
        Self {
            tr: raw.to_string(),
            de: raw.to_string(),
            pa: raw.to_string(),
        }
    }

    /// Build from per-language candidates, substituting `raw` for any
    /// missing or blank slot.
    pub fn with_fallback(raw: &str, candidates: RawTranslations) -> Self {
        fn pick(candidate: Option<String>, raw: &str) -> String {
            match candidate {
                Some(s) if !s.trim().is_empty() => s,
                _ => raw.to_string(),
            }
        }
        Self {
            tr: pick(candidates.tr, raw),
            de: pick(candidates.de, raw),
            pa: pick(candidates.pa, raw),
        }
    }

    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Tr => &self.tr,
            Lang::De => &self.de,
            Lang::Pa => &self.pa,
        }
    }
}

/// Per-language candidates returned by the external capability, possibly
/// incomplete. The resolver fills the gaps before anything is cached.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTranslations {
    pub tr: Option<String>,
    pub de: Option<String>,
    pub pa: Option<String>,
}

/// Translator trait (adapter for different backends).
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a raw product name into all three target languages.
    async fn translate(
        &self,
        raw_name: &str,
        input_lang: Lang,
    ) -> Result<RawTranslations, TranslateError>;
}

#[derive(Debug)]
pub enum TranslateError {
    ApiError(String),
    RateLimited { retry_after_ms: u64 },
    Timeout,
    Malformed(String),
    InvalidInput(String),
}

impl std::fmt::Display for TranslateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslateError::ApiError(msg) => write!(f, "API error: {msg}"),
            TranslateError::RateLimited { retry_after_ms } => {
                write!(f, "rate limited, retry after {retry_after_ms}ms")
            }
            TranslateError::Timeout => write!(f, "translation timeout"),
            TranslateError::Malformed(msg) => write!(f, "malformed response: {msg}"),
            TranslateError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
        }
    }
}

/// Echo translator for wiring tests without a live API.
pub struct StubTranslator;

#[async_trait]
impl Translator for StubTranslator {
    async fn translate(
        &self,
        raw_name: &str,
        _input_lang: Lang,
    ) -> Result<RawTranslations, TranslateError> {
        Ok(RawTranslations {
            tr: Some(format!("{raw_name} (tr)")),
            de: Some(format!("{raw_name} (de)")),
            pa: Some(format!("{raw_name} (pa)")),
        })
    }
}
