//! Resolution orchestration: cache first, external capability second,
//! identity fallback always.

use std::sync::Arc;

use tracing::{debug, warn};

use super::gateway::CacheGateway;
use super::normalize::normalize;
use super::{Lang, TranslationRecord, Translator};

pub struct TranslationResolver {
    gateway: Arc<CacheGateway>,
    translator: Option<Arc<dyn Translator>>,
}

impl TranslationResolver {
    /// A resolver without a translator still works: every miss resolves to
    /// identity names (mirrors running without an API key).
    pub fn new(gateway: Arc<CacheGateway>, translator: Option<Arc<dyn Translator>>) -> Self {
        Self { gateway, translator }
    }

    /// Resolve a raw product name into its three-language record.
    ///
    /// Infallible by contract: a submission must never block or error
    /// because translation is unavailable. The worst outcome is the identity
    /// record. The cache hit is the dominant warm path and short-circuits
    /// without touching the external capability.
    pub async fn resolve(&self, raw_name: &str, input_lang: Lang) -> TranslationRecord {
        let key = normalize(raw_name);
        if let Some(record) = self.gateway.lookup(&key) {
            debug!(key = %key, "translation cache hit");
            return record;
        }

        let Some(translator) = &self.translator else {
            return TranslationRecord::identity(raw_name);
        };

        match translator.translate(raw_name, input_lang).await {
            Ok(candidates) => {
                let record = TranslationRecord::with_fallback(raw_name, candidates);
                // Best-effort: a failed cache write never fails resolution.
                self.gateway.store(&key, &record);
                record
            }
            Err(e) => {
                warn!(raw_name, error = %e, "translation failed, falling back to identity names");
                TranslationRecord::identity(raw_name)
            }
        }
    }
}
