//! Attribution probe: typed consent call with legacy flag-only fallback.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{SdkError, SdkResult};
use crate::export::ConsentExport;
use crate::logger::EventLogger;
use crate::types::ConsentStatus;

use super::modules::AttributionConsent;
use super::registry::ModuleRegistry;
use super::{grant_flag, in_eea_scope, ConsentProbe};

pub struct AttributionProbe {
    registry: Arc<ModuleRegistry>,
    logger: Arc<EventLogger>,
}

impl AttributionProbe {
    pub fn new(registry: Arc<ModuleRegistry>, logger: Arc<EventLogger>) -> Self {
        Self { registry, logger }
    }
}

impl ConsentProbe for AttributionProbe {
    fn name(&self) -> &str {
        "attribution"
    }

    fn is_available(&self) -> bool {
        self.registry.attribution().is_some()
    }

    fn propagate(&self, export: &ConsentExport, status: &ConsentStatus) -> SdkResult<()> {
        let Some(module) = self.registry.attribution() else {
            return Ok(());
        };
        let Some(flags) = export.google_consent_mode() else {
            self.logger
                .info("google consent mode data is unavailable, nothing to push");
            return Ok(());
        };

        let consent = AttributionConsent {
            is_eea: in_eea_scope(status),
            ad_user_data: grant_flag(flags.ad_user_data_granted),
            ad_personalization: grant_flag(flags.ad_personalization_granted),
        };

        match module.set_consent_data(consent.clone()) {
            Ok(()) => Ok(()),
            Err(SdkError::ModuleIncompatible(_)) => {
                self.logger
                    .info("typed consent entry point unavailable, using legacy fields");
                let fields: BTreeMap<String, Value> = BTreeMap::from([
                    ("is_eea".to_string(), Value::Bool(consent.is_eea)),
                    (
                        "ad_user_data".to_string(),
                        Value::String(consent.ad_user_data),
                    ),
                    (
                        "ad_personalization".to_string(),
                        Value::String(consent.ad_personalization),
                    ),
                ]);
                module.set_consent_fields(fields)
            }
            Err(error) => Err(error),
        }
    }
}
