//! Analytics probe: Google-consent-mode flags as `"granted"`/`"denied"`.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{SdkError, SdkResult};
use crate::export::ConsentExport;
use crate::logger::EventLogger;
use crate::types::ConsentStatus;

use super::registry::ModuleRegistry;
use super::{grant_flag, ConsentProbe};

const FLAGS_UPDATED_EVENT: &str = "consent_flags_updated";

pub struct AnalyticsProbe {
    registry: Arc<ModuleRegistry>,
    logger: Arc<EventLogger>,
}

impl AnalyticsProbe {
    pub fn new(registry: Arc<ModuleRegistry>, logger: Arc<EventLogger>) -> Self {
        Self { registry, logger }
    }
}

impl ConsentProbe for AnalyticsProbe {
    fn name(&self) -> &str {
        "analytics"
    }

    fn is_available(&self) -> bool {
        self.registry.analytics().is_some()
    }

    fn propagate(&self, export: &ConsentExport, _status: &ConsentStatus) -> SdkResult<()> {
        let Some(module) = self.registry.analytics() else {
            return Ok(());
        };
        let Some(flags) = export.google_consent_mode() else {
            self.logger
                .info("google consent mode data is unavailable, nothing to push");
            return Ok(());
        };

        let consent: BTreeMap<String, String> = BTreeMap::from([
            ("ad_storage".to_string(), grant_flag(flags.ad_storage_granted)),
            (
                "analytics_storage".to_string(),
                grant_flag(flags.analytics_storage_granted),
            ),
            (
                "ad_user_data".to_string(),
                grant_flag(flags.ad_user_data_granted),
            ),
            (
                "ad_personalization".to_string(),
                grant_flag(flags.ad_personalization_granted),
            ),
        ]);

        module.set_consent(consent.clone())?;

        // The flags-updated event is best effort; older module surfaces
        // without an event sink still get the consent push above.
        if let Err(SdkError::ModuleIncompatible(detail)) =
            module.log_event(FLAGS_UPDATED_EVENT, consent)
        {
            self.logger.debug(&detail);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::modules::AnalyticsModule;
    use crate::storage::keys;
    use crate::storage::memory::MemoryStore;
    use crate::storage::ConsentStore;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAnalytics {
        consents: Mutex<Vec<BTreeMap<String, String>>>,
        events: Mutex<Vec<String>>,
    }

    impl AnalyticsModule for RecordingAnalytics {
        fn set_consent(&self, consent: BTreeMap<String, String>) -> SdkResult<()> {
            self.consents.lock().expect("consents").push(consent);
            Ok(())
        }

        fn log_event(&self, name: &str, _params: BTreeMap<String, String>) -> SdkResult<()> {
            self.events.lock().expect("events").push(name.to_string());
            Ok(())
        }
    }

    /// set_consent works but there is no event sink.
    struct LegacyAnalytics {
        consents: Mutex<usize>,
    }

    impl AnalyticsModule for LegacyAnalytics {
        fn set_consent(&self, _consent: BTreeMap<String, String>) -> SdkResult<()> {
            *self.consents.lock().expect("consents") += 1;
            Ok(())
        }
    }

    fn export_with_flags() -> ConsentExport {
        let store = MemoryStore::new();
        store.set(keys::GOOGLE_AD_STORAGE, json!("granted"));
        store.set(keys::GOOGLE_ANALYTICS_STORAGE, json!("granted"));
        store.set(keys::GOOGLE_AD_USER_DATA, json!("denied"));
        store.set(keys::GOOGLE_AD_PERSONALIZATION, json!("denied"));
        ConsentExport::new(Arc::new(store))
    }

    #[test]
    fn unavailable_without_registration() {
        let probe = AnalyticsProbe::new(
            Arc::new(ModuleRegistry::new()),
            Arc::new(EventLogger::new()),
        );
        assert!(!probe.is_available());
    }

    #[test]
    fn pushes_mapped_flags_and_event() {
        let registry = Arc::new(ModuleRegistry::new());
        let module = Arc::new(RecordingAnalytics::default());
        registry.set_analytics(module.clone());

        let probe = AnalyticsProbe::new(registry, Arc::new(EventLogger::new()));
        assert!(probe.is_available());
        probe
            .propagate(&export_with_flags(), &ConsentStatus::default())
            .expect("propagate");

        let consents = module.consents.lock().expect("consents");
        assert_eq!(consents.len(), 1);
        assert_eq!(consents[0]["ad_storage"], "granted");
        assert_eq!(consents[0]["analytics_storage"], "granted");
        assert_eq!(consents[0]["ad_user_data"], "denied");
        assert_eq!(consents[0]["ad_personalization"], "denied");
        assert_eq!(
            *module.events.lock().expect("events"),
            vec![FLAGS_UPDATED_EVENT.to_string()]
        );
    }

    #[test]
    fn missing_event_sink_is_tolerated() {
        let registry = Arc::new(ModuleRegistry::new());
        let module = Arc::new(LegacyAnalytics {
            consents: Mutex::new(0),
        });
        registry.set_analytics(module.clone());

        let probe = AnalyticsProbe::new(registry, Arc::new(EventLogger::new()));
        probe
            .propagate(&export_with_flags(), &ConsentStatus::default())
            .expect("propagate");
        assert_eq!(*module.consents.lock().expect("consents"), 1);
    }

    #[test]
    fn no_flags_is_a_quiet_no_op() {
        let registry = Arc::new(ModuleRegistry::new());
        let module = Arc::new(RecordingAnalytics::default());
        registry.set_analytics(module.clone());

        let probe = AnalyticsProbe::new(registry, Arc::new(EventLogger::new()));
        let empty = ConsentExport::new(Arc::new(MemoryStore::new()));
        probe
            .propagate(&empty, &ConsentStatus::default())
            .expect("propagate");
        assert!(module.consents.lock().expect("consents").is_empty());
    }
}
