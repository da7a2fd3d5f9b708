//! Sharing probe: granular third-party-sharing options with `"1"`/`"0"`
//! encodings.

use std::sync::Arc;

use crate::error::SdkResult;
use crate::export::ConsentExport;
use crate::logger::EventLogger;
use crate::types::ConsentStatus;

use super::modules::ThirdPartySharing;
use super::registry::ModuleRegistry;
use super::{binary_flag, in_eea_scope, ConsentProbe};

const DMA_PARTNER: &str = "google_dma";

pub struct SharingProbe {
    registry: Arc<ModuleRegistry>,
    logger: Arc<EventLogger>,
}

impl SharingProbe {
    pub fn new(registry: Arc<ModuleRegistry>, logger: Arc<EventLogger>) -> Self {
        Self { registry, logger }
    }
}

impl ConsentProbe for SharingProbe {
    fn name(&self) -> &str {
        "sharing"
    }

    fn is_available(&self) -> bool {
        self.registry.sharing().is_some()
    }

    fn propagate(&self, export: &ConsentExport, status: &ConsentStatus) -> SdkResult<()> {
        let Some(module) = self.registry.sharing() else {
            return Ok(());
        };
        let Some(flags) = export.google_consent_mode() else {
            self.logger
                .info("google consent mode data is unavailable, nothing to push");
            return Ok(());
        };

        let mut sharing = ThirdPartySharing::new(true);
        sharing.add_granular_option(DMA_PARTNER, "eea", binary_flag(in_eea_scope(status)));
        sharing.add_granular_option(
            DMA_PARTNER,
            "ad_personalization",
            binary_flag(flags.ad_personalization_granted),
        );
        sharing.add_granular_option(
            DMA_PARTNER,
            "ad_user_data",
            binary_flag(flags.ad_user_data_granted),
        );

        module.track_sharing(sharing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::modules::SharingModule;
    use crate::storage::keys;
    use crate::storage::memory::MemoryStore;
    use crate::storage::ConsentStore;
    use crate::types::ConsentScope;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSharing {
        payloads: Mutex<Vec<ThirdPartySharing>>,
    }

    impl SharingModule for RecordingSharing {
        fn track_sharing(&self, sharing: ThirdPartySharing) -> SdkResult<()> {
            self.payloads.lock().expect("payloads").push(sharing);
            Ok(())
        }
    }

    fn export_with_flags() -> ConsentExport {
        let store = MemoryStore::new();
        store.set(keys::GOOGLE_AD_STORAGE, json!("granted"));
        store.set(keys::GOOGLE_ANALYTICS_STORAGE, json!("granted"));
        store.set(keys::GOOGLE_AD_USER_DATA, json!("granted"));
        store.set(keys::GOOGLE_AD_PERSONALIZATION, json!("denied"));
        ConsentExport::new(Arc::new(store))
    }

    #[test]
    fn maps_scope_and_flags_to_binary_options() {
        let registry = Arc::new(ModuleRegistry::new());
        let module = Arc::new(RecordingSharing::default());
        registry.set_sharing(module.clone());

        let probe = SharingProbe::new(registry, Arc::new(EventLogger::new()));
        let status = ConsentStatus::from_response(Some(ConsentScope::Gdpr), true);
        probe
            .propagate(&export_with_flags(), &status)
            .expect("propagate");

        let payloads = module.payloads.lock().expect("payloads");
        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].enabled);
        assert_eq!(
            payloads[0].granular_options,
            vec![
                (
                    DMA_PARTNER.to_string(),
                    "eea".to_string(),
                    "1".to_string()
                ),
                (
                    DMA_PARTNER.to_string(),
                    "ad_personalization".to_string(),
                    "0".to_string()
                ),
                (
                    DMA_PARTNER.to_string(),
                    "ad_user_data".to_string(),
                    "1".to_string()
                ),
            ]
        );
    }

    #[test]
    fn non_gdpr_scope_reports_eea_zero() {
        let registry = Arc::new(ModuleRegistry::new());
        let module = Arc::new(RecordingSharing::default());
        registry.set_sharing(module.clone());

        let probe = SharingProbe::new(registry, Arc::new(EventLogger::new()));
        let status = ConsentStatus::from_response(Some(ConsentScope::Us), false);
        probe
            .propagate(&export_with_flags(), &status)
            .expect("propagate");

        let payloads = module.payloads.lock().expect("payloads");
        assert_eq!(payloads[0].granular_options[0].2, "0");
    }
}
