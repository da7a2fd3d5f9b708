//! Device-alias probe: consent recorded as key/value alias pairs with
//! `"1"`/`"0"` encodings.

use std::sync::Arc;

use crate::error::SdkResult;
use crate::export::ConsentExport;
use crate::logger::EventLogger;
use crate::types::ConsentStatus;

use super::registry::ModuleRegistry;
use super::{binary_flag, in_eea_scope, ConsentProbe};

pub struct DeviceAliasProbe {
    registry: Arc<ModuleRegistry>,
    logger: Arc<EventLogger>,
}

impl DeviceAliasProbe {
    pub fn new(registry: Arc<ModuleRegistry>, logger: Arc<EventLogger>) -> Self {
        Self { registry, logger }
    }
}

impl ConsentProbe for DeviceAliasProbe {
    fn name(&self) -> &str {
        "device-alias"
    }

    fn is_available(&self) -> bool {
        self.registry.device_alias().is_some()
    }

    fn propagate(&self, export: &ConsentExport, status: &ConsentStatus) -> SdkResult<()> {
        let Some(module) = self.registry.device_alias() else {
            return Ok(());
        };
        let Some(flags) = export.google_consent_mode() else {
            self.logger
                .info("google consent mode data is unavailable, nothing to push");
            return Ok(());
        };

        let aliases = [
            ("eea", binary_flag(in_eea_scope(status))),
            (
                "adPersonalization",
                binary_flag(flags.ad_personalization_granted),
            ),
            ("adUserData", binary_flag(flags.ad_user_data_granted)),
        ];
        for (key, value) in aliases {
            module.set_device_alias(key, &value)?;
        }
        Ok(())
    }
}
