//! Wire-level call shapes of the optional third-party modules.
//!
//! Every method carries a default body returning [`SdkError::ModuleIncompatible`],
//! so a registered handle that lacks an entry point behaves like a module
//! whose API surface is older than the probe expects: the probe logs and
//! moves on instead of failing the build.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{SdkError, SdkResult};

fn unsupported(surface: &str, entry_point: &str) -> SdkError {
    SdkError::ModuleIncompatible(format!("{surface} does not support {entry_point}"))
}

/// Analytics collector speaking the Google-consent-mode four-flag
/// vocabulary (`ad_storage`, `analytics_storage`, `ad_user_data`,
/// `ad_personalization` mapped to `"granted"`/`"denied"`).
pub trait AnalyticsModule: Send + Sync {
    fn set_consent(&self, _consent: BTreeMap<String, String>) -> SdkResult<()> {
        Err(unsupported("analytics module", "set_consent"))
    }

    /// Emits the flags-updated event alongside the consent push.
    fn log_event(&self, _name: &str, _params: BTreeMap<String, String>) -> SdkResult<()> {
        Err(unsupported("analytics module", "log_event"))
    }
}

/// Third-party-sharing payload: partner-keyed granular options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartySharing {
    pub enabled: bool,
    /// `(partner, key, value)` triples, e.g. `("google_dma", "eea", "1")`.
    pub granular_options: Vec<(String, String, String)>,
}

impl ThirdPartySharing {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            granular_options: Vec::new(),
        }
    }

    pub fn add_granular_option(
        &mut self,
        partner: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.granular_options
            .push((partner.into(), key.into(), value.into()));
    }
}

/// Attribution target accepting a third-party-sharing payload.
pub trait SharingModule: Send + Sync {
    fn track_sharing(&self, _sharing: ThirdPartySharing) -> SdkResult<()> {
        Err(unsupported("sharing module", "track_sharing"))
    }
}

/// Typed consent payload for the attribution target's richer entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributionConsent {
    pub is_eea: bool,
    /// `"granted"` / `"denied"`.
    pub ad_user_data: String,
    /// `"granted"` / `"denied"`.
    pub ad_personalization: String,
}

/// Attribution target with a typed consent API and a legacy flag-only
/// fallback; probes prefer the typed call.
pub trait AttributionModule: Send + Sync {
    fn set_consent_data(&self, _consent: AttributionConsent) -> SdkResult<()> {
        Err(unsupported("attribution module", "set_consent_data"))
    }

    fn set_consent_fields(&self, _fields: BTreeMap<String, Value>) -> SdkResult<()> {
        Err(unsupported("attribution module", "set_consent_fields"))
    }
}

/// Attribution target that records consent as device-alias key/value pairs.
pub trait DeviceAliasModule: Send + Sync {
    fn set_device_alias(&self, _key: &str, _value: &str) -> SdkResult<()> {
        Err(unsupported("device-alias module", "set_device_alias"))
    }
}
