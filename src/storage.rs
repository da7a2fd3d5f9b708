//! Persistent key-value store consumed by the rest of the SDK.

pub mod file;
pub mod memory;

use serde_json::Value;
use std::sync::Arc;

/// String-keyed store holding consent strings and per-category flags.
///
/// Implementations take `&self` and must be safe to share across threads;
/// readers always see the latest write (no caching layer in between).
pub trait ConsentStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str) -> bool;
    fn keys(&self) -> Vec<String>;
}

pub type SharedStore = Arc<dyn ConsentStore>;

/// String view of a stored value: strings come back verbatim, other JSON
/// types in their serialized form.
pub(crate) fn get_string(store: &dyn ConsentStore, key: &str) -> Option<String> {
    match store.get(key)? {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Well-known store keys.
///
/// The `IABTCF_*`/`IABGPP_*` keys follow the IAB in-app wire format so other
/// in-process consumers can read them directly; the remaining keys are owned
/// by this SDK.
pub mod keys {
    pub const TC_STRING: &str = "IABTCF_TCString";
    pub const ADDTL_CONSENT: &str = "IABTCF_AddtlConsent";
    pub const VENDOR_CONSENTS: &str = "IABTCF_VendorConsents";
    pub const VENDOR_LEGITIMATE_INTERESTS: &str = "IABTCF_VendorLegitimateInterests";
    pub const PURPOSE_CONSENTS: &str = "IABTCF_PurposeConsents";
    pub const PURPOSE_LEGITIMATE_INTERESTS: &str = "IABTCF_PurposeLegitimateInterests";
    pub const GPP_STRING: &str = "IABGPP_HDR_GppString";

    pub const GOOGLE_AD_STORAGE: &str = "CMP_CONSENT_GOOGLE_adStorage";
    pub const GOOGLE_ANALYTICS_STORAGE: &str = "CMP_CONSENT_GOOGLE_analyticsStorage";
    pub const GOOGLE_AD_USER_DATA: &str = "CMP_CONSENT_GOOGLE_adUserData";
    pub const GOOGLE_AD_PERSONALIZATION: &str = "CMP_CONSENT_GOOGLE_adPersonalization";

    pub const SERVER_REQUEST_VERSION: &str = "CMP_CONSENT_server_request";
    pub const OTHER_VENDORS_CONSENT: &str = "CMP_CONSENT_other_vendors_consent";
    pub const OTHER_VENDORS_LEG_INT: &str = "CMP_CONSENT_other_vendors_leg_int";
    pub const OTHER_PURPOSES_CONSENT: &str = "CMP_CONSENT_other_purposes_consent";
}
