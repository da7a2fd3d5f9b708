//! Read-only projection over the consent store.
//!
//! Every getter decodes straight from the store on each call, so writes made
//! by a dialog session (or by anything else sharing the store) are visible
//! immediately.

use crate::storage::{keys, SharedStore};

const GRANTED: &str = "granted";

/// Google Consent Mode v2 flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoogleConsentFlags {
    pub analytics_storage_granted: bool,
    pub ad_storage_granted: bool,
    pub ad_user_data_granted: bool,
    pub ad_personalization_granted: bool,
}

/// Typed view over the raw string encodings in the consent store.
#[derive(Clone)]
pub struct ConsentExport {
    store: SharedStore,
}

impl ConsentExport {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn string_value(&self, key: &str) -> Option<String> {
        crate::storage::get_string(self.store.as_ref(), key)
    }

    /// IAB TCF v2.2 string, if present.
    pub fn tc_string(&self) -> Option<String> {
        self.string_value(keys::TC_STRING)
    }

    /// Google additional-consent string, if present.
    pub fn ac_string(&self) -> Option<String> {
        self.string_value(keys::ADDTL_CONSENT)
    }

    /// Global Privacy Platform string, if present.
    pub fn gpp_string(&self) -> Option<String> {
        self.string_value(keys::GPP_STRING)
    }

    /// Google Consent Mode flags, or `None` when no flag has been stored.
    ///
    /// A flag counts as granted only when its stored value is exactly
    /// `"granted"`.
    pub fn google_consent_mode(&self) -> Option<GoogleConsentFlags> {
        let ad_storage = self.string_value(keys::GOOGLE_AD_STORAGE);
        let analytics_storage = self.string_value(keys::GOOGLE_ANALYTICS_STORAGE);
        let ad_user_data = self.string_value(keys::GOOGLE_AD_USER_DATA);
        let ad_personalization = self.string_value(keys::GOOGLE_AD_PERSONALIZATION);

        let empty = |value: &Option<String>| value.as_deref().map_or(true, str::is_empty);
        if empty(&ad_storage)
            && empty(&analytics_storage)
            && empty(&ad_user_data)
            && empty(&ad_personalization)
        {
            return None;
        }

        let granted = |value: Option<String>| value.as_deref() == Some(GRANTED);
        Some(GoogleConsentFlags {
            analytics_storage_granted: granted(analytics_storage),
            ad_storage_granted: granted(ad_storage),
            ad_user_data_granted: granted(ad_user_data),
            ad_personalization_granted: granted(ad_personalization),
        })
    }

    /// TCF vendors with consent.
    pub fn consented_tcf_vendors(&self) -> Option<Vec<u32>> {
        parse_binary_string(self.string_value(keys::VENDOR_CONSENTS))
    }

    /// TCF vendors with legitimate-interest consent.
    pub fn consented_tcf_li_vendors(&self) -> Option<Vec<u32>> {
        parse_binary_string(self.string_value(keys::VENDOR_LEGITIMATE_INTERESTS))
    }

    /// TCF purposes with consent.
    pub fn consented_tcf_purposes(&self) -> Option<Vec<u32>> {
        parse_binary_string(self.string_value(keys::PURPOSE_CONSENTS))
    }

    /// TCF purposes with legitimate-interest consent.
    pub fn consented_tcf_li_purposes(&self) -> Option<Vec<u32>> {
        parse_binary_string(self.string_value(keys::PURPOSE_LEGITIMATE_INTERESTS))
    }

    /// Google ("additional consent") vendors, parsed from the `~`-delimited
    /// section of the AC string.
    pub fn consented_google_vendors(&self) -> Option<Vec<u32>> {
        let raw = self.string_value(keys::ADDTL_CONSENT)?;
        let mut parts = raw.split('~');
        let _version_prefix = parts.next();
        let ids = parts.next()?;
        Some(ids.split('.').filter_map(|id| id.parse().ok()).collect())
    }

    /// Non-TCF vendors with consent.
    pub fn consented_other_vendors(&self) -> Option<Vec<u32>> {
        parse_comma_list(self.string_value(keys::OTHER_VENDORS_CONSENT))
    }

    /// Non-TCF vendors with legitimate-interest consent.
    pub fn consented_other_li_vendors(&self) -> Option<Vec<u32>> {
        parse_comma_list(self.string_value(keys::OTHER_VENDORS_LEG_INT))
    }

    /// Non-TCF (simplified) purposes with consent.
    pub fn consented_other_purposes(&self) -> Option<Vec<u32>> {
        parse_comma_list(self.string_value(keys::OTHER_PURPOSES_CONSENT))
    }
}

/// Decodes a binary-bitfield string: `'1'` at 0-based position `i` denotes
/// consent for ID `i + 1`. Empty or absent input yields `None`.
fn parse_binary_string(raw: Option<String>) -> Option<Vec<u32>> {
    let raw = raw?;
    if raw.is_empty() {
        return None;
    }
    Some(
        raw.chars()
            .enumerate()
            .filter_map(|(index, ch)| (ch == '1').then_some(index as u32 + 1))
            .collect(),
    )
}

fn parse_comma_list(raw: Option<String>) -> Option<Vec<u32>> {
    let raw = raw?;
    Some(
        raw.split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;
    use crate::storage::ConsentStore;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn export_with(entries: &[(&str, Value)]) -> ConsentExport {
        let store = MemoryStore::new();
        for (key, value) in entries {
            store.set(key, value.clone());
        }
        ConsentExport::new(Arc::new(store))
    }

    #[test]
    fn bitfield_decodes_one_based_ids() {
        let export = export_with(&[(keys::PURPOSE_CONSENTS, json!("0101"))]);
        assert_eq!(export.consented_tcf_purposes(), Some(vec![2, 4]));
    }

    #[test]
    fn empty_bitfield_yields_none() {
        let export = export_with(&[(keys::VENDOR_CONSENTS, json!(""))]);
        assert_eq!(export.consented_tcf_vendors(), None);

        let export = export_with(&[]);
        assert_eq!(export.consented_tcf_vendors(), None);
    }

    #[test]
    fn granted_flag_round_trips() {
        let export = export_with(&[
            (keys::GOOGLE_AD_STORAGE, json!("granted")),
            (keys::GOOGLE_ANALYTICS_STORAGE, json!("denied")),
            (keys::GOOGLE_AD_USER_DATA, json!("granted")),
            (keys::GOOGLE_AD_PERSONALIZATION, json!("anything-else")),
        ]);

        let flags = export.google_consent_mode().expect("flags");
        assert!(flags.ad_storage_granted);
        assert!(!flags.analytics_storage_granted);
        assert!(flags.ad_user_data_granted);
        assert!(!flags.ad_personalization_granted);
    }

    #[test]
    fn google_consent_mode_absent_when_no_flags_stored() {
        let export = export_with(&[]);
        assert_eq!(export.google_consent_mode(), None);

        let export = export_with(&[(keys::GOOGLE_AD_STORAGE, json!(""))]);
        assert_eq!(export.google_consent_mode(), None);
    }

    #[test]
    fn google_vendors_parsed_from_ac_string() {
        let export = export_with(&[(keys::ADDTL_CONSENT, json!("2~12.34.56~dv.9"))]);
        assert_eq!(export.consented_google_vendors(), Some(vec![12, 34, 56]));
    }

    #[test]
    fn ac_string_without_vendor_section_yields_none() {
        let export = export_with(&[(keys::ADDTL_CONSENT, json!("2"))]);
        assert_eq!(export.consented_google_vendors(), None);
    }

    #[test]
    fn other_lists_parse_comma_separated_ids() {
        let export = export_with(&[
            (keys::OTHER_VENDORS_CONSENT, json!("1,5,9")),
            (keys::OTHER_PURPOSES_CONSENT, json!("3")),
        ]);
        assert_eq!(export.consented_other_vendors(), Some(vec![1, 5, 9]));
        assert_eq!(export.consented_other_purposes(), Some(vec![3]));
        assert_eq!(export.consented_other_li_vendors(), None);
    }

    #[test]
    fn writes_are_visible_without_refresh() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let export = ConsentExport::new(store.clone());

        assert_eq!(export.tc_string(), None);
        store.set(keys::TC_STRING, json!("CPz..."));
        assert_eq!(export.tc_string(), Some("CPz...".to_string()));
    }
}
