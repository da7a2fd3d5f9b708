//! Registration point for optional third-party module handles.

use std::sync::{Arc, PoisonError, RwLock};

use super::modules::{AnalyticsModule, AttributionModule, DeviceAliasModule, SharingModule};

/// Host-owned registry of third-party module handles.
///
/// Hosts that initialize their third-party SDKs lazily can register handles
/// at any point; probes re-query the registry on every propagation cycle, so
/// late registrations are picked up without restarting anything.
#[derive(Default)]
pub struct ModuleRegistry {
    analytics: RwLock<Option<Arc<dyn AnalyticsModule>>>,
    sharing: RwLock<Option<Arc<dyn SharingModule>>>,
    attribution: RwLock<Option<Arc<dyn AttributionModule>>>,
    device_alias: RwLock<Option<Arc<dyn DeviceAliasModule>>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_analytics(&self, module: Arc<dyn AnalyticsModule>) {
        *self
            .analytics
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(module);
    }

    pub fn analytics(&self) -> Option<Arc<dyn AnalyticsModule>> {
        self.analytics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_sharing(&self, module: Arc<dyn SharingModule>) {
        *self.sharing.write().unwrap_or_else(PoisonError::into_inner) = Some(module);
    }

    pub fn sharing(&self) -> Option<Arc<dyn SharingModule>> {
        self.sharing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_attribution(&self, module: Arc<dyn AttributionModule>) {
        *self
            .attribution
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(module);
    }

    pub fn attribution(&self) -> Option<Arc<dyn AttributionModule>> {
        self.attribution
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_device_alias(&self, module: Arc<dyn DeviceAliasModule>) {
        *self
            .device_alias
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(module);
    }

    pub fn device_alias(&self) -> Option<Arc<dyn DeviceAliasModule>> {
        self.device_alias
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopAnalytics;
    impl AnalyticsModule for NoopAnalytics {}

    #[test]
    fn registry_starts_empty() {
        let registry = ModuleRegistry::new();
        assert!(registry.analytics().is_none());
        assert!(registry.sharing().is_none());
        assert!(registry.attribution().is_none());
        assert!(registry.device_alias().is_none());
    }

    #[test]
    fn late_registration_is_visible() {
        let registry = ModuleRegistry::new();
        assert!(registry.analytics().is_none());
        registry.set_analytics(Arc::new(NoopAnalytics));
        assert!(registry.analytics().is_some());
    }
}
