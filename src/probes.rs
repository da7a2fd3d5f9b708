//! Consent propagation to optional third-party modules.
//!
//! Each probe knows one target's call shape, checks at runtime whether a
//! handle for that target has been registered, and pushes the mapped consent
//! payload through it. Probes run in a fixed order and never abort each
//! other: a missing module is a no-op and a failing one is logged and
//! skipped.

pub mod alias;
pub mod analytics;
pub mod attribution;
pub mod modules;
pub mod registry;
pub mod sharing;

use std::sync::Arc;

use crate::error::SdkResult;
use crate::export::ConsentExport;
use crate::logger::EventLogger;
use crate::types::{ConsentScope, ConsentStatus};

/// One third-party target's consent pusher.
pub trait ConsentProbe: Send + Sync {
    fn name(&self) -> &str;

    /// Runtime existence check for the target module. Side-effect free and
    /// safe to call on every cycle; hosts may register modules late.
    fn is_available(&self) -> bool;

    /// Maps and pushes the current consent record to the target.
    fn propagate(&self, export: &ConsentExport, status: &ConsentStatus) -> SdkResult<()>;
}

/// `"granted"` / `"denied"` vocabulary.
pub(crate) fn grant_flag(granted: bool) -> String {
    let flag = if granted { "granted" } else { "denied" };
    flag.to_string()
}

/// `"1"` / `"0"` vocabulary.
pub(crate) fn binary_flag(value: bool) -> String {
    let flag = if value { "1" } else { "0" };
    flag.to_string()
}

/// Whether the resolved scope places the user in an EEA-like region.
pub(crate) fn in_eea_scope(status: &ConsentStatus) -> bool {
    status.scope == Some(ConsentScope::Gdpr)
}

/// Runs every registered probe against the current consent record.
pub struct ProbeDispatcher {
    probes: Vec<Arc<dyn ConsentProbe>>,
    logger: Arc<EventLogger>,
}

impl ProbeDispatcher {
    pub fn new(logger: Arc<EventLogger>) -> Self {
        Self {
            probes: Vec::new(),
            logger,
        }
    }

    /// Dispatcher preloaded with the built-in probes in their fixed order.
    pub fn with_default_probes(
        registry: Arc<registry::ModuleRegistry>,
        logger: Arc<EventLogger>,
    ) -> Self {
        let mut dispatcher = Self::new(logger.clone());
        dispatcher.register(Arc::new(analytics::AnalyticsProbe::new(
            registry.clone(),
            logger.clone(),
        )));
        dispatcher.register(Arc::new(alias::DeviceAliasProbe::new(
            registry.clone(),
            logger.clone(),
        )));
        dispatcher.register(Arc::new(sharing::SharingProbe::new(
            registry.clone(),
            logger.clone(),
        )));
        dispatcher.register(Arc::new(attribution::AttributionProbe::new(
            registry, logger,
        )));
        dispatcher
    }

    pub fn register(&mut self, probe: Arc<dyn ConsentProbe>) {
        self.probes.push(probe);
    }

    /// Invokes every available probe, in registration order, isolating each
    /// probe's failure. Fire-and-forget: no result reaches the caller.
    pub fn run_all(&self, export: &ConsentExport, status: &ConsentStatus) {
        for probe in &self.probes {
            if !probe.is_available() {
                self.logger
                    .debug(&format!("{} is not present, skipping", probe.name()));
                continue;
            }
            self.logger
                .info(&format!("{} is available, pushing consent", probe.name()));
            if let Err(error) = probe.propagate(export, status) {
                self.logger.error(&format!(
                    "consent propagation to {} failed: {error}",
                    probe.name()
                ));
            }
        }
    }
}
