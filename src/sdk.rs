//! SDK facade: the single entry point hosts interact with.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::att::{AlwaysAuthorized, TrackingAuthorization};
use crate::bridge::BridgeHandle;
use crate::bus::{Bus, SdkEvent};
use crate::config::Config;
use crate::connectivity::{AlwaysOnline, Connectivity};
use crate::dialog::{evaluate_flow, FlowPlan};
use crate::error::{SdkError, SdkResult};
use crate::export::ConsentExport;
use crate::logger::{EventLogger, LogsMode};
use crate::probes::registry::ModuleRegistry;
use crate::probes::ProbeDispatcher;
use crate::resolver::StatusResolver;
use crate::storage::memory::MemoryStore;
use crate::storage::{keys, SharedStore};
use crate::types::{AttFlags, ConsentScope, ConsentState, ConsentStatus, DialogMode};
use crate::webview::{consent_dialog_url, DialogSurface, WebViewLayout, DEFAULT_CONSENT_UI_URL};

type Listener = Box<dyn Fn() + Send + Sync>;

/// Facade lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkState {
    Uninitialized,
    Initializing,
    Ready,
    /// Initialization completed but the status fetch failed; the status
    /// `error` field carries the reason.
    ReadyWithError,
}

/// Primary facade for consent resolution, persistence, and propagation.
///
/// One logical instance per process, constructed by the host's composition
/// root and shared behind an `Arc`. All methods take `&self`.
pub struct ConsentSdk {
    config: RwLock<Option<Config>>,
    status: RwLock<ConsentStatus>,
    state: RwLock<SdkState>,
    store: SharedStore,
    export: ConsentExport,
    resolver: StatusResolver,
    surface: Option<Arc<dyn DialogSurface>>,
    tracking: Arc<dyn TrackingAuthorization>,
    connectivity: Arc<dyn Connectivity>,
    registry: Arc<ModuleRegistry>,
    dispatcher: ProbeDispatcher,
    bus: Bus,
    ready_listeners: Mutex<Vec<Listener>>,
    consent_listeners: Mutex<Vec<Listener>>,
    logger: Arc<EventLogger>,
    ui_base_url: String,
}

impl ConsentSdk {
    pub fn builder() -> ConsentSdkBuilder {
        ConsentSdkBuilder::default()
    }

    /// Stores the configuration and resolves the consent status.
    ///
    /// Fetch failures are non-fatal: the previous (possibly empty) status is
    /// retained and the facade ends up in [`SdkState::ReadyWithError`], with
    /// no Ready notification. Not safe to call concurrently with itself.
    pub async fn initialize(&self, config: Config) -> SdkResult<()> {
        if config.site_id.trim().is_empty() {
            return Err(SdkError::InvalidInput("site id must not be empty".to_string()));
        }
        self.logger.info("initialization started");
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SdkState::Initializing;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config);
        self.refresh_status().await;
        self.logger.info("initialization finished");
        Ok(())
    }

    /// Registers a listener invoked when the SDK becomes ready. Fires
    /// immediately if the SDK is already ready.
    pub fn on_ready(&self, listener: impl Fn() + Send + Sync + 'static) {
        if self.state() == SdkState::Ready {
            listener();
        }
        self.ready_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    /// Registers a listener invoked when a dialog session updates consent.
    pub fn on_consent_updated(&self, listener: impl Fn() + Send + Sync + 'static) {
        self.consent_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    /// Event-stream access to the same notifications as the listeners.
    pub fn subscribe(&self) -> broadcast::Receiver<SdkEvent> {
        self.bus.subscribe()
    }

    /// The consent scope that applies to the user, if resolved.
    pub fn check_consent_scope(&self) -> Option<ConsentScope> {
        let status = self.status();
        if status.scope.is_none() {
            self.logger.error(&format!(
                "consent scope is not loaded, possible reason: {:?}",
                status.error
            ));
        }
        status.scope
    }

    /// The current consent state per the fixed (scope, force) mapping.
    pub fn check_consent_state(&self) -> Option<ConsentState> {
        let status = self.status();
        let state = status.state();
        if state.is_none() {
            self.logger.error(&format!(
                "consent status is not loaded, possible reason: {:?}",
                status.error
            ));
        }
        state
    }

    /// Whether consent was granted for the given TCF purpose.
    pub fn check_consent_for_purpose(&self, purpose_id: u32) -> Option<bool> {
        Some(self.export.consented_tcf_purposes()?.contains(&purpose_id))
    }

    /// Whether consent was granted for the given TCF vendor.
    pub fn check_consent_for_vendor(&self, vendor_id: u32) -> Option<bool> {
        Some(self.export.consented_tcf_vendors()?.contains(&vendor_id))
    }

    /// Read-only snapshot of the resolved status.
    pub fn status(&self) -> ConsentStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn state(&self) -> SdkState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Typed view over the persisted consent data.
    pub fn export(&self) -> ConsentExport {
        self.export.clone()
    }

    /// Registration point for optional third-party module handles.
    pub fn modules(&self) -> Arc<ModuleRegistry> {
        self.registry.clone()
    }

    pub fn set_logs_mode(&self, mode: LogsMode) {
        self.logger.set_mode(mode);
    }

    /// Opens the consent dialog according to `mode` and the tracking-prompt
    /// sequencing flags. Resolves the status inline first if it has not been
    /// fetched yet.
    pub async fn open_dialog(
        &self,
        mode: DialogMode,
        language: Option<&str>,
        att: AttFlags,
    ) -> SdkResult<()> {
        let surface = self.surface()?;
        self.ensure_connected()?;

        if !self.status().is_loaded() {
            self.refresh_status().await;
        }
        let status = self.status();
        match evaluate_flow(mode, &status, att) {
            FlowPlan::Skip(reason) => {
                self.logger.info(reason.message());
                Ok(())
            }
            FlowPlan::ShowDialog => self.present_consent_ui(&surface, language, false).await,
            FlowPlan::AttThenDialogIfGranted => {
                if self.tracking.request().await {
                    self.present_consent_ui(&surface, language, false).await
                } else {
                    self.logger
                        .info("tracking permission denied, applying deny-all decision");
                    self.present_consent_ui(&surface, language, true).await
                }
            }
            FlowPlan::DialogThenAtt => {
                self.present_consent_ui(&surface, language, false).await?;
                let _ = self.tracking.request().await;
                Ok(())
            }
            FlowPlan::AttThenDialog => {
                let _ = self.tracking.request().await;
                self.present_consent_ui(&surface, language, false).await
            }
        }
    }

    /// Presents an arbitrary URL through the same bridge, optionally gated on
    /// the tracking prompt. No eligibility evaluation.
    pub async fn web_view_load_url(
        &self,
        url: &str,
        att_needed: bool,
        layout: WebViewLayout,
    ) -> SdkResult<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            let error = SdkError::InvalidInput(format!("invalid url: {url}"));
            self.logger.error(&error.to_string());
            return Err(error);
        }
        let surface = self.surface()?;
        self.ensure_connected()?;

        if att_needed && !self.tracking.request().await {
            self.logger
                .info("dialog not shown: tracking permission denied");
            return Ok(());
        }
        self.run_session(&surface, url, &layout).await
    }

    /// Pushes the current consent record to every available third-party
    /// module. Runs automatically after a dialog session writes consent;
    /// hosts that register a module later can call it directly.
    pub fn propagate_consent(&self) {
        let status = self.status();
        self.dispatcher.run_all(&self.export, &status);
    }

    async fn refresh_status(&self) {
        let config = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(config) = config else {
            self.logger.error("missing configuration");
            return;
        };
        if !self.connectivity.is_connected() {
            self.logger
                .error("bad network connection, skipping consent status fetch");
            return;
        }

        let version_token = crate::storage::get_string(self.store.as_ref(), keys::SERVER_REQUEST_VERSION);
        match self
            .resolver
            .fetch(&config.site_id, version_token.as_deref())
            .await
        {
            Ok(status) => {
                let fetched_ok = status.error.is_none();
                self.logger.debug(&format!(
                    "fetched consent status: scope {:?}, force {}",
                    status.scope, status.force
                ));
                *self.status.write().unwrap_or_else(PoisonError::into_inner) = status;
                if fetched_ok {
                    *self.state.write().unwrap_or_else(PoisonError::into_inner) = SdkState::Ready;
                    self.notify_ready();
                } else {
                    *self.state.write().unwrap_or_else(PoisonError::into_inner) =
                        SdkState::ReadyWithError;
                    self.logger.error("consent status fetch returned an error");
                }
            }
            Err(error) => {
                // Fails soft: the previous status stays in place.
                self.logger.error(&error.to_string());
                *self.state.write().unwrap_or_else(PoisonError::into_inner) =
                    SdkState::ReadyWithError;
            }
        }
    }

    async fn present_consent_ui(
        &self,
        surface: &Arc<dyn DialogSurface>,
        language: Option<&str>,
        deny_all: bool,
    ) -> SdkResult<()> {
        let config = self
            .config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| {
                SdkError::InvalidInput(
                    "initialize must be called before opening the dialog".to_string(),
                )
            })?;
        let language = language
            .map(str::to_string)
            .or_else(|| config.app_language.clone());
        let url = consent_dialog_url(
            &self.ui_base_url,
            &config.site_id,
            language.as_deref(),
            deny_all,
        );
        self.run_session(surface, &url, &WebViewLayout::default()).await
    }

    async fn run_session(
        &self,
        surface: &Arc<dyn DialogSurface>,
        url: &str,
        layout: &WebViewLayout,
    ) -> SdkResult<()> {
        let (bridge, done) =
            BridgeHandle::new(self.store.clone(), surface.clone(), self.logger.clone());
        surface.open(url, layout, bridge).map_err(|error| {
            self.logger
                .error(&format!("failed to present consent dialog: {error}"));
            error
        })?;

        match done.await {
            Ok(outcome) => {
                self.complete_dialog(outcome.write_occurred);
                Ok(())
            }
            Err(_) => {
                // The surface dropped the session without a ready signal.
                self.logger.info("dialog session ended without a ready signal");
                Ok(())
            }
        }
    }

    /// Runs once per completed dialog session: records that a decision now
    /// exists and, if the session wrote consent data, notifies listeners and
    /// propagates to third parties.
    fn complete_dialog(&self, write_occurred: bool) {
        {
            let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
            *status = status.clone().decision_obtained();
        }
        if write_occurred {
            self.notify_consent_updated();
            self.propagate_consent();
        }
    }

    fn notify_ready(&self) {
        self.bus.publish(SdkEvent::Ready);
        for listener in self
            .ready_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            listener();
        }
    }

    fn notify_consent_updated(&self) {
        self.bus.publish(SdkEvent::ConsentUpdated);
        for listener in self
            .consent_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
        {
            listener();
        }
    }

    fn surface(&self) -> SdkResult<Arc<dyn DialogSurface>> {
        self.surface.clone().ok_or_else(|| {
            let error = SdkError::Presentation("no dialog surface registered".to_string());
            self.logger.error(&error.to_string());
            error
        })
    }

    fn ensure_connected(&self) -> SdkResult<()> {
        if self.connectivity.is_connected() {
            Ok(())
        } else {
            self.logger
                .error("bad network connection, operation aborted");
            Err(SdkError::Transport("no network connection".to_string()))
        }
    }
}

/// Builder wiring the facade's collaborators; every seam has a default
/// except the dialog surface, which only the host can provide.
#[derive(Default)]
pub struct ConsentSdkBuilder {
    store: Option<SharedStore>,
    surface: Option<Arc<dyn DialogSurface>>,
    tracking: Option<Arc<dyn TrackingAuthorization>>,
    connectivity: Option<Arc<dyn Connectivity>>,
    registry: Option<Arc<ModuleRegistry>>,
    status_endpoint: Option<String>,
    consent_ui_endpoint: Option<String>,
}

impl ConsentSdkBuilder {
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn surface(mut self, surface: Arc<dyn DialogSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn tracking(mut self, tracking: Arc<dyn TrackingAuthorization>) -> Self {
        self.tracking = Some(tracking);
        self
    }

    pub fn connectivity(mut self, connectivity: Arc<dyn Connectivity>) -> Self {
        self.connectivity = Some(connectivity);
        self
    }

    pub fn modules(mut self, registry: Arc<ModuleRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn status_endpoint(mut self, url: impl Into<String>) -> Self {
        self.status_endpoint = Some(url.into());
        self
    }

    pub fn consent_ui_endpoint(mut self, url: impl Into<String>) -> Self {
        self.consent_ui_endpoint = Some(url.into());
        self
    }

    pub fn build(self) -> SdkResult<ConsentSdk> {
        let logger = Arc::new(EventLogger::new());
        let store: SharedStore = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ModuleRegistry::new()));
        let resolver = match self.status_endpoint {
            Some(url) => StatusResolver::with_base_url(url)?,
            None => StatusResolver::new()?,
        };
        let dispatcher = ProbeDispatcher::with_default_probes(registry.clone(), logger.clone());

        Ok(ConsentSdk {
            config: RwLock::new(None),
            status: RwLock::new(ConsentStatus::default()),
            state: RwLock::new(SdkState::Uninitialized),
            export: ConsentExport::new(store.clone()),
            store,
            resolver,
            surface: self.surface,
            tracking: self
                .tracking
                .unwrap_or_else(|| Arc::new(AlwaysAuthorized)),
            connectivity: self
                .connectivity
                .unwrap_or_else(|| Arc::new(AlwaysOnline)),
            registry,
            dispatcher,
            bus: Bus::new(16),
            ready_listeners: Mutex::new(Vec::new()),
            consent_listeners: Mutex::new(Vec::new()),
            logger,
            ui_base_url: self
                .consent_ui_endpoint
                .unwrap_or_else(|| DEFAULT_CONSENT_UI_URL.to_string()),
        })
    }
}
