//! Core consent vocabulary shared across the crate.

/// Regulatory scope the status endpoint resolved for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentScope {
    Gdpr,
    Us,
    OutOfScope,
}

impl ConsentScope {
    /// Canonical wire string used by the status endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentScope::Gdpr => "gdpr",
            ConsentScope::Us => "us",
            ConsentScope::OutOfScope => "out of scope",
        }
    }

    /// Parses a wire string; unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<ConsentScope> {
        match raw {
            "gdpr" => Some(ConsentScope::Gdpr),
            "us" => Some(ConsentScope::Us),
            "out of scope" => Some(ConsentScope::OutOfScope),
            _ => None,
        }
    }
}

/// Snapshot of the remote consent-status decision.
///
/// Created empty at SDK startup and replaced wholesale by each successful
/// fetch. `force` is cleared exactly once when a dialog session completes and
/// only a fresh fetch can set it again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsentStatus {
    pub scope: Option<ConsentScope>,
    pub force: bool,
    pub error: Option<String>,
}

impl ConsentStatus {
    /// Builds a status from a successful endpoint response.
    ///
    /// `force` is meaningful only under gdpr scope and is dropped otherwise.
    pub fn from_response(scope: Option<ConsentScope>, force: bool) -> ConsentStatus {
        ConsentStatus {
            force: force && scope == Some(ConsentScope::Gdpr),
            scope,
            error: None,
        }
    }

    /// Builds a status carrying only a server-reported error.
    pub fn from_error(error: Option<String>) -> ConsentStatus {
        ConsentStatus {
            scope: None,
            force: false,
            error,
        }
    }

    /// Whether a scope has been resolved for this session.
    pub fn is_loaded(&self) -> bool {
        self.scope.is_some()
    }

    /// Transition taken when a consent dialog session completes: the user now
    /// has a recorded decision, so `force` no longer applies.
    pub fn decision_obtained(self) -> ConsentStatus {
        ConsentStatus {
            force: false,
            ..self
        }
    }

    /// Maps (scope, force) onto the host-facing consent state. Returns `None`
    /// while the status has not been loaded.
    pub fn state(&self) -> Option<ConsentState> {
        match (self.scope?, self.force) {
            (ConsentScope::OutOfScope, _) => Some(ConsentState::NotApplicable),
            (ConsentScope::Gdpr, true) => Some(ConsentState::GdprNoDecision),
            (ConsentScope::Gdpr, false) => Some(ConsentState::GdprDecisionObtained),
            (ConsentScope::Us, _) => Some(ConsentState::Us),
        }
    }
}

/// Host-facing consent state derived from [`ConsentStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentState {
    NotApplicable,
    GdprNoDecision,
    GdprDecisionObtained,
    Us,
}

impl ConsentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentState::NotApplicable => "notApplicable",
            ConsentState::GdprNoDecision => "gdprNoDecision",
            ConsentState::GdprDecisionObtained => "gdprDecisionObtained",
            ConsentState::Us => "us",
        }
    }
}

/// Presentation mode for [`crate::sdk::ConsentSdk::open_dialog`].
///
/// `Default` presents only when scope is gdpr and no decision exists yet;
/// `Resurface` re-presents whenever the user is in scope at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogMode {
    Default,
    Resurface,
}

/// Caller-supplied flags controlling how the tracking-permission prompt is
/// sequenced relative to the consent dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttFlags {
    /// Whether the tracking prompt is part of this flow at all.
    pub att_needed: bool,
    /// Prompt for tracking permission before showing the dialog.
    pub show_att_first: bool,
    /// Show the dialog regardless of the tracking prompt outcome.
    pub always_show_cmp: bool,
}
