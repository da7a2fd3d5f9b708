//! Dialog flow selection.
//!
//! Pure decision logic: given the resolved status, the presentation mode, and
//! the caller's tracking-prompt flags, pick one of the fixed flows. The
//! facade drives the chosen plan step by step.

use crate::types::{AttFlags, ConsentScope, ConsentStatus, DialogMode};

/// What to do for one `open_dialog` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPlan {
    /// Eligibility failed; nothing is presented.
    Skip(SkipReason),
    /// Show the consent UI immediately, bypassing the tracking prompt.
    ShowDialog,
    /// Prompt for tracking permission; show the UI only if granted, otherwise
    /// launch the UI in programmatic deny-all mode.
    AttThenDialogIfGranted,
    /// Show the UI first, then request tracking permission unconditionally;
    /// the prompt outcome does not affect the UI.
    DialogThenAtt,
    /// Request tracking permission, then show the UI regardless of outcome.
    AttThenDialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Status has not been resolved this session.
    StatusUnavailable,
    /// The user is outside every supported consent scope.
    OutOfScope,
    /// Default mode only resurfaces when no decision exists yet.
    DecisionAlreadyObtained,
}

impl SkipReason {
    pub(crate) fn message(&self) -> &'static str {
        match self {
            SkipReason::StatusUnavailable => "dialog not shown: consent status is not loaded",
            SkipReason::OutOfScope => "dialog not shown: user is outside the consent scope",
            SkipReason::DecisionAlreadyObtained => {
                "dialog not shown: decision already saved or user is out of scope"
            }
        }
    }
}

/// Evaluates mode eligibility, then the tracking-prompt sequencing table.
pub fn evaluate_flow(mode: DialogMode, status: &ConsentStatus, att: AttFlags) -> FlowPlan {
    let eligible = match mode {
        DialogMode::Default => status.scope == Some(ConsentScope::Gdpr) && status.force,
        DialogMode::Resurface => status
            .scope
            .map_or(false, |scope| scope != ConsentScope::OutOfScope),
    };
    if !eligible {
        let reason = if status.scope.is_none() {
            SkipReason::StatusUnavailable
        } else if status.scope == Some(ConsentScope::OutOfScope) {
            SkipReason::OutOfScope
        } else {
            SkipReason::DecisionAlreadyObtained
        };
        return FlowPlan::Skip(reason);
    }

    if !att.att_needed {
        return FlowPlan::ShowDialog;
    }
    match (att.show_att_first, att.always_show_cmp) {
        (true, false) => FlowPlan::AttThenDialogIfGranted,
        (false, true) => FlowPlan::DialogThenAtt,
        (true, true) => FlowPlan::AttThenDialog,
        // Unmatched combination: show the UI directly.
        (false, false) => FlowPlan::ShowDialog,
    }
}
