//! Error types and the contract-violation policy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ability::AbilityIndex,
    animation::AnimationLayer,
    events::{ControllerEvent, EventQueue},
};

/// Problems with how the controller or its collaborators are configured.
///
/// Detected at construction or at first reference. The pipeline keeps running on the
/// default stage/state behavior after one of these is reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    #[error("animation state `{name}` is not defined on layer {layer:?}")]
    UnknownState { layer: AnimationLayer, name: String },
}

/// A programming error raised by, or detected around, an ability hook.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbilityError {
    #[error("ability `{ability}` failed: {reason}")]
    Fault { ability: String, reason: String },

    #[error("ability `{ability}` claimed `{hook}` while stopping")]
    InactiveClaim { ability: String, hook: &'static str },
}

impl AbilityError {
    pub fn fault(ability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fault {
            ability: ability.into(),
            reason: reason.into(),
        }
    }
}

/// Why `try_start` refused to start an ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartRejection {
    #[error("no ability registered at index {0}")]
    UnknownAbility(AbilityIndex),

    #[error("ability is already active")]
    AlreadyActive,

    #[error("start conditions are not met")]
    CannotStart,

    #[error("blocked by higher-priority ability {0}")]
    BlockedBy(AbilityIndex),

    #[error("vetoed by active ability {0}")]
    VetoedBy(AbilityIndex),
}

/// What happens when an ability hook reports an [`AbilityError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultPolicy {
    /// Panic immediately.
    Panic,
    /// Log, report a diagnostic, and continue as if the hook had not claimed.
    FallThrough,
}

impl Default for FaultPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            FaultPolicy::Panic
        } else {
            FaultPolicy::FallThrough
        }
    }
}

/// Applies `policy` to a hook error.
pub(crate) fn report_fault(policy: FaultPolicy, events: &mut EventQueue, err: AbilityError) {
    match policy {
        FaultPolicy::Panic => panic!("ability contract violation: {err}"),
        FaultPolicy::FallThrough => {
            log::error!("ability contract violation: {err}");
            events.push(ControllerEvent::Diagnostic(err.to_string()));
        }
    }
}
