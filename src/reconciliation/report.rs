use crate::params::DesiredState;
use serde::Serialize;

/// Record printed for the caller once a run finishes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReconcileReport {
    Success {
        credential_type: String,
        state: DesiredState,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        changed: bool,
    },
    CheckMode {
        changed: bool,
        tower_version: String,
    },
    Failure {
        failed: bool,
        changed: bool,
        msg: String,
    },
}

impl ReconcileReport {
    pub fn failure(msg: impl Into<String>) -> Self {
        ReconcileReport::Failure {
            failed: true,
            changed: false,
            msg: msg.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ReconcileReport::Failure { .. })
    }

    pub fn changed(&self) -> bool {
        match self {
            ReconcileReport::Success { changed, .. }
            | ReconcileReport::CheckMode { changed, .. }
            | ReconcileReport::Failure { changed, .. } => *changed,
        }
    }
}
