use super::report::ReconcileReport;
use crate::client::{CredentialTypeApi, RemoteError};
use crate::descriptor::{undeclared_references, CredentialTypeDescriptor};
use crate::params::{DesiredState, ReconcileRequest};
use tracing::{error, info, warn};

/// Result of a single reconciliation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Remote id of the credential type; only reported for `present`
    pub id: Option<u64>,
    pub changed: bool,
}

/// Bring the remote credential type to the desired state
pub async fn reconcile(
    api: &dyn CredentialTypeApi,
    descriptor: &CredentialTypeDescriptor,
    state: DesiredState,
) -> Result<ReconcileOutcome, RemoteError> {
    match state {
        DesiredState::Present => {
            let result = api.modify(descriptor, true).await?;
            Ok(ReconcileOutcome {
                id: Some(result.id),
                changed: result.changed,
            })
        }
        DesiredState::Absent => {
            let result = api.delete(&descriptor.name, descriptor.kind).await?;
            Ok(ReconcileOutcome {
                id: None,
                changed: result.changed,
            })
        }
    }
}

/// Run a validated request end to end and produce the report for the caller.
///
/// Remote failures become a failure report; they are never retried here.
pub async fn execute_reconciliation(
    api: &dyn CredentialTypeApi,
    request: &ReconcileRequest,
) -> ReconcileReport {
    let descriptor = &request.descriptor;

    for name in undeclared_references(descriptor) {
        warn!(
            credential_type = %descriptor.name,
            variable = %name,
            "Injector references a variable not declared in inputs"
        );
    }

    if request.check_mode {
        return match api.ping().await {
            Ok(ping) => ReconcileReport::CheckMode {
                changed: true,
                tower_version: ping.version,
            },
            Err(e) => {
                error!(error = %e, "Check mode ping failed");
                ReconcileReport::failure(format!("Failed check mode: {}", e))
            }
        };
    }

    info!(
        credential_type = %descriptor.name,
        kind = %descriptor.kind,
        state = %request.state,
        "Reconciling credential type"
    );

    match reconcile(api, descriptor, request.state).await {
        Ok(outcome) => ReconcileReport::Success {
            credential_type: descriptor.name.clone(),
            state: request.state,
            id: outcome.id,
            changed: outcome.changed,
        },
        Err(e) => {
            error!(credential_type = %descriptor.name, error = %e, "Reconciliation failed");
            ReconcileReport::failure(format!("Failed to update credential type: {}", e))
        }
    }
}
