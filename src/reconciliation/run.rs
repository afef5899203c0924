use super::execute::execute_reconciliation;
use super::report::ReconcileReport;
use crate::connection::{ConnectionError, Session};
use crate::params::{ParamsError, ReconcileParams};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Invalid Tower connection settings: {0}")]
    Connection(ConnectionError),

    #[error("Tower API client is unavailable: {0}")]
    ClientUnavailable(ConnectionError),

    #[error(transparent)]
    Params(#[from] ParamsError),
}

/// Full run for one configuration object.
///
/// Order matters: connection settings are resolved and the API client is
/// built before the descriptor is validated, and the descriptor is validated
/// before any request is sent.
pub async fn run(params: ReconcileParams) -> Result<ReconcileReport, RunError> {
    let settings = params
        .connection_args()
        .resolve()
        .await
        .map_err(RunError::Connection)?;
    debug!(?settings, "Resolved connection settings");

    let session = Session::open(&settings).map_err(RunError::ClientUnavailable)?;

    let request = params.into_request()?;
    let report = execute_reconciliation(session.api(), &request).await;
    drop(session);

    Ok(report)
}
