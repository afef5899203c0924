mod execute;
mod report;
mod run;

pub use execute::{execute_reconciliation, reconcile, ReconcileOutcome};
pub use report::ReconcileReport;
pub use run::{run, RunError};
