pub mod client;
pub mod connection;
pub mod descriptor;
pub mod params;
pub mod reconciliation;
pub mod utils;

// Re-export commonly used types
pub use client::{
    CredentialTypeApi, DeleteResult, ModifyResult, PingResult, RemoteError, TowerClient,
};
pub use connection::{ConnectionArgs, ConnectionError, ConnectionSettings, Session};
pub use descriptor::{
    CredentialKind, CredentialTypeDescriptor, DescriptorError, InputField, InputSchema, Injectors,
};
pub use params::{DesiredState, ParamsError, ReconcileParams, ReconcileRequest};
pub use reconciliation::{
    execute_reconciliation, reconcile, run, ReconcileOutcome, ReconcileReport, RunError,
};
