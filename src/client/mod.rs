//! Remote API for credential types.
//!
//! [`CredentialTypeApi`] is the seam the reconciler talks to; [`TowerClient`]
//! implements it over the Tower REST API.

mod changes;
mod error;
mod http;

pub use changes::changed_fields;
pub use error::RemoteError;
pub use http::TowerClient;

use crate::descriptor::{CredentialKind, CredentialTypeDescriptor};
use async_trait::async_trait;

/// Outcome of a create-or-update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifyResult {
    pub id: u64,
    pub changed: bool,
}

/// Outcome of a delete. `id` is the removed record, if there was one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub id: Option<u64>,
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResult {
    pub version: String,
}

/// Operations on credential types, keyed by their `(name, kind)` identity
#[async_trait]
pub trait CredentialTypeApi: Send + Sync {
    /// Bring the remote record in line with `descriptor`.
    ///
    /// Only fields the descriptor sets are compared and written. When no
    /// record exists it is created if `create_on_missing` is set, otherwise
    /// this fails with [`RemoteError::NotFound`].
    async fn modify(
        &self,
        descriptor: &CredentialTypeDescriptor,
        create_on_missing: bool,
    ) -> Result<ModifyResult, RemoteError>;

    /// Remove the record if it exists. Deleting a missing record is not an error.
    async fn delete(&self, name: &str, kind: CredentialKind) -> Result<DeleteResult, RemoteError>;

    /// Check the server is reachable and report its version
    async fn ping(&self) -> Result<PingResult, RemoteError>;
}
