mod references;
mod types;

pub use references::{template_references, undeclared_references};
pub use types::{CredentialKind, CredentialTypeDescriptor, InputField, InputSchema, Injectors};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptorError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("value of kind must be one of: ssh, vault, net, scm, cloud, insights, got: {0}")]
    UnknownKind(String),

    #[error("Invalid inputs: {0}")]
    InvalidInputs(#[source] serde_json::Error),

    #[error("Invalid injectors: {0}")]
    InvalidInjectors(#[source] serde_json::Error),
}
