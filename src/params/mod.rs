//! The configuration object a caller hands in, and its validation.
//!
//! Everything here runs before any request reaches Tower: a missing name,
//! an unknown kind or malformed inputs/injectors are rejected locally.

use crate::connection::ConnectionArgs;
use crate::descriptor::{
    CredentialKind, CredentialTypeDescriptor, DescriptorError, InputSchema, Injectors,
};
use crate::utils::parse_bool;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("Invalid params: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid JSON for {0}: {1}")]
    InvalidArgument(String, #[source] serde_json::Error),

    #[error("missing required arguments: {0}")]
    MissingRequired(String),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
}

/// Whether the credential type should exist
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesiredState::Present => f.write_str("present"),
            DesiredState::Absent => f.write_str("absent"),
        }
    }
}

/// Raw configuration object, as read from a params file or assembled from flags
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconcileParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub state: Option<DesiredState>,
    pub kind: Option<String>,
    pub inputs: Option<Value>,
    pub injectors: Option<Value>,
    #[serde(default)]
    pub check_mode: bool,
    pub tower_host: Option<String>,
    pub tower_username: Option<String>,
    pub tower_password: Option<String>,
    pub tower_oauthtoken: Option<String>,
    #[serde(alias = "tower_verify_ssl")]
    pub validate_certs: Option<bool>,
    pub tower_config_file: Option<PathBuf>,
}

/// Validated work for the reconciler
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileRequest {
    pub descriptor: CredentialTypeDescriptor,
    pub state: DesiredState,
    pub check_mode: bool,
}

impl ReconcileParams {
    /// Read a JSON params file
    pub async fn from_file(path: &Path) -> Result<Self, ParamsError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ParamsError::IoError(path.to_path_buf(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Layer `overrides` on top of `self`; any value set in `overrides` wins
    pub fn overlay(self, overrides: ReconcileParams) -> Self {
        Self {
            name: overrides.name.or(self.name),
            description: overrides.description.or(self.description),
            state: overrides.state.or(self.state),
            kind: overrides.kind.or(self.kind),
            inputs: overrides.inputs.or(self.inputs),
            injectors: overrides.injectors.or(self.injectors),
            check_mode: overrides.check_mode || self.check_mode,
            tower_host: overrides.tower_host.or(self.tower_host),
            tower_username: overrides.tower_username.or(self.tower_username),
            tower_password: overrides.tower_password.or(self.tower_password),
            tower_oauthtoken: overrides.tower_oauthtoken.or(self.tower_oauthtoken),
            validate_certs: overrides.validate_certs.or(self.validate_certs),
            tower_config_file: overrides.tower_config_file.or(self.tower_config_file),
        }
    }

    pub fn state(&self) -> DesiredState {
        self.state.unwrap_or_default()
    }

    pub fn connection_args(&self) -> ConnectionArgs {
        ConnectionArgs {
            host: self.tower_host.clone(),
            username: self.tower_username.clone(),
            password: self.tower_password.clone(),
            oauth_token: self.tower_oauthtoken.clone(),
            verify_ssl: self.validate_certs,
            config_file: self.tower_config_file.clone(),
        }
    }

    /// Validate and build the descriptor
    pub fn descriptor(&self) -> Result<CredentialTypeDescriptor, ParamsError> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.kind.is_none() {
            missing.push("kind");
        }
        let (Some(name), Some(kind)) = (&self.name, &self.kind) else {
            return Err(ParamsError::MissingRequired(missing.join(", ")));
        };

        let kind: CredentialKind = kind.parse()?;
        let mut descriptor = CredentialTypeDescriptor::new(name.clone(), kind)?;

        if let Some(description) = &self.description {
            descriptor = descriptor.with_description(description.clone());
        }
        if let Some(inputs) = &self.inputs {
            descriptor = descriptor.with_inputs(InputSchema::from_value(inputs.clone())?);
        }
        if let Some(injectors) = &self.injectors {
            descriptor = descriptor.with_injectors(Injectors::from_value(injectors.clone())?);
        }

        Ok(descriptor)
    }

    pub fn into_request(self) -> Result<ReconcileRequest, ParamsError> {
        Ok(ReconcileRequest {
            descriptor: self.descriptor()?,
            state: self.state(),
            check_mode: self.check_mode,
        })
    }
}

/// Value parser for `validate_certs` given as a flag or env var
pub fn parse_flag(value: &str) -> Result<bool, String> {
    parse_bool(value)
        .ok_or_else(|| format!("expected true/false, yes/no, on/off or 1/0, got: {}", value))
}

/// Parse a structured flag value: inline JSON, or `@path` to a JSON file
pub async fn parse_structured_arg(field: &str, raw: &str) -> Result<Value, ParamsError> {
    let content = match raw.strip_prefix('@') {
        Some(path) => {
            let path = Path::new(path);
            fs::read_to_string(path)
                .await
                .map_err(|e| ParamsError::IoError(path.to_path_buf(), e))?
        }
        None => raw.to_string(),
    };

    serde_json::from_str(&content).map_err(|e| ParamsError::InvalidArgument(field.to_string(), e))
}
