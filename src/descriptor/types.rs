use super::DescriptorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Kind of a credential type, as understood by Tower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    Ssh,
    Vault,
    Net,
    Scm,
    Cloud,
    Insights,
}

impl CredentialKind {
    pub const ALL: [CredentialKind; 6] = [
        CredentialKind::Ssh,
        CredentialKind::Vault,
        CredentialKind::Net,
        CredentialKind::Scm,
        CredentialKind::Cloud,
        CredentialKind::Insights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::Ssh => "ssh",
            CredentialKind::Vault => "vault",
            CredentialKind::Net => "net",
            CredentialKind::Scm => "scm",
            CredentialKind::Cloud => "cloud",
            CredentialKind::Insights => "insights",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialKind {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CredentialKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DescriptorError::UnknownKind(s.to_string()))
    }
}

/// A single field of a credential type's input schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<bool>,
    /// Keys Tower understands that we forward untouched (help_text, choices, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputField {
    pub fn is_secret(&self) -> bool {
        self.secret.unwrap_or(false)
    }
}

/// Ordered set of fields a credential of this type accepts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<InputField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InputSchema {
    pub fn from_value(value: Value) -> Result<Self, DescriptorError> {
        serde_json::from_value(value).map_err(DescriptorError::InvalidInputs)
    }

    pub fn field(&self, id: &str) -> Option<&InputField> {
        self.fields.iter().flatten().find(|f| f.id == id)
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().flatten().map(|f| f.id.as_str())
    }

    pub fn is_required(&self, id: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| required.iter().any(|r| r == id))
    }
}

/// How input values are projected into a job's runtime environment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Injectors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_vars: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<BTreeMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Injectors {
    pub fn from_value(value: Value) -> Result<Self, DescriptorError> {
        serde_json::from_value(value).map_err(DescriptorError::InvalidInjectors)
    }

    /// Every template string the injectors carry, in no particular order
    pub fn templates(&self) -> Vec<&str> {
        let mut templates = Vec::new();

        for map in [&self.env, &self.file].into_iter().flatten() {
            templates.extend(map.values().map(String::as_str));
        }

        if let Some(extra_vars) = &self.extra_vars {
            for value in extra_vars.values() {
                collect_strings(value, &mut templates);
            }
        }

        for value in self.extra.values() {
            collect_strings(value, &mut templates);
        }

        templates
    }
}

fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

/// Desired state of a credential type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CredentialTypeDescriptor {
    pub name: String,
    pub kind: CredentialKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<InputSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injectors: Option<Injectors>,
}

impl CredentialTypeDescriptor {
    pub fn new(name: impl Into<String>, kind: CredentialKind) -> Result<Self, DescriptorError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DescriptorError::EmptyName);
        }

        Ok(Self {
            name,
            kind,
            description: None,
            inputs: None,
            injectors: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_inputs(mut self, inputs: InputSchema) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn with_injectors(mut self, injectors: Injectors) -> Self {
        self.injectors = Some(injectors);
        self
    }

    /// Fields this descriptor sets beyond its identity (name, kind).
    /// Unset fields are left out and never compared against the remote record.
    pub fn managed_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut fields = Map::new();

        if let Some(description) = &self.description {
            fields.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(inputs) = &self.inputs {
            fields.insert("inputs".to_string(), serde_json::to_value(inputs)?);
        }
        if let Some(injectors) = &self.injectors {
            fields.insert("injectors".to_string(), serde_json::to_value(injectors)?);
        }

        Ok(fields)
    }
}
