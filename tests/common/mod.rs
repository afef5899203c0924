#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tower_credential_type::client::changed_fields;
use tower_credential_type::{
    CredentialKind, CredentialTypeApi, CredentialTypeDescriptor, DeleteResult, ModifyResult,
    PingResult, ReconcileParams, RemoteError,
};

/// In-memory stand-in for a Tower server
#[derive(Default)]
pub struct FakeTower {
    records: Mutex<BTreeMap<(String, CredentialKind), Value>>,
    next_id: AtomicUsize,
    pub calls: AtomicUsize,
}

impl FakeTower {
    pub fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn record(&self, name: &str, kind: CredentialKind) -> Option<Value> {
        self.records
            .lock()
            .unwrap()
            .get(&(name.to_string(), kind))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl CredentialTypeApi for FakeTower {
    async fn modify(
        &self,
        descriptor: &CredentialTypeDescriptor,
        create_on_missing: bool,
    ) -> Result<ModifyResult, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = (descriptor.name.clone(), descriptor.kind);
        let desired = descriptor.managed_fields()?;
        let mut records = self.records.lock().unwrap();

        match records.get_mut(&key) {
            Some(existing) => {
                let id = existing["id"].as_u64().unwrap();
                let changes = changed_fields(&desired, existing);
                let changed = !changes.is_empty();
                if let Value::Object(map) = existing {
                    map.extend(changes);
                }
                Ok(ModifyResult { id, changed })
            }
            None if create_on_missing => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64;
                let mut record: Map<String, Value> = desired;
                record.insert("id".to_string(), json!(id));
                record.insert("name".to_string(), json!(descriptor.name));
                record.insert("kind".to_string(), json!(descriptor.kind));
                records.insert(key, Value::Object(record));
                Ok(ModifyResult { id, changed: true })
            }
            None => Err(RemoteError::NotFound(descriptor.name.clone())),
        }
    }

    async fn delete(&self, name: &str, kind: CredentialKind) -> Result<DeleteResult, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let removed = self
            .records
            .lock()
            .unwrap()
            .remove(&(name.to_string(), kind));
        Ok(DeleteResult {
            id: removed.as_ref().and_then(|r| r["id"].as_u64()),
            changed: removed.is_some(),
        })
    }

    async fn ping(&self) -> Result<PingResult, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(PingResult {
            version: "3.4.1".to_string(),
        })
    }
}

/// A Tower that cannot be reached
pub struct UnreachableTower;

#[async_trait]
impl CredentialTypeApi for UnreachableTower {
    async fn modify(
        &self,
        _descriptor: &CredentialTypeDescriptor,
        _create_on_missing: bool,
    ) -> Result<ModifyResult, RemoteError> {
        Err(RemoteError::Connection("connection refused".to_string()))
    }

    async fn delete(&self, _name: &str, _kind: CredentialKind) -> Result<DeleteResult, RemoteError> {
        Err(RemoteError::Connection("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<PingResult, RemoteError> {
        Err(RemoteError::Connection("connection refused".to_string()))
    }
}

/// Params for the "Custom Credentials" cloud type used throughout the tests
pub fn custom_credentials_params() -> ReconcileParams {
    ReconcileParams {
        name: Some("Custom Credentials".to_string()),
        kind: Some("cloud".to_string()),
        inputs: Some(json!({
            "fields": [{"id": "username", "type": "string"}],
            "required": ["username"]
        })),
        ..Default::default()
    }
}
