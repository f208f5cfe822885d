//! In-crate test doubles for the engine.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::desired::{DesiredState, Operation, ParamSchema, ParamSpec};
use crate::error::{ReconError, ReconResult};
use crate::field_values;
use crate::remote::RemoteState;
use crate::resource::Resource;

pub(crate) static SCHEMA: ParamSchema = ParamSchema {
    plugin: "memory_role",
    params: &[
        ParamSpec::state(),
        ParamSpec::string("name"),
        ParamSpec::choice("level", &["none", "readonly", "all"]).default_value("all"),
    ],
    required_together: &[],
    required_if: &[],
};

pub(crate) fn desired(name: &str, operation: Operation) -> DesiredState {
    DesiredState::from_params(
        &SCHEMA,
        field_values! { "name" => name, "state" => operation.as_str() },
    )
    .unwrap()
}

/// Role table reached through a fake endpoint.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    pub endpoint: String,
    pub roles: BTreeMap<String, String>,
    pub calls: usize,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, name: &str, level: &str) -> Self {
        self.roles.insert(name.to_string(), level.to_string());
        self
    }
}

/// Named role with an access level.
pub(crate) struct MemoryResource;

#[async_trait]
impl Resource for MemoryResource {
    type Transport = MemoryStore;
    type Identity = String;
    type Payload = (String, String);

    fn kind(&self) -> &str {
        "memory-role"
    }

    fn identity(&self, _operation: Operation, desired: &DesiredState) -> ReconResult<String> {
        desired.require("name").map(str::to_string)
    }

    fn payload(&self, identity: &String, desired: &DesiredState) -> ReconResult<(String, String)> {
        Ok((identity.clone(), desired.require("level")?.to_string()))
    }

    async fn fetch(&self, store: &mut MemoryStore, name: &String) -> ReconResult<Option<RemoteState>> {
        store.calls += 1;
        if store.fail_reads {
            return Err(ReconError::transport(store.endpoint.as_str(), "read timed out"));
        }
        Ok(store.roles.get(name).map(|level| {
            RemoteState::new(field_values! { "name" => name.as_str(), "level" => level.as_str() })
        }))
    }

    async fn create(&self, store: &mut MemoryStore, payload: &(String, String)) -> ReconResult<()> {
        store.calls += 1;
        if store.fail_writes {
            return Err(ReconError::transport(store.endpoint.as_str(), "write rejected"));
        }
        store.roles.insert(payload.0.clone(), payload.1.clone());
        Ok(())
    }

    async fn delete(&self, store: &mut MemoryStore, name: &String) -> ReconResult<()> {
        store.calls += 1;
        if store.fail_writes {
            return Err(ReconError::transport(store.endpoint.as_str(), "write rejected"));
        }
        store.roles.remove(name);
        Ok(())
    }
}
