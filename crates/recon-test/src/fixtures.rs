//! Test fixtures for reconciliation plugins
//!
//! Provides transport doubles that record every call so tests can assert on
//! both the outcome and the exact remote traffic.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use recon_common::{
    BackendFault, CliReply, CliTransport, FieldValues, FieldValuesExt, ReconError, ReconResult,
    RpcRequest, RpcResponse, RpcTransport,
};

/// Scripted CLI session
///
/// Every command is recorded. The reply is the first scripted reply whose
/// pattern occurs in the command, or the prompt otherwise.
#[derive(Debug, Clone)]
pub struct MockCli {
    endpoint: String,
    replies: Vec<(String, String)>,
    fail_on: Option<String>,
    /// Commands sent, in order
    pub sent: Vec<String>,
}

impl MockCli {
    /// Create a session for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            replies: Vec::new(),
            fail_on: None,
            sent: Vec::new(),
        }
    }

    /// Reply with `output` to any command containing `pattern`
    pub fn reply_to(mut self, pattern: impl Into<String>, output: impl Into<String>) -> Self {
        self.replies.push((pattern.into(), output.into()));
        self
    }

    /// Fail with a transport error on any command containing `pattern`
    pub fn fail_on(mut self, pattern: impl Into<String>) -> Self {
        self.fail_on = Some(pattern.into());
        self
    }

    /// Number of commands sent
    pub fn call_count(&self) -> usize {
        self.sent.len()
    }

    fn prompt(&self) -> String {
        format!("{}#", self.endpoint)
    }
}

#[async_trait]
impl CliTransport for MockCli {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&mut self, command: &str) -> ReconResult<CliReply> {
        self.sent.push(command.to_string());

        if let Some(pattern) = &self.fail_on {
            if command.contains(pattern.as_str()) {
                return Err(ReconError::transport(self.endpoint.as_str(), "connection reset"));
            }
        }

        let output = self
            .replies
            .iter()
            .find(|(pattern, _)| command.contains(pattern.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| self.prompt());
        Ok(CliReply::new(format!("{}\n{}", command, output)))
    }
}

/// Shared state behind a [`FakeOntap`]
#[derive(Debug, Default)]
pub struct FakeOntapState {
    /// Records per object family (e.g. "security-login-role")
    pub tables: BTreeMap<String, Vec<FieldValues>>,
    /// Fields appended to every record created in a family
    pub create_extra: BTreeMap<String, FieldValues>,
    /// Fault returned by a family's get-iter when nothing matches
    pub not_found: BTreeMap<String, BackendFault>,
    /// Faults forced for specific API names
    pub faults: BTreeMap<String, BackendFault>,
    /// Every request received, in order
    pub calls: Vec<RpcRequest>,
}

/// In-memory management API backend
///
/// Understands the `<family>-get-iter`, `<family>-create` and
/// `<family>-delete` naming convention. Clones share state, so a test can
/// keep a handle while the code under test owns another.
#[derive(Debug, Clone)]
pub struct FakeOntap {
    endpoint: String,
    state: Arc<Mutex<FakeOntapState>>,
}

impl FakeOntap {
    /// Create an empty backend for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: Arc::new(Mutex::new(FakeOntapState::default())),
        }
    }

    /// Seed a record into a family
    pub fn with_record(self, family: &str, record: FieldValues) -> Self {
        self.state()
            .tables
            .entry(family.to_string())
            .or_default()
            .push(record);
        self
    }

    /// Append `fields` to every record created in `family`
    pub fn with_create_extra(self, family: &str, fields: FieldValues) -> Self {
        self.state().create_extra.insert(family.to_string(), fields);
        self
    }

    /// Make `family`'s get-iter raise `fault` when nothing matches
    pub fn with_not_found(self, family: &str, fault: BackendFault) -> Self {
        self.state().not_found.insert(family.to_string(), fault);
        self
    }

    /// Make every call to `api` raise `fault`
    pub fn with_fault(self, api: &str, fault: BackendFault) -> Self {
        self.state().faults.insert(api.to_string(), fault);
        self
    }

    /// Lock the shared state for inspection
    pub fn state(&self) -> MutexGuard<'_, FakeOntapState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records currently stored in `family`
    pub fn records(&self, family: &str) -> Vec<FieldValues> {
        self.state().tables.get(family).cloned().unwrap_or_default()
    }

    /// Every request received
    pub fn calls(&self) -> Vec<RpcRequest> {
        self.state().calls.clone()
    }

    /// Requests received for `api`
    pub fn calls_to(&self, api: &str) -> Vec<RpcRequest> {
        self.state()
            .calls
            .iter()
            .filter(|r| r.api == api)
            .cloned()
            .collect()
    }
}

fn split_api(api: &str) -> Option<(&str, &str)> {
    ["-get-iter", "-create", "-delete"]
        .iter()
        .find_map(|verb| api.strip_suffix(verb).map(|family| (family, *verb)))
}

#[async_trait]
impl RpcTransport for FakeOntap {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn invoke(&mut self, request: &RpcRequest) -> Result<RpcResponse, BackendFault> {
        let mut state = self.state();
        state.calls.push(request.clone());
        tracing::debug!(endpoint = %self.endpoint, api = %request.api, "Fake backend call");

        if let Some(fault) = state.faults.get(&request.api) {
            return Err(fault.clone());
        }

        let (family, verb) = split_api(&request.api)
            .ok_or_else(|| BackendFault::new("13005", format!("Unable to find API: {}", request.api)))?;
        let family = family.to_string();

        match verb {
            "-get-iter" => {
                let query = request.query.clone().unwrap_or_default();
                let matches: Vec<FieldValues> = state
                    .tables
                    .get(&family)
                    .map(|records| {
                        records
                            .iter()
                            .filter(|r| r.contains_all(&query))
                            .cloned()
                            .collect()
                    })
                    .unwrap_or_default();
                if matches.is_empty() {
                    if let Some(fault) = state.not_found.get(&family) {
                        return Err(fault.clone());
                    }
                }
                Ok(RpcResponse::with_records(matches))
            }
            "-create" => {
                let mut record = request.attributes.clone();
                if let Some(extra) = state.create_extra.get(&family) {
                    record.extend(extra.iter().cloned());
                }
                state.tables.entry(family).or_default().push(record);
                Ok(RpcResponse::default())
            }
            _ => {
                let records = state.tables.entry(family).or_default();
                let before = records.len();
                records.retain(|r| !r.contains_all(&request.attributes));
                if records.len() == before {
                    return Err(BackendFault::new("15661", "entry doesn't exist"));
                }
                Ok(RpcResponse::default())
            }
        }
    }
}

/// Fields matching `pairs`, for seeding and assertions
pub fn record(pairs: &[(&str, &str)]) -> FieldValues {
    pairs
        .iter()
        .map(|(f, v)| (f.to_string(), v.to_string()))
        .collect()
}

/// Helper to check a record carries a field value
pub fn has_value(record: &FieldValues, field: &str, value: &str) -> bool {
    record.get_all(field).contains(&value)
}
