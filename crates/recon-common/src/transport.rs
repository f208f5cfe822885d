//! Transport collaborators.
//!
//! The engine talks to the managed system through one of two seams:
//!
//! - [`CliTransport`]: a remote shell session that takes command text and
//!   returns raw output. Failure detection is textual, see [`crate::marker`].
//! - [`RpcTransport`]: a structured management API that returns records or
//!   raises a [`BackendFault`].
//!
//! A transport is acquired once per invocation and released when dropped.
//! Timeouts are the transport's concern and surface as errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::{ReconError, ReconResult};
use crate::fields::FieldValues;

/// Raw reply to one CLI command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliReply {
    /// Everything the session printed in response.
    pub raw_output: String,
}

impl CliReply {
    /// Wraps raw output.
    pub fn new(raw_output: impl Into<String>) -> Self {
        Self {
            raw_output: raw_output.into(),
        }
    }
}

/// Remote shell session.
#[async_trait]
pub trait CliTransport: Send {
    /// Returns the endpoint name for logs and error messages.
    fn endpoint(&self) -> &str;

    /// Sends one command line and returns the raw reply.
    async fn send(&mut self, command: &str) -> ReconResult<CliReply>;
}

/// Structured call against a management API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcRequest {
    /// API name (e.g. "security-login-role-get-iter").
    pub api: String,
    /// Call attributes.
    pub attributes: FieldValues,
    /// Query filter for iterator calls.
    pub query: Option<FieldValues>,
}

impl RpcRequest {
    /// Creates a request with no attributes.
    pub fn new(api: impl Into<String>) -> Self {
        Self {
            api: api.into(),
            attributes: Vec::new(),
            query: None,
        }
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((field.into(), value.into()));
        self
    }

    /// Sets the query filter.
    pub fn with_query(mut self, query: FieldValues) -> Self {
        self.query = Some(query);
        self
    }
}

/// Reply to a structured call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RpcResponse {
    /// Matching records, in backend order.
    pub records: Vec<FieldValues>,
    /// Record count as reported by the backend.
    pub num_records: usize,
}

impl RpcResponse {
    /// Builds a response whose count matches its records.
    pub fn with_records(records: Vec<FieldValues>) -> Self {
        let num_records = records.len();
        Self {
            records,
            num_records,
        }
    }

    /// Returns the first record when the backend reported at least one.
    pub fn first_record(&self) -> Option<&FieldValues> {
        if self.num_records >= 1 {
            self.records.first()
        } else {
            None
        }
    }
}

/// Fault raised by a management API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct BackendFault {
    /// Backend fault code.
    pub code: String,
    /// Backend fault message.
    pub message: String,
}

impl BackendFault {
    /// Creates a fault.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Converts the fault into an engine error for `endpoint`.
    pub fn into_error(self, endpoint: &str) -> ReconError {
        ReconError::Backend {
            endpoint: endpoint.to_string(),
            code: self.code,
            message: self.message,
        }
    }
}

/// Structured management API client.
#[async_trait]
pub trait RpcTransport: Send {
    /// Returns the endpoint name for logs and error messages.
    fn endpoint(&self) -> &str;

    /// Issues one call.
    async fn invoke(&mut self, request: &RpcRequest) -> Result<RpcResponse, BackendFault>;
}
