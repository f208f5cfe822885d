//! Management endpoint connections
//!
//! A paired plugin talks to two clusters. Each one gets its own
//! [`OntapConnection`] and its own transport handle; nothing is shared or
//! re-pointed between them.

use std::fmt;

use async_trait::async_trait;
use recon_common::{DesiredState, ReconError, ReconResult, RpcTransport};
use serde::{Deserialize, Serialize};

fn default_https() -> bool {
    true
}

/// Connection parameters of one management endpoint
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntapConnection {
    /// Cluster or SVM management address
    pub hostname: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Use HTTPS for the API endpoint
    #[serde(default = "default_https")]
    pub https: bool,

    /// Explicit API port, otherwise the scheme default
    #[serde(default)]
    pub port: Option<u16>,
}

impl fmt::Debug for OntapConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OntapConnection")
            .field("hostname", &self.hostname)
            .field("username", &self.username)
            .field("password", &"********")
            .field("https", &self.https)
            .field("port", &self.port)
            .finish()
    }
}

impl OntapConnection {
    /// Create a connection with default transport settings
    pub fn new(
        hostname: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            username: username.into(),
            password: password.into(),
            https: true,
            port: None,
        }
    }

    /// Builds the destination side of a paired plugin.
    ///
    /// `dest_hostname` is required; `dest_username` and `dest_password`
    /// fall back to this connection's credentials.
    pub fn destination(&self, desired: &DesiredState) -> ReconResult<Self> {
        let hostname = desired.require("dest_hostname")?;
        Ok(Self {
            hostname: hostname.to_string(),
            username: desired
                .get("dest_username")
                .unwrap_or(&self.username)
                .to_string(),
            password: desired
                .get("dest_password")
                .unwrap_or(&self.password)
                .to_string(),
            ..self.clone()
        })
    }

    /// Returns the API URL.
    pub fn url(&self) -> String {
        let scheme = if self.https { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{}://{}:{}/servlets/netapp.servlets.admin.XMLrequest_filer", scheme, self.hostname, port),
            None => format!("{}://{}/servlets/netapp.servlets.admin.XMLrequest_filer", scheme, self.hostname),
        }
    }

    /// Validate connection parameters
    pub fn validate(&self) -> ReconResult<()> {
        if self.hostname.trim().is_empty() {
            return Err(ReconError::validation("hostname", "is required"));
        }
        if self.port == Some(0) {
            return Err(ReconError::validation("port", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Opens RPC handles for connections.
///
/// The concrete API client lives outside this crate.
#[async_trait]
pub trait RpcConnector: Send + Sync {
    /// Opens a handle for `connection`; released when dropped.
    async fn connect(&self, connection: &OntapConnection) -> ReconResult<Box<dyn RpcTransport>>;
}
