//! Cluster peer plugin.
//!
//! A peer relation spans two clusters and is planned once per side. From
//! the source cluster the peer is the destination, and the other way
//! round, so each side filters and creates with the opposite side's LIF
//! and cluster name.

use std::fmt;

use async_trait::async_trait;
use recon_common::{
    DesiredState, Endpoint, ExecutionMode, FieldValues, Operation, Outcome, ParamSchema,
    ParamSpec, Reconciler, ReconError, ReconResult, RemoteState, RequiredIf, Resource, RpcRequest,
    RpcTransport,
};
use tracing::{info, warn};

use crate::connection::{OntapConnection, RpcConnector};
use crate::zapi;

/// Parameters of the cluster peer plugin
pub static PEER_SCHEMA: ParamSchema = ParamSchema {
    plugin: "na_ontap_cluster_peer",
    params: &[
        ParamSpec::state(),
        ParamSpec::string("source_intercluster_lif"),
        ParamSpec::string("dest_intercluster_lif"),
        ParamSpec::string("passphrase").secret(),
        ParamSpec::string("dest_hostname").required(),
        ParamSpec::string("dest_username"),
        ParamSpec::string("dest_password").secret(),
        ParamSpec::string("source_cluster_name"),
        ParamSpec::string("dest_cluster_name"),
    ],
    required_together: &[&["source_intercluster_lif", "dest_intercluster_lif", "passphrase"]],
    required_if: &[RequiredIf {
        field: "state",
        value: "absent",
        requires: &["source_cluster_name", "dest_cluster_name"],
    }],
};

/// Which cluster a handle is connected to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Destination,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Source => "source",
            Side::Destination => "destination",
        }
    }

    /// Parameter keys describing the peer seen from this side.
    fn peer_keys(&self) -> (&'static str, &'static str) {
        match self {
            Side::Source => ("dest_intercluster_lif", "dest_cluster_name"),
            Side::Destination => ("source_intercluster_lif", "source_cluster_name"),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup filter for the relation on one side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerFilter {
    pub remote_inet_address: Option<String>,
    pub cluster_name: Option<String>,
}

impl PeerFilter {
    fn query(&self) -> FieldValues {
        let mut query = Vec::new();
        if let Some(address) = &self.remote_inet_address {
            query.push(("remote-inet-address".to_string(), address.clone()));
        }
        if let Some(name) = &self.cluster_name {
            query.push(("cluster-name".to_string(), name.clone()));
        }
        query
    }
}

/// Create payload for one side
#[derive(Clone, PartialEq, Eq)]
pub struct PeerCreate {
    pub passphrase: String,
    pub peer_address: String,
}

impl fmt::Debug for PeerCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerCreate")
            .field("passphrase", &"********")
            .field("peer_address", &self.peer_address)
            .finish()
    }
}

/// `cluster-peer` relation as seen from one cluster
#[derive(Debug, Clone, Copy)]
pub struct ClusterPeerSide {
    side: Side,
}

impl ClusterPeerSide {
    pub fn new(side: Side) -> Self {
        Self { side }
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

#[async_trait]
impl Resource for ClusterPeerSide {
    type Transport = dyn RpcTransport;
    type Identity = PeerFilter;
    type Payload = PeerCreate;

    fn kind(&self) -> &str {
        match self.side {
            Side::Source => "cluster-peer/source",
            Side::Destination => "cluster-peer/destination",
        }
    }

    fn identity(&self, operation: Operation, desired: &DesiredState) -> ReconResult<PeerFilter> {
        let (lif_key, cluster_key) = self.side.peer_keys();
        let filter = PeerFilter {
            remote_inet_address: desired.get(lif_key).map(str::to_string),
            cluster_name: desired.get(cluster_key).map(str::to_string),
        };

        if filter.remote_inet_address.is_none() && filter.cluster_name.is_none() {
            return Err(ReconError::missing_fields());
        }
        if operation == Operation::Absent && filter.cluster_name.is_none() {
            return Err(ReconError::missing_fields());
        }
        Ok(filter)
    }

    fn payload(&self, identity: &PeerFilter, desired: &DesiredState) -> ReconResult<PeerCreate> {
        let peer_address = identity
            .remote_inet_address
            .clone()
            .ok_or_else(ReconError::missing_fields)?;
        Ok(PeerCreate {
            passphrase: desired.require("passphrase")?.to_string(),
            peer_address,
        })
    }

    fn delete_identity(&self, identity: &PeerFilter, remote: &RemoteState) -> PeerFilter {
        PeerFilter {
            cluster_name: identity
                .cluster_name
                .clone()
                .or_else(|| remote.get("cluster-name").map(str::to_string)),
            ..identity.clone()
        }
    }

    async fn fetch(
        &self,
        transport: &mut Self::Transport,
        identity: &PeerFilter,
    ) -> ReconResult<Option<RemoteState>> {
        let request = RpcRequest::new(zapi::PEER_GET_ITER).with_query(identity.query());
        let context = format!(
            "Error fetching cluster peer {}",
            identity.cluster_name.as_deref().unwrap_or_default()
        );
        let response = zapi::invoke(transport, &request, &context).await?;

        // Keep only the relation's name and its peer addresses
        Ok(response.first_record().map(|record| {
            record
                .iter()
                .filter(|(field, _)| field == "cluster-name" || field == "remote-inet-address")
                .cloned()
                .collect::<FieldValues>()
                .into()
        }))
    }

    async fn create(&self, transport: &mut Self::Transport, payload: &PeerCreate) -> ReconResult<()> {
        let request = RpcRequest::new(zapi::PEER_CREATE)
            .with_attribute("passphrase", payload.passphrase.as_str())
            .with_attribute("remote-inet-address", payload.peer_address.as_str());
        let context = format!("Error creating cluster peer {}", payload.peer_address);
        zapi::invoke(transport, &request, &context).await?;
        info!(side = %self.side, peer = %payload.peer_address, "Created cluster peer");
        Ok(())
    }

    async fn delete(&self, transport: &mut Self::Transport, identity: &PeerFilter) -> ReconResult<()> {
        let name = identity.cluster_name.as_deref().ok_or_else(ReconError::missing_fields)?;
        let request = RpcRequest::new(zapi::PEER_DELETE).with_attribute("cluster-name", name);
        let context = format!("Error deleting cluster peer {}", name);
        zapi::invoke(transport, &request, &context).await?;
        info!(side = %self.side, peer = %name, "Deleted cluster peer");
        Ok(())
    }
}

/// Reconciles a peer relation over two open handles.
pub async fn reconcile_cluster_peer(
    source: &mut (dyn RpcTransport + 'static),
    destination: &mut (dyn RpcTransport + 'static),
    params: FieldValues,
    mode: ExecutionMode,
) -> Outcome {
    let desired = match DesiredState::from_params(&PEER_SCHEMA, params) {
        Ok(desired) => desired,
        Err(e) => {
            warn!(error = %e, "Rejected cluster peer parameters");
            return Outcome::from_error(&e);
        }
    };
    run_paired(source, destination, &desired, mode).await
}

async fn run_paired(
    source: &mut (dyn RpcTransport + 'static),
    destination: &mut (dyn RpcTransport + 'static),
    desired: &DesiredState,
    mode: ExecutionMode,
) -> Outcome {
    let source_side = ClusterPeerSide::new(Side::Source);
    let destination_side = ClusterPeerSide::new(Side::Destination);
    Reconciler::new(mode)
        .reconcile_paired(
            Endpoint::new(&source_side, source),
            Endpoint::new(&destination_side, destination),
            desired,
        )
        .await
}

/// Opens the source and destination handles and reconciles the relation.
///
/// The destination connection is derived from `source` and the
/// `dest_*` parameters.
pub async fn apply_cluster_peer(
    connector: &dyn RpcConnector,
    source: &OntapConnection,
    params: FieldValues,
    mode: ExecutionMode,
) -> Outcome {
    let desired = match DesiredState::from_params(&PEER_SCHEMA, params) {
        Ok(desired) => desired,
        Err(e) => {
            warn!(error = %e, "Rejected cluster peer parameters");
            return Outcome::from_error(&e);
        }
    };

    let handles = async {
        source.validate()?;
        let destination = source.destination(&desired)?;
        destination.validate()?;
        let source_handle = connector.connect(source).await?;
        let destination_handle = connector.connect(&destination).await?;
        Ok::<_, ReconError>((source_handle, destination_handle))
    };

    match handles.await {
        Ok((mut source_handle, mut destination_handle)) => {
            run_paired(source_handle.as_mut(), destination_handle.as_mut(), &desired, mode).await
        }
        Err(e) => {
            warn!(error = %e, "Failed to open cluster peer handles");
            Outcome::from_error(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recon_common::field_values;

    fn desired(params: FieldValues) -> DesiredState {
        DesiredState::from_params(&PEER_SCHEMA, params).unwrap()
    }

    fn present() -> DesiredState {
        desired(field_values! {
            "source_intercluster_lif" => "10.0.0.1",
            "dest_intercluster_lif" => "10.0.0.2",
            "passphrase" => "p4ss",
            "dest_hostname" => "west",
        })
    }

    #[test]
    fn test_sides_mirror_each_other() {
        let state = present();
        let source = ClusterPeerSide::new(Side::Source)
            .identity(Operation::Present, &state)
            .unwrap();
        let destination = ClusterPeerSide::new(Side::Destination)
            .identity(Operation::Present, &state)
            .unwrap();

        assert_eq!(source.remote_inet_address.as_deref(), Some("10.0.0.2"));
        assert_eq!(destination.remote_inet_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(source.query(), field_values! { "remote-inet-address" => "10.0.0.2" });
    }

    #[test]
    fn test_empty_filter_is_planning_error() {
        let state = desired(field_values! { "dest_hostname" => "west" });
        let err = ClusterPeerSide::new(Side::Source)
            .identity(Operation::Present, &state)
            .unwrap_err();
        assert_eq!(err, ReconError::missing_fields());
    }

    #[test]
    fn test_partial_lif_group_rejected() {
        let err = DesiredState::from_params(
            &PEER_SCHEMA,
            field_values! { "dest_hostname" => "west", "source_intercluster_lif" => "10.0.0.1" },
        )
        .unwrap_err();
        assert!(matches!(err, ReconError::Validation { .. }));
    }

    #[test]
    fn test_absent_requires_both_cluster_names() {
        let err = DesiredState::from_params(
            &PEER_SCHEMA,
            field_values! {
                "state" => "absent",
                "dest_hostname" => "west",
                "source_cluster_name" => "east",
            },
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReconError::validation("dest_cluster_name", "is required when state is absent")
        );
    }

    #[test]
    fn test_passphrase_not_in_debug() {
        let state = present();
        let side = ClusterPeerSide::new(Side::Source);
        let identity = side.identity(Operation::Present, &state).unwrap();
        let payload = side.payload(&identity, &state).unwrap();
        assert_eq!(payload.peer_address, "10.0.0.2");
        assert!(!format!("{:?}", payload).contains("p4ss"));
        assert!(!format!("{:?}", state).contains("p4ss"));
    }
}
