//! ontap-cfg - NetApp ONTAP reconciliation plugins
//!
//! Two plugins over a ZAPI-style RPC transport:
//!
//! - [`role`]: `security-login-role` presence on one SVM
//! - [`peer`]: a `cluster-peer` relation between two clusters, planned per
//!   side and created only when neither side has it
//!
//! Both support check mode through [`recon_common::ExecutionMode`].

pub mod connection;
pub mod peer;
pub mod role;
pub mod zapi;

pub use connection::{OntapConnection, RpcConnector};
pub use peer::{
    apply_cluster_peer, reconcile_cluster_peer, ClusterPeerSide, PeerCreate, PeerFilter, Side,
    PEER_SCHEMA,
};
pub use role::{apply_user_role, reconcile_user_role, RoleIdentity, RoleSpec, UserRole, ROLE_SCHEMA};
