//! User role plugin.
//!
//! A role is addressed by `{vserver, role-name, command-directory-name}`.
//! Only presence is reconciled: an existing role with a different access
//! level is left as is.

use async_trait::async_trait;
use recon_common::{
    DesiredState, ExecutionMode, Operation, Outcome, ParamSchema, ParamSpec, Reconciler,
    ReconResult, RemoteState, Resource, RpcRequest, RpcTransport, FieldValues,
};
use tracing::warn;

use crate::connection::{OntapConnection, RpcConnector};
use crate::zapi;

/// Parameters of the user role plugin
pub static ROLE_SCHEMA: ParamSchema = ParamSchema {
    plugin: "na_ontap_user_role",
    params: &[
        ParamSpec::state(),
        ParamSpec::string("name").required(),
        ParamSpec::string("command_directory_name").required(),
        ParamSpec::choice("access_level", &["none", "readonly", "all"]).default_value("all"),
        ParamSpec::string("vserver").required(),
    ],
    required_together: &[],
    required_if: &[],
};

/// Compound key of a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleIdentity {
    pub vserver: String,
    pub name: String,
    pub command_directory: String,
}

impl RoleIdentity {
    fn fields(&self) -> FieldValues {
        vec![
            ("vserver".to_string(), self.vserver.clone()),
            ("role-name".to_string(), self.name.clone()),
            ("command-directory-name".to_string(), self.command_directory.clone()),
        ]
    }

    fn request(&self, api: &str) -> RpcRequest {
        RpcRequest {
            attributes: self.fields(),
            ..RpcRequest::new(api)
        }
    }
}

/// Create payload of a role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub identity: RoleIdentity,
    pub access_level: String,
}

/// `security-login-role` resource
#[derive(Debug, Clone, Copy, Default)]
pub struct UserRole;

#[async_trait]
impl Resource for UserRole {
    type Transport = dyn RpcTransport;
    type Identity = RoleIdentity;
    type Payload = RoleSpec;

    fn kind(&self) -> &str {
        "user-role"
    }

    fn identity(&self, _operation: Operation, desired: &DesiredState) -> ReconResult<RoleIdentity> {
        Ok(RoleIdentity {
            vserver: desired.require("vserver")?.to_string(),
            name: desired.require("name")?.to_string(),
            command_directory: desired.require("command_directory_name")?.to_string(),
        })
    }

    fn payload(&self, identity: &RoleIdentity, desired: &DesiredState) -> ReconResult<RoleSpec> {
        Ok(RoleSpec {
            identity: identity.clone(),
            access_level: desired.require("access_level")?.to_string(),
        })
    }

    async fn fetch(
        &self,
        transport: &mut Self::Transport,
        identity: &RoleIdentity,
    ) -> ReconResult<Option<RemoteState>> {
        let request = RpcRequest::new(zapi::ROLE_GET_ITER).with_query(identity.fields());
        match zapi::try_invoke(transport, &request).await {
            Ok(response) => Ok(response.first_record().cloned().map(RemoteState::new)),
            Err(fault) if zapi::is_role_not_found(&fault) => Ok(None),
            Err(fault) => Err(zapi::fault_error(
                fault,
                transport.endpoint(),
                &format!("Error getting role {}", identity.name),
            )),
        }
    }

    async fn create(&self, transport: &mut Self::Transport, spec: &RoleSpec) -> ReconResult<()> {
        let request = spec
            .identity
            .request(zapi::ROLE_CREATE)
            .with_attribute("access-level", spec.access_level.as_str());
        let context = format!("Error creating role {}", spec.identity.name);
        zapi::invoke(transport, &request, &context).await.map(|_| ())
    }

    async fn delete(&self, transport: &mut Self::Transport, identity: &RoleIdentity) -> ReconResult<()> {
        let request = identity.request(zapi::ROLE_DELETE);
        let context = format!("Error removing role {}", identity.name);
        zapi::invoke(transport, &request, &context).await.map(|_| ())
    }
}

/// Reconciles one role over an open handle.
pub async fn reconcile_user_role(
    transport: &mut (dyn RpcTransport + 'static),
    params: FieldValues,
    mode: ExecutionMode,
) -> Outcome {
    let desired = match DesiredState::from_params(&ROLE_SCHEMA, params) {
        Ok(desired) => desired,
        Err(e) => {
            warn!(error = %e, "Rejected user role parameters");
            return Outcome::from_error(&e);
        }
    };
    Reconciler::new(mode).reconcile(&UserRole, transport, &desired).await
}

/// Opens a handle for `connection` and reconciles one role.
pub async fn apply_user_role(
    connector: &dyn RpcConnector,
    connection: &OntapConnection,
    params: FieldValues,
    mode: ExecutionMode,
) -> Outcome {
    if let Err(e) = connection.validate() {
        return Outcome::from_error(&e);
    }
    let mut transport = match connector.connect(connection).await {
        Ok(transport) => transport,
        Err(e) => {
            warn!(host = %connection.hostname, error = %e, "Failed to connect");
            return Outcome::from_error(&e);
        }
    };
    reconcile_user_role(transport.as_mut(), params, mode).await
}
