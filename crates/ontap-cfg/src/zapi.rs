//! ZAPI names and fault handling

use recon_common::{BackendFault, ReconError, ReconResult, RpcRequest, RpcResponse, RpcTransport};
use tracing::debug;

pub const ROLE_GET_ITER: &str = "security-login-role-get-iter";
pub const ROLE_CREATE: &str = "security-login-role-create";
pub const ROLE_DELETE: &str = "security-login-role-delete";

pub const PEER_GET_ITER: &str = "cluster-peer-get-iter";
pub const PEER_CREATE: &str = "cluster-peer-create";
pub const PEER_DELETE: &str = "cluster-peer-delete";

/// Role not found
pub const FAULT_ROLE_NOT_FOUND: &str = "16031";

/// Command directory not found
pub const FAULT_DIRECTORY_NOT_FOUND: &str = "16039";

/// Issues one call, returning the raw fault on failure.
pub async fn try_invoke(
    transport: &mut (dyn RpcTransport + 'static),
    request: &RpcRequest,
) -> Result<RpcResponse, BackendFault> {
    debug!(endpoint = %transport.endpoint(), api = %request.api, "ZAPI call");
    let result = transport.invoke(request).await;
    if let Err(fault) = &result {
        debug!(endpoint = %transport.endpoint(), api = %request.api, code = %fault.code, "ZAPI fault");
    }
    result
}

/// Issues one call, prefixing any fault with `context`.
pub async fn invoke(
    transport: &mut (dyn RpcTransport + 'static),
    request: &RpcRequest,
    context: &str,
) -> ReconResult<RpcResponse> {
    match try_invoke(transport, request).await {
        Ok(response) => Ok(response),
        Err(fault) => Err(fault_error(fault, transport.endpoint(), context)),
    }
}

/// Converts a fault into an engine error carrying `context`.
pub fn fault_error(fault: BackendFault, endpoint: &str, context: &str) -> ReconError {
    BackendFault {
        message: format!("{}: {}", context, fault.message),
        ..fault
    }
    .into_error(endpoint)
}

/// Returns true for faults meaning the role does not exist.
pub fn is_role_not_found(fault: &BackendFault) -> bool {
    fault.code == FAULT_ROLE_NOT_FOUND || fault.code == FAULT_DIRECTORY_NOT_FOUND
}
