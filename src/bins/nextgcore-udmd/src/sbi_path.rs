//! UDM SBI Path Functions
//!
//! Routing of inbound SBI requests and the lifecycle of the UDM SBI server.
//!
//! Only `POST /nudm-ueau/v1/{supiOrSuci}/security-information/generate-auth-data`
//! is served. Other Nudm-ueau resources answer 405, anything else 404.

use std::net::SocketAddr;
use std::sync::Arc;

use ogs_sbi::constants::{cause, method, resource, service};
use ogs_sbi::{
    send_bad_request, send_internal_error, send_method_not_allowed, send_not_found, SbiRequest,
    SbiResponse, SbiResult, SbiServer, SbiServerConfig,
};

use crate::context::UdmContext;
use crate::nudm_handler::{udm_nudm_ueau_handle_get, AuthenticationInfoRequest};

/// SBI request handler for UDM
pub async fn udm_sbi_request_handler(ctx: Arc<UdmContext>, request: SbiRequest) -> SbiResponse {
    let http_method = request.header.method.as_str();
    let uri = request.header.uri.as_str();

    log::debug!("UDM SBI request: {} {}", http_method, uri);

    // /nudm-ueau/v1/{supi}/security-information/generate-auth-data
    let parts = request.header.resource_components();
    if parts.len() < 3 {
        return send_not_found("Invalid path", Some(cause::RESOURCE_URI_STRUCTURE_NOT_FOUND));
    }

    match parts[0] {
        service::NUDM_UEAU => match (parts.get(3), parts.get(4), parts.len(), http_method) {
            (
                Some(&resource::SECURITY_INFORMATION),
                Some(&resource::GENERATE_AUTH_DATA),
                5,
                method::POST,
            ) => handle_generate_auth_data(ctx, parts[2], &request).await,
            _ => send_method_not_allowed(http_method, uri),
        },
        _ => {
            log::error!("Unknown SBI service: {}", parts[0]);
            send_not_found(
                &format!("Unknown service: {}", parts[0]),
                Some(cause::RESOURCE_URI_STRUCTURE_NOT_FOUND),
            )
        }
    }
}

/// Handle POST generate-auth-data
async fn handle_generate_auth_data(
    ctx: Arc<UdmContext>,
    supi_or_suci: &str,
    request: &SbiRequest,
) -> SbiResponse {
    let body = match &request.http.content {
        Some(content) => content,
        None => return send_bad_request("Missing request body", Some(cause::MANDATORY_IE_INCORRECT)),
    };

    let auth_info: AuthenticationInfoRequest = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) => {
            return send_bad_request(
                &format!("Invalid JSON: {}", e),
                Some(cause::MANDATORY_IE_INCORRECT),
            )
        }
    };

    // Milenage and the store are synchronous; keep them off the reactor
    let supi = supi_or_suci.to_string();
    let result = tokio::task::spawn_blocking(move || {
        udm_nudm_ueau_handle_get(&ctx, &supi, &auth_info)
    })
    .await;

    match result {
        Ok(Ok(auth_result)) => SbiResponse::ok()
            .with_json_body(&auth_result)
            .unwrap_or_else(|e| send_internal_error(&e.to_string(), Some(cause::SYSTEM_FAILURE))),
        Ok(Err(e)) => {
            log::error!("[{}] generate-auth-data failed: {}", supi_or_suci, e);
            e.to_response()
        }
        Err(e) => {
            log::error!("[{}] generate-auth-data task failed: {}", supi_or_suci, e);
            send_internal_error("Vector generation aborted", Some(cause::SYSTEM_FAILURE))
        }
    }
}

/// Open the UDM SBI server
///
/// Returns the running server and the address it is bound to.
pub async fn udm_sbi_open(
    config: SbiServerConfig,
    ctx: Arc<UdmContext>,
) -> SbiResult<(SbiServer, SocketAddr)> {
    log::info!("Opening UDM SBI server on {}", config.addr);

    let server = SbiServer::new(config);
    let addr = server
        .start(move |request: SbiRequest| udm_sbi_request_handler(ctx.clone(), request))
        .await?;

    log::info!("nudm-ueau service listening on {}", addr);
    Ok((server, addr))
}

/// Close the UDM SBI server
pub async fn udm_sbi_close(server: &SbiServer) -> SbiResult<()> {
    server.stop().await?;
    log::info!("UDM SBI server closed");
    Ok(())
}
