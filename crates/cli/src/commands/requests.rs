//! Custom request commands.

use layercraft_core::{CustomRequestId, RequestStatus, UserId};
use layercraft_storefront::Storefront;
use tracing::info;

use super::{CliError, require_api_key};

/// List custom requests, newest first.
pub async fn list(storefront: &Storefront, user: Option<&str>) -> Result<(), CliError> {
    require_api_key(storefront, "requests list")?;

    let service = storefront.requests();
    let requests = match user {
        Some(user_id) => service.requests_for_user(&UserId::new(user_id)).await?,
        None => service.all_requests().await?,
    };

    for request in &requests {
        info!(
            "{}  {:<9} {}  {} <{}>: {}",
            request.id,
            request.status,
            request.request_date.format("%Y-%m-%d"),
            request.name,
            request.email,
            request.message
        );
    }
    info!("{} requests", requests.len());
    Ok(())
}

/// Move a request to a new status.
pub async fn set_status(storefront: &Storefront, id: &str, status: &str) -> Result<(), CliError> {
    require_api_key(storefront, "requests set-status")?;

    let status: RequestStatus = status.parse()?;
    let request = storefront
        .requests()
        .update_status(&CustomRequestId::new(id), status)
        .await?;

    info!("Request {} is now {}", request.id, request.status);
    Ok(())
}
