//! Custom request service.

use layercraft_core::{CustomRequestId, RequestStatus, UserId};
use tracing::{info, instrument};

use crate::appwrite::AppwriteClient;
use crate::config::AppwriteConfig;
use crate::db::RequestRepository;
use crate::error::{AppError, Result, not_found_as};
use crate::models::{CustomRequest, NewCustomRequest};

/// Custom request service.
pub struct RequestService<'a> {
    requests: RequestRepository<'a>,
}

impl<'a> RequestService<'a> {
    /// Create a new request service.
    #[must_use]
    pub fn new(client: &'a AppwriteClient, config: &'a AppwriteConfig) -> Self {
        Self {
            requests: RequestRepository::new(client, config),
        }
    }

    /// Submit a request. It is stored as pending, dated now.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank name or message.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn submit(&self, request: NewCustomRequest) -> Result<CustomRequest> {
        let request = validate_request(request)?;
        let stored = self.requests.create(request).await?;
        info!(request_id = %stored.id, "Custom request submitted");
        Ok(stored)
    }

    /// A user's requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the listing fails.
    pub async fn requests_for_user(&self, user_id: &UserId) -> Result<Vec<CustomRequest>> {
        Ok(self.requests.list_for_user(user_id).await?)
    }

    /// Every request, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the listing fails.
    pub async fn all_requests(&self) -> Result<Vec<CustomRequest>> {
        Ok(self.requests.list_all().await?)
    }

    /// Move a request to `status`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown request.
    #[instrument(skip(self), fields(request_id = %id, status = %status))]
    pub async fn update_status(
        &self,
        id: &CustomRequestId,
        status: RequestStatus,
    ) -> Result<CustomRequest> {
        let updated = self
            .requests
            .update_status(id, status)
            .await
            .map_err(not_found_as(format!("Request {id}")))?;
        info!(status = %updated.status, "Request status updated");
        Ok(updated)
    }
}

fn validate_request(mut request: NewCustomRequest) -> Result<NewCustomRequest> {
    request.name = request.name.trim().to_string();
    request.message = request.message.trim().to_string();

    if request.name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.message.is_empty() {
        return Err(AppError::Validation(
            "Please describe what you would like made".to_string(),
        ));
    }

    Ok(request)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use layercraft_core::Email;

    use super::*;

    fn request(name: &str, message: &str) -> NewCustomRequest {
        NewCustomRequest {
            user_id: UserId::new("u1"),
            name: name.to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            product_id: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_validate_request() {
        let ok = validate_request(request(" Ada ", " A larger dragon ")).unwrap();
        assert_eq!(ok.name, "Ada");
        assert_eq!(ok.message, "A larger dragon");

        assert!(matches!(
            validate_request(request("", "hi")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_request(request("Ada", "   ")),
            Err(AppError::Validation(_))
        ));
    }
}
