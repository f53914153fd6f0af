//! Custom order request types.

use chrono::{DateTime, Utc};
use layercraft_core::{CustomRequestId, Email, ProductId, RequestStatus, UserId};
use serde::{Deserialize, Serialize};

use crate::appwrite::Document;

/// A customer's request for a personalised print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRequest {
    pub id: CustomRequestId,
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    /// Product the request starts from, if any.
    pub product_id: Option<ProductId>,
    pub message: String,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
}

/// Input for submitting a custom request.
///
/// Status and request date are set on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomRequest {
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    pub product_id: Option<ProductId>,
    pub message: String,
}

/// Request attributes as stored in the requests collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomRequestRecord {
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_date: Option<DateTime<Utc>>,
}

impl CustomRequestRecord {
    /// A freshly submitted request: always pending, dated `now`.
    pub(crate) fn submitted(request: NewCustomRequest, now: DateTime<Utc>) -> Self {
        Self {
            user_id: request.user_id,
            name: request.name,
            email: request.email,
            product_id: request.product_id,
            message: request.message,
            status: RequestStatus::Pending,
            request_date: Some(now),
        }
    }
}

impl CustomRequest {
    /// A not-yet-stored request as it will look once accepted.
    #[must_use]
    pub fn provisional(id: CustomRequestId, request: NewCustomRequest, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: request.user_id,
            name: request.name,
            email: request.email,
            product_id: request.product_id,
            message: request.message,
            status: RequestStatus::Pending,
            request_date: now,
        }
    }
}

impl From<Document<CustomRequestRecord>> for CustomRequest {
    fn from(doc: Document<CustomRequestRecord>) -> Self {
        let record = doc.data;
        Self {
            id: CustomRequestId::new(doc.id),
            user_id: record.user_id,
            name: record.name,
            email: record.email,
            product_id: record.product_id,
            message: record.message,
            status: record.status,
            request_date: record.request_date.unwrap_or(doc.created_at),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_submitted_is_pending() {
        let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let record = CustomRequestRecord::submitted(
            NewCustomRequest {
                user_id: UserId::new("u1"),
                name: "Ada".to_string(),
                email: Email::parse("ada@example.com").unwrap(),
                product_id: None,
                message: "Engrave my cat's name".to_string(),
            },
            now,
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["status"], "pending");
        assert_eq!(value["requestDate"], "2024-06-01T12:00:00Z");
        assert!(value.get("productId").is_none());
    }

    #[test]
    fn test_document_to_request() {
        let json = r#"{
            "$id": "r1",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "$updatedAt": "2024-05-03T10:00:00.000+00:00",
            "userId": "u1",
            "name": "Ada",
            "email": "ada@example.com",
            "productId": "p9",
            "message": "Bigger, please",
            "status": "reviewed",
            "requestDate": "2024-05-01T09:59:58.000+00:00"
        }"#;

        let doc: Document<CustomRequestRecord> = serde_json::from_str(json).unwrap();
        let request = CustomRequest::from(doc);

        assert_eq!(request.id.as_str(), "r1");
        assert_eq!(request.product_id, Some(ProductId::new("p9")));
        assert_eq!(request.status, RequestStatus::Reviewed);
        assert_eq!(request.request_date.to_rfc3339(), "2024-05-01T09:59:58+00:00");
    }
}
