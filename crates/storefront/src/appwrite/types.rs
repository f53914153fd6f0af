//! Wire types for backend responses.

use chrono::{DateTime, Utc};
use layercraft_core::UserId;
use serde::Deserialize;

/// A stored document: system attributes plus the collection's own fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    /// Document ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Collection the document belongs to.
    #[serde(rename = "$collectionId", default)]
    pub collection_id: String,
    /// Creation timestamp (set by the backend).
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp (set by the backend).
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Permission strings (e.g., `read("user:abc")`).
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    /// Collection attributes.
    #[serde(flatten)]
    pub data: T,
}

impl<T> Document<T> {
    /// Map the attribute payload, keeping the system attributes.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Document<U> {
        Document {
            id: self.id,
            collection_id: self.collection_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            permissions: self.permissions,
            data: f(self.data),
        }
    }
}

/// One page of a document listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
    /// Total number of documents matching the filters (ignores limit/offset).
    pub total: u64,
    /// Documents on this page.
    pub documents: Vec<Document<T>>,
}

/// An account as returned by the account service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account ID.
    #[serde(rename = "$id")]
    pub id: UserId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    pub email: String,
    /// Whether the email has been verified.
    #[serde(default)]
    pub email_verification: bool,
    /// Labels assigned in the console (e.g., `admin`).
    #[serde(default)]
    pub labels: Vec<String>,
}

/// A login session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID.
    #[serde(rename = "$id")]
    pub id: String,
    /// Account the session belongs to.
    pub user_id: UserId,
    /// Expiry timestamp.
    pub expire: DateTime<Utc>,
    /// Whether this is the session the request was made with.
    #[serde(default)]
    pub current: bool,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Note {
        text: String,
    }

    #[test]
    fn test_document_flattens_attributes() {
        let json = r#"{
            "$id": "65a1",
            "$collectionId": "notes",
            "$databaseId": "store",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "$updatedAt": "2024-05-02T10:00:00.000+00:00",
            "$permissions": ["read(\"any\")"],
            "text": "hello"
        }"#;

        let doc: Document<Note> = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "65a1");
        assert_eq!(doc.collection_id, "notes");
        assert_eq!(doc.permissions.len(), 1);
        assert_eq!(doc.data.text, "hello");

        let mapped = doc.map(|n| n.text.len());
        assert_eq!(mapped.data, 5);
        assert_eq!(mapped.id, "65a1");
    }

    #[test]
    fn test_account_defaults() {
        let json = r#"{"$id":"u1","email":"a@b.c"}"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.id.as_str(), "u1");
        assert!(account.name.is_empty());
        assert!(account.labels.is_empty());
        assert!(!account.email_verification);
    }
}
