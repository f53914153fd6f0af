//! User and profile types.

use layercraft_core::{Email, ProfileId, UserId, UserRole};
use serde::{Deserialize, Serialize};

use crate::appwrite::Document;

/// The logged-in user as the storefront sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Backend account ID.
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
}

impl User {
    /// Whether the user may use admin operations.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Profile document kept alongside each account in the users collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub name: String,
    pub email: Email,
    pub role: UserRole,
    /// Initials avatar URL.
    pub avatar: String,
}

/// Profile attributes as stored in the users collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub avatar: String,
}

impl From<Document<NewProfile>> for UserProfile {
    fn from(doc: Document<NewProfile>) -> Self {
        let attrs = doc.data;
        Self {
            id: ProfileId::new(doc.id),
            user_id: attrs.user_id,
            name: attrs.name,
            email: attrs.email,
            role: attrs.role,
            avatar: attrs.avatar,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_role_defaults_to_user() {
        let json = r#"{
            "$id": "pr1",
            "$createdAt": "2024-05-01T10:00:00.000+00:00",
            "$updatedAt": "2024-05-01T10:00:00.000+00:00",
            "userId": "u1",
            "email": "ada@example.com"
        }"#;

        let doc: Document<NewProfile> = serde_json::from_str(json).unwrap();
        let profile = UserProfile::from(doc);
        assert_eq!(profile.role, UserRole::User);
        assert_eq!(profile.id.as_str(), "pr1");
    }

    #[test]
    fn test_is_admin() {
        let mut user = User {
            id: UserId::new("u1"),
            email: Email::parse("ada@example.com").unwrap(),
            name: "Ada".to_string(),
            role: UserRole::User,
        };
        assert!(!user.is_admin());
        user.role = UserRole::Admin;
        assert!(user.is_admin());
    }
}
