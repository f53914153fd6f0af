//! Newtype IDs for type-safe document references.
//!
//! The backend identifies every account and document with a short string.
//! Use the `define_id!` macro to create wrappers that prevent accidentally
//! passing an order ID where a product ID is expected.

/// Maximum length of a backend document ID.
pub const MAX_ID_LENGTH: usize = 36;

/// Macro to define a type-safe, string-backed ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `unique()` for client-generated IDs the backend accepts
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use layercraft_core::define_id;
/// define_id!(CartLineId);
/// define_id!(ShipmentId);
///
/// let line = CartLineId::new("line-1");
/// assert_eq!(line.as_str(), "line-1");
///
/// // These are different types, so this won't compile:
/// // let _: ShipmentId = line;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing ID.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh ID (32 lowercase hex characters).
            #[must_use]
            pub fn unique() -> Self {
                Self($crate::types::id::unique_id())
            }

            /// Borrow the underlying string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the underlying string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generate an ID the backend accepts for new accounts and documents.
///
/// Backend IDs are limited to [`MAX_ID_LENGTH`] characters from `a-z`,
/// `0-9`, `.`, `-` and `_`, and may not start with a special character.
#[must_use]
pub fn unique_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// Account and document IDs
define_id!(UserId);
define_id!(ProfileId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(CustomRequestId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_ids_fit_backend_rules() {
        let id = ProductId::unique();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().len() <= MAX_ID_LENGTH);
        assert!(
            id.as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_unique_ids_differ() {
        assert_ne!(OrderId::unique(), OrderId::unique());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = CustomRequestId::new("req_1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"req_1\"");

        let parsed: CustomRequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_display_and_conversions() {
        let id = UserId::from("64f0c0ffee");
        assert_eq!(id.to_string(), "64f0c0ffee");
        assert_eq!(id.clone().into_inner(), "64f0c0ffee".to_string());
        assert_eq!(UserId::from("64f0c0ffee".to_string()), id);
    }
}
