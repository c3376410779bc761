use serde::{Deserialize, Serialize};

/// Declares a string-backed identifier newtype.
///
/// All identifiers in this system are assigned by the backend (or typed in by a
/// person, in the case of table numbers), so they stay opaque strings rather
/// than being parsed into a narrower type.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the identifier is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Opaque order identifier assigned by the backend on creation.
    ///
    /// Scoped to one customer and one table; the session owns it from order
    /// creation until payment completes.
    OrderRef
);

string_id!(
    /// Identifier of a registered customer.
    CustomerId
);

string_id!(
    /// Identifier of a dish in the menu catalog.
    DishId
);

string_id!(
    /// Physical table number, as printed on the table.
    TableNo
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_ref_preserves_value() {
        let id = OrderRef::new("ORD-0042");
        assert_eq!(id.as_str(), "ORD-0042");
        assert_eq!(id.to_string(), "ORD-0042");
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        assert!(TableNo::new("").is_blank());
        assert!(TableNo::new("   ").is_blank());
        assert!(!TableNo::new("5").is_blank());
    }

    #[test]
    fn identifiers_serialize_as_plain_strings() {
        let id = DishId::from("D1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"D1\"");

        let back: DishId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn customer_id_from_string() {
        let id: CustomerId = String::from("C1").into();
        assert_eq!(id.as_ref(), "C1");
    }
}
