use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 32 lowercase-hex characters (a UUIDv4 without dashes), shared by `TaskId` and `MessageId`.
fn new_hex32() -> String {
    Uuid::new_v4().simple().to_string()
}

macro_rules! hex32_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(new_hex32())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

hex32_id!(TaskId);
hex32_id!(MessageId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_id_is_32_lowercase_hex_chars() {
        let id = TaskId::new();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn ids_are_unique() {
        assert_ne!(TaskId::new().as_str(), TaskId::new().as_str());
    }
}
