//! Contract identifiers.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Opaque label naming a prompt (delivery month), e.g. `"Cash"` or `"3M"`.
///
/// Labels are compared exactly; the loader is responsible for making both
/// dates spell a contract the same way.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    /// Create a contract id from any string-like label.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against the label.
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl From<&str> for ContractId {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl AsRef<str> for ContractId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
