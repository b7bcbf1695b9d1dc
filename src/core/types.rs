//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`LibraryId`] - Index of a library in the compiler model
//! - [`NodeId`] - Index of a compiler-model node
//! - [`FacadeId`] - Identity of a facade object within one session
//! - [`ViewGroupId`] - Validated view-group identifier for navigation locks
//! - [`VersionNumber`] - `major.minor.patch` library version
//! - [`UtcTimestamp`] - RFC3339 timestamp
//! - [`Fingerprint`] - Model state hash used to detect mutation
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use dexedit::core::types::{VersionNumber, ViewGroupId};
//!
//! let version = VersionNumber::parse("1.2.0").unwrap();
//! assert_eq!(version.minor, 2);
//! assert!(version.is_minor());
//!
//! assert!(ViewGroupId::new("members").is_ok());
//! assert!(ViewGroupId::new("").is_err());
//! assert!(VersionNumber::parse("1.x").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid version number: {0}")]
    InvalidVersion(String),

    #[error("invalid view group id: {0}")]
    InvalidViewGroup(String),
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw arena index.
            pub const fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// The raw arena index.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a library in the compiler model.
    LibraryId,
    "lib#"
);

arena_id!(
    /// Index of a node in the compiler model.
    ///
    /// Node ids are stable for the lifetime of the model; detached nodes keep
    /// their id but are no longer reachable from their former owner.
    NodeId,
    "node#"
);

arena_id!(
    /// Identity of a facade object.
    ///
    /// Two lookups of the same compiler-model node always yield the same
    /// `FacadeId`, so equality on ids is referential identity on facades.
    FacadeId,
    "facade#"
);

/// A validated view-group identifier.
///
/// View groups scope which panels share a navigation-lock state. Ids must be
/// non-empty and consist of ASCII alphanumerics, `-`, `_` or `.`.
///
/// # Example
///
/// ```
/// use dexedit::core::types::ViewGroupId;
///
/// let group = ViewGroupId::new("member-tree").unwrap();
/// assert_eq!(group.as_str(), "member-tree");
/// assert!(ViewGroupId::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewGroupId(String);

impl ViewGroupId {
    /// Create a new validated view-group id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidViewGroup` if the id is empty or contains
    /// characters outside `[A-Za-z0-9._-]`.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::InvalidViewGroup(
                "view group id cannot be empty".into(),
            ));
        }
        if let Some(c) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(TypeError::InvalidViewGroup(format!(
                "view group id cannot contain '{c}'"
            )));
        }
        Ok(Self(id))
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ViewGroupId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ViewGroupId> for String {
    fn from(id: ViewGroupId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ViewGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A library version number.
///
/// Libraries in the same chain share a major version; the minor and patch
/// numbers order them within the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionNumber {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionNumber {
    /// Create a version number from its parts.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse `major[.minor[.patch]]`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidVersion` if a component is missing or not
    /// a non-negative integer, or if there are more than three components.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(TypeError::InvalidVersion(s.to_string()));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| TypeError::InvalidVersion(s.to_string()))?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }

    /// True for any version that is not the first of its major chain.
    pub fn is_minor(&self) -> bool {
        self.minor > 0 || self.patch > 0
    }
}

impl TryFrom<String> for VersionNumber {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<VersionNumber> for String {
    fn from(v: VersionNumber) -> Self {
        v.to_string()
    }
}

impl std::fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A UTC timestamp, serialized as RFC3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Get the underlying chrono DateTime.
    pub fn as_datetime(&self) -> &chrono::DateTime<chrono::Utc> {
        &self.0
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// A hash of model state.
///
/// Used to prove that a rejected action left the model untouched, and by
/// callers that want a cheap "did anything change" check.
///
/// # Example
///
/// ```
/// use dexedit::core::types::Fingerprint;
///
/// let a = Fingerprint::compute(["node#1 Profile", "node#2 name"]);
/// let b = Fingerprint::compute(["node#2 name", "node#1 Profile"]);
/// assert_eq!(a, b);
/// assert_eq!(a.as_str().len(), 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute a fingerprint from a set of state lines.
    ///
    /// The lines are sorted before hashing so the result is independent of
    /// iteration order.
    pub fn compute<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<S> = lines.into_iter().collect();
        sorted.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));

        let mut hasher = Sha256::new();
        for line in sorted {
            hasher.update(line.as_ref().as_bytes());
            hasher.update(b"\n");
        }

        Self(hex::encode(hasher.finalize()))
    }

    /// Get the fingerprint as a hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod version_number {
        use super::*;

        #[test]
        fn parses_full_and_short_forms() {
            assert_eq!(VersionNumber::parse("1.2.3"), Ok(VersionNumber::new(1, 2, 3)));
            assert_eq!(VersionNumber::parse("2"), Ok(VersionNumber::new(2, 0, 0)));
            assert_eq!(VersionNumber::parse("0.4"), Ok(VersionNumber::new(0, 4, 0)));
        }

        #[test]
        fn rejects_garbage() {
            assert!(VersionNumber::parse("").is_err());
            assert!(VersionNumber::parse("1.2.3.4").is_err());
            assert!(VersionNumber::parse("1.-2").is_err());
            assert!(VersionNumber::parse("v1").is_err());
        }

        #[test]
        fn ordering_follows_components() {
            let a = VersionNumber::new(1, 0, 0);
            let b = VersionNumber::new(1, 1, 0);
            let c = VersionNumber::new(1, 1, 2);
            assert!(a < b && b < c);
            assert!(!a.is_minor());
            assert!(b.is_minor());
            assert!(VersionNumber::new(1, 0, 1).is_minor());
        }

        #[test]
        fn serde_uses_dotted_string() {
            let v = VersionNumber::new(3, 1, 0);
            let json = serde_json::to_string(&v).unwrap();
            assert_eq!(json, "\"3.1.0\"");
            let back: VersionNumber = serde_json::from_str(&json).unwrap();
            assert_eq!(back, v);
        }
    }

    mod view_group {
        use super::*;

        #[test]
        fn accepts_simple_ids() {
            assert!(ViewGroupId::new("main").is_ok());
            assert!(ViewGroupId::new("left_pane.2").is_ok());
        }

        #[test]
        fn rejects_invalid_ids() {
            assert!(ViewGroupId::new("").is_err());
            assert!(ViewGroupId::new("a/b").is_err());
            assert!(serde_json::from_str::<ViewGroupId>("\"a b\"").is_err());
        }
    }

    mod ids {
        use super::*;

        #[test]
        fn display_has_prefix() {
            assert_eq!(NodeId::from_index(3).to_string(), "node#3");
            assert_eq!(FacadeId::from_index(0).to_string(), "facade#0");
            assert_eq!(LibraryId::from_index(7).index(), 7);
        }
    }

    mod fingerprint {
        use super::*;

        #[test]
        fn changes_with_content() {
            let a = Fingerprint::compute(["x"]);
            let b = Fingerprint::compute(["y"]);
            assert_ne!(a, b);
        }

        #[test]
        fn empty_input_is_stable() {
            let empty: [&str; 0] = [];
            assert_eq!(Fingerprint::compute(empty), Fingerprint::compute(empty));
        }
    }
}
