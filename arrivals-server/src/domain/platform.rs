//! Platform identifiers.

use std::fmt;

/// A physical boarding platform, e.g. `"4"` or `"EAST"`.
///
/// Platform identifiers are case-insensitive. The canonical form trims
/// surrounding whitespace and uppercases, so `" east "` and `"EAST"` are
/// the same platform. Any string is accepted: an identifier that no
/// directory knows about is still a valid key, it simply has no stations.
///
/// # Examples
///
/// ```
/// use arrivals_server::domain::PlatformId;
///
/// let east = PlatformId::new(" east ");
/// assert_eq!(east.as_str(), "EAST");
/// assert_eq!(east, PlatformId::new("EAST"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformId(String);

impl PlatformId {
    /// Create a platform ID from user input, canonicalizing it.
    pub fn new(s: &str) -> Self {
        PlatformId(s.trim().to_uppercase())
    }

    /// Returns the canonical form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlatformId {
    fn from(value: &str) -> Self {
        PlatformId::new(value)
    }
}

impl fmt::Debug for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlatformId({})", self.0)
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
