//! Optimistic concurrency expectations for versioned keys.

/// Optimistic concurrency expectation for a stored key.
///
/// A key's version counts every modification recorded for it (deletes included);
/// `0` means the key has never been written.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip version checking (blind writes, migrations, etc.).
    Any,
    /// Require the key to be at an exact version.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }
}
