use core::fmt;

/// The error returned by [`HashMap::at`] when the requested key is absent.
///
/// [`HashMap::at`]: crate::HashMap::at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFound;

impl fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("key is not contained in the hash map")
    }
}

impl core::error::Error for KeyNotFound {}
