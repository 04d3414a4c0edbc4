use std::fmt;

use serde::{Deserialize, Serialize};

/// Format tag carried by post data and responses.
///
/// `Unknown` is the "not yet negotiated" sentinel. A response is only
/// transmittable once a service has replaced it with `Text` or `Binary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum DataFormat {
    /// Not negotiated yet. Never a valid terminal response tag.
    #[default]
    Unknown = 0,
    /// UTF-8 (or at least human-readable) text.
    Text = 1,
    /// Opaque bytes.
    Binary = 2,
}

impl DataFormat {
    /// Returns true for `Text` and `Binary`.
    #[must_use]
    pub fn is_negotiated(self) -> bool {
        !matches!(self, DataFormat::Unknown)
    }

    /// Returns the lowercase name of this format.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DataFormat::Unknown => "unknown",
            DataFormat::Text => "text",
            DataFormat::Binary => "binary",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
