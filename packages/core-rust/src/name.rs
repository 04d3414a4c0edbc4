use std::borrow::Borrow;
use std::fmt;

/// Maximum length in bytes of a service name.
pub const MAX_SERVICE_NAME_LENGTH: usize = 128;

/// Errors from validating a [`ServiceName`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceNameError {
    #[error("service name is empty")]
    Empty,
    #[error("service name is {len} bytes, limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Validated service identifier: non-empty, at most
/// [`MAX_SERVICE_NAME_LENGTH`] bytes.
///
/// Implements `Borrow<str>` so maps keyed by `ServiceName` can be queried
/// with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(String);

impl ServiceName {
    /// Validates and wraps `name`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceNameError::Empty` for an empty name and
    /// `ServiceNameError::TooLong` when the name exceeds the byte limit.
    pub fn new(name: impl Into<String>) -> Result<Self, ServiceNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ServiceNameError::Empty);
        }
        if name.len() > MAX_SERVICE_NAME_LENGTH {
            return Err(ServiceNameError::TooLong {
                len: name.len(),
                max: MAX_SERVICE_NAME_LENGTH,
            });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ServiceName {
    type Error = ServiceNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ServiceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn empty_name_rejected() {
        assert_eq!(ServiceName::new(""), Err(ServiceNameError::Empty));
    }

    #[test]
    fn name_at_limit_accepted() {
        let name = "a".repeat(MAX_SERVICE_NAME_LENGTH);
        assert_eq!(ServiceName::new(name.clone()).unwrap().as_str(), name);
    }

    #[test]
    fn name_over_limit_rejected() {
        let err = ServiceName::new("a".repeat(MAX_SERVICE_NAME_LENGTH + 1)).unwrap_err();
        assert_eq!(
            err,
            ServiceNameError::TooLong {
                len: 129,
                max: 128
            }
        );
    }

    #[test]
    fn limit_counts_bytes_not_chars() {
        // 'é' is two bytes in UTF-8.
        let name = "é".repeat(65);
        assert!(matches!(
            ServiceName::new(name),
            Err(ServiceNameError::TooLong { len: 130, .. })
        ));
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(ServiceName::new("info").unwrap(), 1);
        assert_eq!(map.get("info"), Some(&1));
        assert_eq!(map.get("upload"), None);
    }

    proptest! {
        #[test]
        fn accepts_exactly_the_bounded_non_empty_names(name in "\\PC{0,160}") {
            let result = ServiceName::new(name.clone());
            let valid = !name.is_empty() && name.len() <= MAX_SERVICE_NAME_LENGTH;
            prop_assert_eq!(result.is_ok(), valid);
        }
    }
}
