//! Input limits and parsing policy for grid queries.
//!
//! `GridLimits` is plain serde data so hosts can pull it out of their
//! configuration tree (e.g. a `figment` profile) next to other module config.

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridLimits {
    /// Upper bound for `page_size` in page-number fallback pagination (default: 1000)
    pub max_page_size: u64,
    /// Page size used when `page_size` is absent or unparsable (default: 100)
    pub default_page_size: u64,
    /// Maximum length of the raw `filter` parameter in bytes (default: 8192)
    pub max_filter_length: usize,
    /// Maximum number of sort keys (default: 10)
    pub max_sort_fields: usize,
    /// Reject malformed parameters instead of ignoring them (default: false)
    pub strict: bool,
}

impl Default for GridLimits {
    fn default() -> Self {
        Self {
            max_page_size: 1000,
            default_page_size: 100,
            max_filter_length: 8 * 1024,
            max_sort_fields: 10,
            strict: false,
        }
    }
}

impl GridLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_page_size(mut self, max: u64) -> Self {
        self.max_page_size = max;
        self
    }

    #[must_use]
    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size;
        self
    }

    #[must_use]
    pub fn with_max_filter_length(mut self, max: usize) -> Self {
        self.max_filter_length = max;
        self
    }

    #[must_use]
    pub fn with_max_sort_fields(mut self, max: usize) -> Self {
        self.max_sort_fields = max;
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Validate the raw `filter` parameter length.
    ///
    /// # Errors
    /// Returns `Error::InvalidFilter` if the parameter exceeds `max_filter_length`.
    pub fn validate_filter(&self, raw: &str) -> Result<(), Error> {
        if raw.len() > self.max_filter_length {
            return Err(Error::InvalidFilter(format!(
                "filter exceeds {} bytes",
                self.max_filter_length
            )));
        }
        Ok(())
    }

    /// Resolve the effective page size: default when absent, never zero, capped at the max.
    #[must_use]
    pub fn clamp_page_size(&self, requested: Option<u64>) -> u64 {
        let size = match requested {
            Some(0) | None => self.default_page_size,
            Some(n) => n,
        };
        size.clamp(1, self.max_page_size.max(1))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let limits = GridLimits::default();
        assert_eq!(limits.max_page_size, 1000);
        assert_eq!(limits.default_page_size, 100);
        assert!(!limits.strict);
    }

    #[test]
    fn page_size_is_clamped() {
        let limits = GridLimits::new().with_max_page_size(50).with_default_page_size(20);
        assert_eq!(limits.clamp_page_size(None), 20);
        assert_eq!(limits.clamp_page_size(Some(0)), 20);
        assert_eq!(limits.clamp_page_size(Some(10)), 10);
        assert_eq!(limits.clamp_page_size(Some(5000)), 50);
    }

    #[test]
    fn long_filter_is_rejected() {
        let limits = GridLimits::new().with_max_filter_length(4);
        assert!(limits.validate_filter("{}").is_ok());
        assert!(matches!(
            limits.validate_filter("{\"a\":1}"),
            Err(Error::InvalidFilter(_))
        ));
    }
}
