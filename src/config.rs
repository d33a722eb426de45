//! Table sizing and growth policy.

use crate::error::TableError;

/// Default number of buckets for [`crate::ChainedTable::new`].
pub const DEFAULT_BUCKETS: usize = 16;
/// Grow once `len >= LOAD_FACTOR * bucket_count`.
pub const DEFAULT_LOAD_FACTOR: usize = 3;
/// A resize multiplies the bucket count by this.
pub const DEFAULT_GROWTH_FACTOR: usize = 9;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    pub initial_buckets: usize,
    pub load_factor: usize,
    pub growth_factor: usize,
    /// Upper bound on the bucket count. Construction above it fails; a
    /// resize that would cross it is skipped.
    pub max_buckets: Option<usize>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKETS,
            load_factor: DEFAULT_LOAD_FACTOR,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_buckets: None,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub fn with_load_factor(mut self, load_factor: usize) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    pub fn with_max_buckets(mut self, max_buckets: usize) -> Self {
        self.max_buckets = Some(max_buckets);
        self
    }

    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_buckets == 0 {
            return Err(TableError::ZeroBuckets);
        }
        if self.load_factor == 0 {
            return Err(TableError::InvalidConfig {
                reason: "load factor must be at least 1",
            });
        }
        if self.growth_factor < 2 {
            return Err(TableError::InvalidConfig {
                reason: "growth factor must be at least 2",
            });
        }
        if let Some(limit) = self.max_buckets {
            if self.initial_buckets > limit {
                return Err(TableError::CapacityExceeded {
                    requested: self.initial_buckets,
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Element count at which a table of `buckets` buckets grows.
    pub(crate) fn threshold(&self, buckets: usize) -> usize {
        self.load_factor.saturating_mul(buckets)
    }

    /// Bucket count after growing from `buckets`, or why growth is impossible.
    pub(crate) fn grown(&self, buckets: usize) -> Result<usize, TableError> {
        let limit = self.max_buckets.unwrap_or(usize::MAX);
        match buckets.checked_mul(self.growth_factor) {
            Some(next) if next <= limit => Ok(next),
            Some(next) => Err(TableError::CapacityExceeded {
                requested: next,
                limit,
            }),
            None => Err(TableError::CapacityExceeded {
                requested: usize::MAX,
                limit,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = TableConfig::default();
        assert_eq!(c.initial_buckets, 16);
        assert_eq!(c.load_factor, 3);
        assert_eq!(c.growth_factor, 9);
        assert_eq!(c.max_buckets, None);
        assert!(c.validate().is_ok());
        assert_eq!(c.threshold(4), 12);
        assert_eq!(c.grown(4).unwrap(), 36);
    }

    #[test]
    fn validation_rejects_bad_values() {
        assert_eq!(
            TableConfig::new().with_initial_buckets(0).validate(),
            Err(TableError::ZeroBuckets)
        );
        assert!(matches!(
            TableConfig::new().with_load_factor(0).validate(),
            Err(TableError::InvalidConfig { .. })
        ));
        assert!(matches!(
            TableConfig::new().with_growth_factor(1).validate(),
            Err(TableError::InvalidConfig { .. })
        ));
        assert_eq!(
            TableConfig::new()
                .with_initial_buckets(8)
                .with_max_buckets(4)
                .validate(),
            Err(TableError::CapacityExceeded {
                requested: 8,
                limit: 4
            })
        );
    }

    #[test]
    fn growth_respects_limit_and_overflow() {
        let c = TableConfig::new().with_max_buckets(40);
        assert_eq!(c.grown(4), Ok(36));
        assert_eq!(
            c.grown(36),
            Err(TableError::CapacityExceeded {
                requested: 324,
                limit: 40
            })
        );
        assert!(TableConfig::new().grown(usize::MAX / 2).is_err());
    }
}
