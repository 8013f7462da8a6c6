//! # Cache Geometry

use crate::TopologyError;

/// Upper bound on the number of cache levels a platform may describe.
pub const MAX_CACHE_LEVELS: usize = 4;

/// Line size of every cache level on the platform, innermost (L1) first.
///
/// Integrated and external caches may use different line sizes. Anything that
/// must not share a line with a neighbor (per-core mailboxes in particular)
/// has to be spaced by [`largest_line_size`](Self::largest_line_size), not by
/// the L1 line size.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheGeometry {
    line_sizes: [u64; MAX_CACHE_LEVELS],
    levels: usize,
}

impl CacheGeometry {
    /// Describe the caches by their line sizes, L1 first.
    ///
    /// Every size must be a power of two and at least one level must be given.
    pub fn from_line_sizes(sizes: &[u64]) -> Result<Self, TopologyError> {
        if sizes.is_empty() {
            return Err(TopologyError::NoCacheLevels);
        }
        if sizes.len() > MAX_CACHE_LEVELS {
            return Err(TopologyError::TooManyCacheLevels(sizes.len()));
        }

        let mut line_sizes = [0; MAX_CACHE_LEVELS];
        for (index, &size) in sizes.iter().enumerate() {
            if !size.is_power_of_two() {
                return Err(TopologyError::CacheLineNotPowerOfTwo {
                    level: index + 1,
                    size,
                });
            }
            line_sizes[index] = size;
        }

        Ok(Self {
            line_sizes,
            levels: sizes.len(),
        })
    }

    #[must_use]
    pub const fn levels(&self) -> usize {
        self.levels
    }

    /// Line size of cache level `level` (1-based, `1` = L1).
    #[must_use]
    pub fn line_size(&self, level: usize) -> Option<u64> {
        if level == 0 || level > self.levels {
            return None;
        }
        Some(self.line_sizes[level - 1])
    }

    /// The biggest line size over all levels.
    #[must_use]
    pub fn largest_line_size(&self) -> u64 {
        self.iter().max().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.line_sizes[..self.levels].iter().copied()
    }
}
