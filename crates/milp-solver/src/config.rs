use crate::error::ConfigError;

/// Order in which the sequential search pops open sub-problems
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchOrder {
    /// Most recently created sub-problem first (stack)
    #[default]
    DepthFirst,
    /// Sub-problems in creation order (queue)
    BreadthFirst,
}

/// Settings shared by the sequential and parallel branch-and-bound searches
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Largest fractional part `x - floor(x)` still accepted as integral
    pub tolerance: f64,
    /// Frontier discipline of the sequential search
    pub order: SearchOrder,
    /// Skip sub-problems whose constraint set was already explored
    pub deduplicate: bool,
    /// Log every node at debug level
    pub debug: bool,
    /// Worker threads of the parallel search, 0 for one per CPU
    pub workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            order: SearchOrder::DepthFirst,
            deduplicate: true,
            debug: false,
            workers: 0,
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_order(mut self, order: SearchOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_deduplication(mut self, enabled: bool) -> Self {
        self.deduplicate = enabled;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }

    /// Effective number of worker threads
    pub fn worker_count(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.order, SearchOrder::DepthFirst);
        assert!(config.deduplicate);
        assert!(!config.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tolerance_validation() {
        assert_eq!(
            SearchConfig::new().with_tolerance(-0.0001).validate(),
            Err(ConfigError::InvalidTolerance(-0.0001))
        );
        assert!(SearchConfig::new().with_tolerance(f64::NAN).validate().is_err());
        assert!(SearchConfig::new().with_tolerance(0.0).validate().is_ok());
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(SearchConfig::new().with_workers(3).worker_count(), 3);
        assert!(SearchConfig::new().worker_count() >= 1);
    }
}
