//! Evaluation configuration.

/// Default ceiling on nested calls (node references, closure applications,
/// definition calls) within one task.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 10_000;

/// Default ceiling on forked LIR tasks running at the same time.
pub const DEFAULT_MAX_TASKS: usize = 512;

/// Knobs shared by every evaluator entry point.
///
/// ```text
/// let config = EvalConfig::new()
///     .with_max_call_depth(500)
///     .with_node_cache(false)
///     .with_max_tasks(64);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    max_call_depth: usize,
    node_cache: bool,
    max_tasks: usize,
}

impl EvalConfig {
    pub fn new() -> Self {
        EvalConfig {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            node_cache: true,
            max_tasks: DEFAULT_MAX_TASKS,
        }
    }

    /// Maximum nesting depth before `RecursionLimitExceeded`.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Whether node results are memoized in the pure layers.
    #[must_use]
    pub fn with_node_cache(mut self, enabled: bool) -> Self {
        self.node_cache = enabled;
        self
    }

    /// Maximum number of forked tasks alive at once. A `fork` beyond it
    /// fails with `TaskSpawnFailed`.
    #[must_use]
    pub fn with_max_tasks(mut self, tasks: usize) -> Self {
        self.max_tasks = tasks;
        self
    }

    #[inline]
    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    #[inline]
    pub fn node_cache(&self) -> bool {
        self.node_cache
    }

    #[inline]
    pub fn max_tasks(&self) -> usize {
        self.max_tasks
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new()
    }
}
