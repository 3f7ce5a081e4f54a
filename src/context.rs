//! Evaluation context for key template functions
//!
//! Holds the CI-provided facts that key functions resolve to. Built once
//! by the CLI layer and passed by reference into the parser; the core
//! never reads the process environment itself.

/// Read-only values available to key functions during evaluation.
///
/// Each value is either present (non-empty) or absent. Empty strings are
/// normalized to absent at construction so a blank CI variable cannot
/// leak an empty substitution into a cache key.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    branch: Option<String>,
    stack_rev: Option<String>,
}

impl EvaluationContext {
    /// Build a context from the raw branch and stack revision values.
    pub fn new(branch: Option<String>, stack_rev: Option<String>) -> Self {
        Self {
            branch: normalize(branch),
            stack_rev: normalize(stack_rev),
        }
    }

    /// Current git branch, if known.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Platform stack revision identifier, if known.
    pub fn stack_rev(&self) -> Option<&str> {
        self.stack_rev.as_deref()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
