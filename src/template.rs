//! Key template parsing and function evaluation
//!
//! A key template is literal text with embedded function calls such as
//! `deps-{{ branch }}`. The function set is closed: templates can only
//! reference the facts carried by [`EvaluationContext`], so resolution
//! is pure and deterministic for a fixed context.

use crate::context::EvaluationContext;
use crate::error::{CachePullError, CachePullResult};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// The built-in key functions.
///
/// Exactly two exist, one per context fact. An unknown name is a parse
/// error rather than an empty substitution: an empty substitution would
/// produce a plausible-looking key that never matches the intended
/// cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFunction {
    /// `{{ branch }}` - current git branch
    Branch,
    /// `{{ stack-rev }}` - platform stack revision
    StackRev,
}

impl KeyFunction {
    /// Look up a function by its template name.
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "branch" => Some(Self::Branch),
            "stack-rev" => Some(Self::StackRev),
            _ => None,
        }
    }

    /// The name used inside templates.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Branch => "branch",
            Self::StackRev => "stack-rev",
        }
    }

    /// Resolve the function against a context.
    ///
    /// Fails with `ValueUnavailable` when the underlying fact is absent.
    pub fn evaluate<'c>(&self, context: &'c EvaluationContext) -> CachePullResult<&'c str> {
        let value = match self {
            Self::Branch => context.branch(),
            Self::StackRev => context.stack_rev(),
        };

        value.ok_or_else(|| CachePullError::ValueUnavailable {
            function: self.name().to_string(),
        })
    }
}

/// Resolves key templates into concrete lookup keys.
pub struct KeyParser<'c> {
    context: &'c EvaluationContext,
}

impl<'c> KeyParser<'c> {
    /// Create a parser bound to an evaluation context.
    pub fn new(context: &'c EvaluationContext) -> Self {
        Self { context }
    }

    /// Resolve a single template into a concrete key.
    ///
    /// Scans left to right: literal runs are copied verbatim, `{{ name }}`
    /// spans are replaced by the function's value. The name inside a span
    /// is trimmed of surrounding whitespace. A `{{` without a matching
    /// `}}`, or a span with a blank name, is malformed.
    pub fn parse(&self, template: &str) -> CachePullResult<String> {
        let mut key = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find(OPEN) {
            let position = template.len() - rest.len() + open;
            key.push_str(&rest[..open]);

            let span = &rest[open + OPEN.len()..];
            let close = span
                .find(CLOSE)
                .ok_or_else(|| CachePullError::MalformedTemplate {
                    template: template.to_string(),
                    position,
                    reason: "unterminated function call".to_string(),
                })?;

            let name = span[..close].trim();
            if name.is_empty() {
                return Err(CachePullError::MalformedTemplate {
                    template: template.to_string(),
                    position,
                    reason: "empty function name".to_string(),
                });
            }

            let function =
                KeyFunction::lookup(name).ok_or_else(|| CachePullError::UnknownFunction {
                    name: name.to_string(),
                    template: template.to_string(),
                })?;

            key.push_str(function.evaluate(self.context)?);
            rest = &span[close + CLOSE.len()..];
        }

        key.push_str(rest);
        Ok(key)
    }
}
