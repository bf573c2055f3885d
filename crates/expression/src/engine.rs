//! The top-level entry point: parse (with caching) and evaluate.

use crate::builtins::BuiltinRegistry;
use crate::context::EvaluationContext;
use crate::core::ast::Expr;
use crate::core::error::ExpressionResult;
use crate::eval::Evaluator;
#[cfg(feature = "cache")]
use moka::sync::Cache;
use serde_json::Value;
use std::sync::Arc;

#[cfg(feature = "cache")]
const AST_CACHE_CAPACITY: u64 = 2_000;

/// Parses and evaluates expression source text against an
/// [`EvaluationContext`].
///
/// Parsed ASTs are cached by source string (behind the `cache` feature)
/// since the same conversion-function or parameter-template source is
/// evaluated repeatedly across workflow executions.
pub struct ExpressionEngine {
    evaluator: Evaluator,
    #[cfg(feature = "cache")]
    ast_cache: Cache<Arc<str>, Arc<Expr>>,
}

impl ExpressionEngine {
    /// Build an engine with the standard builtin registry.
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(Arc::new(BuiltinRegistry::new())),
            #[cfg(feature = "cache")]
            ast_cache: Cache::new(AST_CACHE_CAPACITY),
        }
    }

    /// Parse `source` (using the cache, if enabled) and evaluate it
    /// against `context`.
    pub fn evaluate(&self, source: &str, context: &EvaluationContext) -> ExpressionResult<Value> {
        let expr = self.parse_cached(source)?;
        self.evaluator.eval(&expr, context)
    }

    #[cfg(feature = "cache")]
    fn parse_cached(&self, source: &str) -> ExpressionResult<Arc<Expr>> {
        if let Some(cached) = self.ast_cache.get(source) {
            return Ok(cached);
        }
        let expr = Arc::new(crate::parser::parse(source)?);
        self.ast_cache.insert(Arc::from(source), Arc::clone(&expr));
        Ok(expr)
    }

    #[cfg(not(feature = "cache"))]
    fn parse_cached(&self, source: &str) -> ExpressionResult<Arc<Expr>> {
        Ok(Arc::new(crate::parser::parse(source)?))
    }
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new()
    }
}
