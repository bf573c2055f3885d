//! The parsed expression tree.

use serde_json::Value;
use std::sync::Arc;

/// A parsed expression.
///
/// Produced by [`crate::parser::parse`], consumed by
/// [`crate::eval::Evaluator`]. Kept as an owned tree (no lifetime
/// parameter) since parsed expressions are cached by source string across
/// evaluations.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal value (number, string, bool, null) known at parse time.
    Literal(Value),
    /// A `$name` reference: `$input`, `$node`, `$workflow`, `$execution`,
    /// a lambda parameter, or the reduce accumulator `$acc`.
    Variable(Arc<str>),
    /// A bare identifier, evaluated as the string itself (used for object
    /// keys and similar bareword contexts).
    Identifier(Arc<str>),
    /// Arithmetic negation: `-expr`.
    Negate(Box<Expr>),
    /// Logical negation: `!expr`.
    Not(Box<Expr>),
    /// A binary operation.
    Binary {
        /// Left operand.
        left: Box<Expr>,
        /// The operator.
        op: BinaryOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `object.property`.
    PropertyAccess {
        /// The object expression.
        object: Box<Expr>,
        /// The property name.
        property: String,
    },
    /// `object[index]`.
    IndexAccess {
        /// The object or array expression.
        object: Box<Expr>,
        /// The index expression (string key or integer index).
        index: Box<Expr>,
    },
    /// `name(args...)`.
    FunctionCall {
        /// The function name.
        name: Arc<str>,
        /// Argument expressions.
        args: Vec<Expr>,
    },
    /// `value | function(args...)`.
    Pipeline {
        /// The piped-in value expression, prepended as the function's
        /// first argument.
        value: Box<Expr>,
        /// The function name.
        function: Arc<str>,
        /// The remaining argument expressions.
        args: Vec<Expr>,
    },
    /// `condition ? then_expr : else_expr`.
    Conditional {
        /// The condition expression.
        condition: Box<Expr>,
        /// Evaluated when the condition is truthy.
        then_expr: Box<Expr>,
        /// Evaluated when the condition is not truthy.
        else_expr: Box<Expr>,
    },
    /// `param => body`, only valid as an argument to a higher-order
    /// function (`filter`, `map`, `reduce`, `find`, `every`, `some`).
    Lambda {
        /// The parameter name.
        param: Arc<str>,
        /// The lambda body.
        body: Box<Expr>,
    },
    /// An array literal.
    Array(Vec<Expr>),
    /// An object literal, in insertion order.
    Object(Vec<(String, Expr)>),
}

/// Binary operators, ordered here from lowest to highest precedence for
/// reference (the parser encodes precedence directly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `=~`, regex match
    RegexMatch,
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `**`
    Power,
}
