//! The [`Retryable`] trait, implementable via `#[derive(Retryable)]`
//! (feature `derive`) for enums that classify their own variants.

/// A type that knows whether retrying the operation that produced it is
/// safe.
///
/// Implemented by hand for most types via [`ErrorKind::is_retryable_by_default`](crate::ErrorKind::is_retryable_by_default),
/// or derived for local error enums with `#[derive(nebula_error::Retryable)]`
/// and a `#[retryable]` attribute on the variants that should report
/// `true`:
///
/// ```ignore
/// #[derive(nebula_error::Retryable)]
/// enum AdapterError {
///     #[retryable]
///     Timeout,
///     BadRequest,
/// }
/// ```
pub trait Retryable {
    /// Whether this value represents a retryable condition.
    fn is_retryable(&self) -> bool;
}
