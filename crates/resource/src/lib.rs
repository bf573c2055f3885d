#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Resource
//!
//! The tool adapter layer's concurrency guard: a per-`(user, provider)`
//! semaphore pool capping in-flight upstream calls, independent of how
//! many workflow executions are running concurrently.
//!
//! This is a narrow slice of what a general resource-pooling crate of
//! this name might cover (connection pools, health checks, autoscaling)
//! — none of that applies here, since an "adapter resource" in this
//! system is just a rate-limited HTTP client, not a pooled stateful
//! connection.

mod limiter;
mod permit;

pub use limiter::ConcurrencyLimiter;
pub use permit::ResourcePermit;
