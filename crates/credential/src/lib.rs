#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Credential
//!
//! Encrypted storage for per-user OAuth2 credentials, the
//! authorization-code flow that populates it, and the concurrency
//! primitives that keep token refresh correct under load:
//!
//! - [`crypto`] — keyed AEAD encryption of stored secrets, and the PKCE /
//!   state-token randomness the flow needs.
//! - [`store`] — [`store::CredentialStore`], the `(user, provider,
//!   integration) →` encrypted row mapping, with per-row serialized
//!   refresh.
//! - [`oauth2`] — [`oauth2::OAuth2Flow`] (begin/complete authorization),
//!   [`oauth2::OAuth2StateStore`] (short-TTL CSRF tokens), and
//!   [`oauth2::RefreshCoordinator`] (in-process single-flight refresh).
//! - [`audit`] — the audit trail every store/refresh/use/revoke emits.
//!
//! No plaintext secret ever appears in a log line or error message:
//! [`nebula_schema::SecretString`] enforces that at the type level, and
//! every error variant here carries only reference ids and sanitized
//! messages.

pub mod audit;
pub mod crypto;
pub mod error;
pub mod oauth2;
pub mod store;

pub use audit::{AuditAction, AuditContext, AuditOutcome, AuditRecord, AuditSink, TracingAuditSink};
pub use crypto::{EncryptedData, EncryptionKey};
pub use error::CredentialError;
pub use store::{
    CredentialStore, CredentialSummary, InMemoryCredentialStore, NewOAuth2Credential,
    OAuth2Credential, RefreshedTokens, TokenRefresher,
};
