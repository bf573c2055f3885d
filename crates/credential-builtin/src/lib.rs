#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Nebula Credential Builtin
//!
//! The closed set of OAuth2 providers this deployment authorizes against —
//! `google_calendar`, `github`, `slack` — and the registry that resolves
//! each one's [`nebula_credential::oauth2::ProviderOAuth2Config`] from
//! startup configuration.
//!
//! Nothing here is extensible at runtime: adding a provider is a code
//! change ([`WellKnownProvider`] gets a new variant), matching the spec's
//! framing of the provider set as closed rather than plugin-driven.

mod provider;
mod registry;

pub use provider::WellKnownProvider;
pub use registry::{BuiltinConfigError, ProviderRegistry, RawProviderConfig};
