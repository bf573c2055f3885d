//! Authorization-code flow, CSRF state tokens, and single-flight refresh
//! coordination.

mod flow;
#[cfg(feature = "oauth2-http")]
mod http;
mod provider;
mod refresh;
mod state;

pub use flow::{AuthorizationCodeExchanger, OAuth2Flow};
#[cfg(feature = "oauth2-http")]
pub use http::HttpOAuth2Client;
pub use provider::ProviderOAuth2Config;
pub use refresh::RefreshCoordinator;
pub use state::{OAuth2StateRecord, OAuth2StateStore, StateToken};
