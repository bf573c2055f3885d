//! The closed set of providers this deployment knows how to authorize
//! against (spec: "Supported providers (closed set): `google_calendar`,
//! `github`, `slack`").

use nebula_core::ProviderId;

/// One of the three integrations this build supports.
///
/// Adding a fourth provider means adding a variant here, not opening the
/// set up to arbitrary configuration keys — the closed set is a property
/// of the binary, not of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownProvider {
    /// Google Calendar (`google_calendar`).
    GoogleCalendar,
    /// GitHub (`github`).
    GitHub,
    /// Slack (`slack`).
    Slack,
}

impl WellKnownProvider {
    /// All providers this build supports, in a stable order.
    pub const ALL: [WellKnownProvider; 3] =
        [WellKnownProvider::GoogleCalendar, WellKnownProvider::GitHub, WellKnownProvider::Slack];

    /// The canonical lowercase name used in configuration keys and as the
    /// `ProviderId` string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            WellKnownProvider::GoogleCalendar => "google_calendar",
            WellKnownProvider::GitHub => "github",
            WellKnownProvider::Slack => "slack",
        }
    }

    /// Parse a provider name, returning `None` if it isn't in the closed set.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Whether the authorization request should include a PKCE challenge.
    /// Google and GitHub support and recommend PKCE; Slack's authorization
    /// server ignores the parameters, so there's nothing to gain from
    /// sending them.
    #[must_use]
    pub const fn use_pkce(self) -> bool {
        !matches!(self, WellKnownProvider::Slack)
    }

    /// The `ProviderId` this provider is addressed by everywhere else in
    /// the system (credential store keys, audit records, adapter dispatch).
    #[must_use]
    pub fn id(self) -> ProviderId {
        ProviderId::new(self.as_str())
    }
}

impl std::fmt::Display for WellKnownProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_roundtrips_as_str() {
        for p in WellKnownProvider::ALL {
            assert_eq!(WellKnownProvider::parse(p.as_str()), Some(p));
        }
    }

    #[test]
    fn parse_rejects_unknown_provider() {
        assert_eq!(WellKnownProvider::parse("notion"), None);
    }

    #[test]
    fn slack_does_not_use_pkce() {
        assert!(!WellKnownProvider::Slack.use_pkce());
        assert!(WellKnownProvider::GoogleCalendar.use_pkce());
        assert!(WellKnownProvider::GitHub.use_pkce());
    }
}
