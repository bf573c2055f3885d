//! Credential and OAuth2 error taxonomy.

/// Errors raised by the credential store, encryption, and OAuth2 flow.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CredentialError {
    /// No credential exists for the requested `(user, provider, integration)`.
    #[error("no credential for {0}")]
    NotFound(String),

    /// The stored credential failed to decrypt, or a prior refresh marked
    /// it unusable (spec: "a refresh failure marks the credential
    /// `invalid`; subsequent `get` calls raise `CredentialInvalid`").
    #[error("credential for {0} is invalid")]
    Invalid(String),

    /// Encryption or decryption failed (tamper, wrong key, corrupt row).
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// `begin_authorization`/`complete_authorization` received an unknown,
    /// expired, or already-consumed state token.
    #[error("invalid or expired OAuth2 state")]
    InvalidState,

    /// The provider rejected the authorization code or refresh token.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// The in-flight refresh this caller was waiting on was dropped
    /// without producing a result (its leader task panicked or was
    /// canceled).
    #[error("refresh was canceled before completing")]
    RefreshCanceled,

    /// The configured provider is not in the closed provider registry.
    #[error("unknown OAuth2 provider `{0}`")]
    UnknownProvider(String),

    /// The underlying HTTP call to the provider's token endpoint failed.
    #[error("provider request failed: {0}")]
    Provider(String),
}

impl From<CredentialError> for nebula_error::NebulaError {
    fn from(err: CredentialError) -> Self {
        use nebula_error::NebulaError;
        match &err {
            CredentialError::NotFound(_) => NebulaError::credential_missing(err.to_string()),
            CredentialError::Invalid(_) => NebulaError::credential_invalid(err.to_string()),
            CredentialError::InvalidState => NebulaError::invalid_state(err.to_string()),
            CredentialError::AuthorizationFailed(_) | CredentialError::UnknownProvider(_) => {
                NebulaError::authorization_failed(err.to_string())
            }
            CredentialError::RefreshCanceled => NebulaError::internal(err.to_string()),
            CredentialError::Crypto(_) => NebulaError::internal(err.to_string()),
            CredentialError::Provider(_) => NebulaError::upstream_transient(err.to_string()),
        }
    }
}
