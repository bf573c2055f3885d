//! `nebula credential ...`: OAuth2 authorization and the credential
//! inventory.

use anyhow::Result;

use crate::client::GatewayClient;

#[derive(clap::Subcommand)]
pub enum CredentialCommand {
    /// Print the provider's consent-screen URL for the calling user to
    /// open in a browser. The CLI never holds the authorization code or
    /// the resulting tokens — the gateway does, once the provider
    /// redirects back to `redirect_uri`.
    Authorize {
        /// Well-known provider id (`google_calendar`, `github`, `slack`).
        provider: String,
        /// Where the provider should redirect after consent.
        #[arg(long)]
        redirect_uri: String,
        /// Comma-separated scope override.
        #[arg(long)]
        scopes: Option<String>,
    },
    /// List every credential stored for the calling user.
    List,
    /// Revoke a stored credential.
    Revoke {
        provider: String,
        integration_id: String,
    },
}

pub async fn run(client: &GatewayClient, command: CredentialCommand) -> Result<()> {
    match command {
        CredentialCommand::Authorize { provider, redirect_uri, scopes } => {
            let url = client.authorize_url(&provider, &redirect_uri, scopes.as_deref()).await?;
            println!("open this URL to authorize {provider}:\n{url}");
        }
        CredentialCommand::List => {
            let credentials = client.list_credentials().await?;
            match serde_json::to_string_pretty(&credentials) {
                Ok(text) => println!("{text}"),
                Err(err) => eprintln!("failed to render response as JSON: {err}"),
            }
        }
        CredentialCommand::Revoke { provider, integration_id } => {
            client.revoke_credential(&provider, &integration_id).await?;
            println!("revoked {provider}/{integration_id}");
        }
    }
    Ok(())
}
