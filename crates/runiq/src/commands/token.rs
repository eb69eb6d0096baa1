//! Token command - exchanges a Strava authorization code for an access token.

use anyhow::Result;
use clap::Args;

use runiq_config::StravaSection;
use runiq_oauth::{TokenExchangeConfig, TokenOutcome};

use super::Context;

/// Arguments for the token command.
///
/// Values are sent as given; missing ones are sent empty and the token
/// endpoint rejects them.
#[derive(Args, Debug, Default)]
pub struct TokenArgs {
    /// Strava application client ID
    #[arg(long, env = "STRAVA_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Strava application client secret
    #[arg(long, env = "STRAVA_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Authorization code from the OAuth redirect
    #[arg(long, env = "STRAVA_CODE")]
    pub code: Option<String>,

    /// Token endpoint URL (overrides config)
    #[arg(long)]
    pub token_url: Option<String>,
}

/// Run the token command.
///
/// A rejection from the token endpoint is printed, not returned as an error.
pub async fn run(args: TokenArgs, ctx: &Context) -> Result<()> {
    let loaded = ctx.load_config()?;
    let section = loaded.config.strava.unwrap_or_default();
    let code = args.code.clone().unwrap_or_default();
    let config = build_config(args, section);

    let outcome = runiq_oauth::exchange_code(&config, &code).await?;
    println!("{}", render_outcome(&outcome));

    Ok(())
}

fn build_config(args: TokenArgs, section: StravaSection) -> TokenExchangeConfig {
    let client_id = args.client_id.or(section.client_id).unwrap_or_default();
    let client_secret = args
        .client_secret
        .or(section.client_secret)
        .unwrap_or_default();

    let config = TokenExchangeConfig::strava(client_id, client_secret);
    match args.token_url.or(section.token_url) {
        Some(url) => config.with_token_url(url),
        None => config,
    }
}

fn render_outcome(outcome: &TokenOutcome) -> String {
    match outcome {
        TokenOutcome::Granted(grant) => {
            let mut lines = vec![
                String::new(),
                "✓ SUCCESS! Your access token:".to_string(),
                grant.access_token().to_string(),
            ];
            if let Some(name) = grant.athlete_name() {
                lines.push(format!("Athlete: {}", name));
            }
            if let Some(expires_at) = grant.expires_at() {
                lines.push(format!("Expires: {}", expires_at.to_rfc3339()));
            }
            lines.push(String::new());
            lines.push("Paste that into index.html".to_string());
            lines.join("\n")
        }
        TokenOutcome::Rejected { status, body } => {
            format!("Error: {} {}", status.as_u16(), body)
        }
    }
}
