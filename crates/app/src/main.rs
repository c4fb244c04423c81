//! Tokenbridge - Main Entry Point
//!
//! Runs one login attempt: obtains a provider access token, exchanges it
//! at the verification endpoint and signs in to the identity platform.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tokenbridge_application::{CompleteLogin, LoginCallback, PlatformAuth, ProviderLogin};
use tokenbridge_domain::{
    LoginError, OAuthEchoHeaders, PlatformSession, ProviderCredential, ProviderFailure,
    ProviderKind, Settings,
};
use tokenbridge_infrastructure::{
    IdentityToolkitAuth, InMemoryPlatformAuth, LoginResultSender, ReqwestExchangeClient,
    SettingsLoader, StaticProviderLogin, channel_login,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the provider access token.
const PROVIDER_TOKEN_VAR: &str = "TOKENBRIDGE_PROVIDER_TOKEN";

/// Environment variable holding the provider-assigned user id.
const PROVIDER_USER_ID_VAR: &str = "TOKENBRIDGE_PROVIDER_USER_ID";

/// OAuth Echo header values, for `exchange.mode = "oauth_echo"`.
const ECHO_SERVICE_PROVIDER_VAR: &str = "TOKENBRIDGE_OAUTH_ECHO_SERVICE_PROVIDER";
const ECHO_AUTHORIZATION_VAR: &str = "TOKENBRIDGE_OAUTH_ECHO_AUTHORIZATION";

/// Exit code for a login the user cancelled.
const EXIT_CANCELLED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries the outcome.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "tokenbridge failed to start");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    info!("Starting tokenbridge v{}", env!("CARGO_PKG_VERSION"));

    let settings = SettingsLoader::new()
        .load()
        .context("failed to load settings")?;

    let exchange = Arc::new(
        ReqwestExchangeClient::new(&settings.exchange)
            .context("failed to create exchange client")?,
    );
    let platform = platform(&settings)?;
    let provider = provider(&settings);

    let flow = CompleteLogin::new(provider, exchange, platform);
    let code = match flow.execute_with_callback(&ConsoleCallback).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) if e.is_silent() => ExitCode::from(EXIT_CANCELLED),
        Err(_) => ExitCode::FAILURE,
    };
    Ok(code)
}

fn platform(settings: &Settings) -> anyhow::Result<Arc<dyn PlatformAuth>> {
    if settings.platform.api_key.is_some() {
        let platform = IdentityToolkitAuth::new(&settings.platform, settings.exchange.timeout())
            .context("failed to create identity platform client")?;
        return Ok(Arc::new(platform));
    }

    info!("no platform API key configured, sessions stay in memory");
    Ok(Arc::new(InMemoryPlatformAuth::new()))
}

fn provider(settings: &Settings) -> Arc<dyn ProviderLogin> {
    let kind = settings.provider.kind.clone();
    let extras = CredentialExtras::from_env();

    if let Some(token) = env_value(PROVIDER_TOKEN_VAR) {
        return Arc::new(StaticProviderLogin::new(extras.credential(kind, token)));
    }

    let (login, requests) = channel_login(kind, 1);
    tokio::spawn(answer_from_stdin(requests, extras));
    Arc::new(login)
}

/// Trimmed, non-empty environment variable.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Credential fields that come from the environment rather than the
/// provider login itself.
#[derive(Debug, Clone, Default)]
struct CredentialExtras {
    user_id: Option<String>,
    oauth_echo: Option<OAuthEchoHeaders>,
}

impl CredentialExtras {
    fn from_env() -> Self {
        let oauth_echo = env_value(ECHO_SERVICE_PROVIDER_VAR)
            .zip(env_value(ECHO_AUTHORIZATION_VAR))
            .map(|(service_provider, authorization)| {
                OAuthEchoHeaders::new(service_provider, authorization)
            });

        Self {
            user_id: env_value(PROVIDER_USER_ID_VAR),
            oauth_echo,
        }
    }

    fn credential(&self, kind: ProviderKind, token: String) -> ProviderCredential {
        let mut credential = ProviderCredential::new(kind, token);
        if let Some(user_id) = &self.user_id {
            credential = credential.with_user_id(user_id.clone());
        }
        if let Some(headers) = &self.oauth_echo {
            credential = credential.with_oauth_echo(headers.clone());
        }
        credential
    }
}

/// Answers login requests with lines read from stdin.
///
/// An empty line or end of input cancels the login.
async fn answer_from_stdin(
    mut requests: mpsc::Receiver<LoginResultSender>,
    extras: CredentialExtras,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(request) = requests.recv().await {
        eprint!("{} access token: ", request.kind());
        match lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => {
                let credential = extras.credential(request.kind().clone(), line.trim().to_string());
                request.succeed_with(credential)
            }
            Ok(_) => request.cancel(),
            Err(e) => request.fail(ProviderFailure::new(format!("failed to read stdin: {e}"))),
        };
    }
}

/// Prints the outcome of the attempt.
struct ConsoleCallback;

impl LoginCallback for ConsoleCallback {
    fn on_success(&self, session: &PlatformSession) {
        println!("signed in as {}", session.uid);
        if let Some(name) = &session.display_name {
            println!("display name: {name}");
        }
    }

    fn on_fail(&self, error: &LoginError) {
        if error.is_silent() {
            eprintln!("login cancelled");
        } else {
            eprintln!("login failed ({}): {error}", error.kind());
        }
    }
}
