use clap::Parser;
use oauth2_cli::{
    CallbackServer, Config, DEFAULTS_PATH, FileConfig, FlowState, OAuthClient, OAuthClientConfig,
    OAuthError, Overrides, RedirectTarget,
};

#[derive(Debug, Parser)]
#[command(
    name = "oauth2-cli",
    about = "Drive an interactive OAuth2 / OIDC authorization-code flow and print the token as JSON."
)]
struct Cli {
    /// Listening interface
    #[arg(long)]
    interface: Option<String>,

    /// Listening port
    #[arg(long)]
    port: Option<u16>,

    /// Callback path or full redirect URL
    #[arg(long)]
    callback: Option<String>,

    /// Client ID
    #[arg(long)]
    id: Option<String>,

    /// Client secret
    #[arg(long)]
    secret: Option<String>,

    /// Provider authorization URL
    #[arg(long)]
    auth: Option<String>,

    /// Provider token URL
    #[arg(long)]
    token: Option<String>,

    /// Query parameter to read the authorization code from
    #[arg(long = "code")]
    code_param: Option<String>,

    /// OAuth scope to authorize (repeatable; values are forwarded verbatim)
    #[arg(long)]
    scope: Vec<String>,

    /// Include and then validate the OIDC nonce parameter
    #[arg(long)]
    oidc_nonce: bool,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn into_overrides(self) -> Overrides {
        Overrides {
            interface: self.interface,
            port: self.port,
            callback: self.callback,
            client_id: self.id,
            client_secret: self.secret,
            auth_url: self.auth,
            token_url: self.token,
            code_param: self.code_param,
            scopes: self.scope,
            oidc_nonce: self.oidc_nonce.then_some(true),
            verbose: self.verbose.then_some(true),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), OAuthError> {
    let cli = Cli::parse();
    let file = FileConfig::load(DEFAULTS_PATH)?;
    let config = Config::resolve(file, cli.into_overrides())?;

    init_logger(config.verbose);

    let target = RedirectTarget::resolve(&config.callback, &config.interface, config.port)?;
    let flow = FlowState::generate(config.oidc_nonce)?;
    let client = OAuthClient::new(OAuthClientConfig::from_config(
        &config,
        target.redirect_uri(),
    ))?;

    let visit_url = client.authorization_url(&flow)?;
    log::info!("Visit this URL in your browser:\n{visit_url}\n");

    let server = CallbackServer::new(
        &config.interface,
        config.port,
        target.path(),
        &config.code_param,
        config.verbose,
    );
    let token = server.run(client, flow).await?;

    let output =
        serde_json::to_string_pretty(&token).map_err(|err| OAuthError::InvalidResponse {
            message: err.to_string(),
            body: String::new(),
        })?;
    println!("{output}");
    Ok(())
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_builder()
        .filter_level(level)
        .init();
}
