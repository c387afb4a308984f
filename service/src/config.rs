use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;
use std::str::FromStr;

/// Insecure fallback used to sign session cookies when `SESSION_SECRET_KEY` is not set.
pub const DEFAULT_SESSION_SECRET_KEY: &str = "chave_super_secreta";

/// TikTok's consent page that the login route redirects to.
pub const DEFAULT_TIKTOK_AUTH_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";

/// Base URL of the TikTok Open API (token, user info and video list endpoints).
pub const DEFAULT_TIKTOK_API_BASE_URL: &str = "https://open.tiktokapis.com/v2";

/// File issued by TikTok to prove ownership of the redirect domain.
pub const DEFAULT_VERIFICATION_FILE: &str = "tiktokwF4NstLzn3GvEEgMtbCnpG9tPV9RAotO.txt";

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The client key of the TikTok developer application.
    #[arg(long, env = "TT_CLIENT_KEY")]
    tt_client_key: Option<String>,

    /// The client secret of the TikTok developer application.
    #[arg(long, env = "TT_CLIENT_SECRET")]
    tt_client_secret: Option<String>,

    /// The OAuth redirect URI registered with TikTok. Must point at /auth/tiktok/callback.
    #[arg(long, env = "REDIRECT_URI")]
    redirect_uri: Option<String>,

    /// The secret used to sign the session cookie.
    #[arg(long, env, default_value = DEFAULT_SESSION_SECRET_KEY)]
    session_secret_key: String,

    /// Session expiry duration in seconds of inactivity (default: 24 hours = 86400 seconds)
    #[arg(long, env, default_value_t = 86400)]
    pub session_expiry_seconds: u64,

    /// The TikTok authorization (consent) endpoint.
    #[arg(long, env, default_value = DEFAULT_TIKTOK_AUTH_URL)]
    tiktok_auth_url: String,

    /// The base URL of the TikTok Open API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_TIKTOK_API_BASE_URL)]
    tiktok_api_base_url: String,

    /// Path of the TikTok domain verification file served at /tiktok-verification.html
    #[arg(long, env, default_value = DEFAULT_VERIFICATION_FILE)]
    verification_file: String,

    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn tt_client_key(&self) -> Option<String> {
        self.tt_client_key.clone()
    }

    pub fn tt_client_secret(&self) -> Option<String> {
        self.tt_client_secret.clone()
    }

    pub fn redirect_uri(&self) -> Option<String> {
        self.redirect_uri.clone()
    }

    pub fn session_secret_key(&self) -> &str {
        &self.session_secret_key
    }

    /// True when the cookie signing secret is still the built-in fallback.
    pub fn uses_default_session_secret(&self) -> bool {
        self.session_secret_key == DEFAULT_SESSION_SECRET_KEY
    }

    pub fn tiktok_auth_url(&self) -> &str {
        &self.tiktok_auth_url
    }

    /// Returns the TikTok Open API base URL without a trailing slash.
    pub fn tiktok_api_base_url(&self) -> &str {
        self.tiktok_api_base_url.trim_end_matches('/')
    }

    pub fn verification_file(&self) -> &str {
        &self.verification_file
    }

    pub fn interface(&self) -> &str {
        self.interface.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
