use std::env;
use std::time::Duration;

use crate::services::access::AdminList;

/// Default MOT History API endpoint for vehicle lookups
const DEFAULT_MOT_BASE_URL: &str = "https://history.mot.api.gov.uk/v1/trade/vehicles";

/// Default OAuth2 token endpoint of the DVSA tenant
const DEFAULT_MOT_TOKEN_URL: &str =
    "https://login.microsoftonline.com/a455b827-244f-4c97-b5b4-ce5d13b4d00c/oauth2/v2.0/token";

/// Default OAuth2 scope for the MOT History API
const DEFAULT_MOT_SCOPE: &str = "https://tapi.dvsa.gov.uk/.default";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub mot: MotConfig,
    pub ves: VesConfig,
    pub database: DatabaseConfig,
    pub admins: AdminList,
    pub group_attribution: UsageAttribution,
}

/// Telegram Bot API configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: String,
    /// Long-poll timeout passed to getUpdates
    pub poll_timeout: Duration,
}

/// MOT History API configuration (API key + OAuth2 client credentials)
#[derive(Debug, Clone)]
pub struct MotConfig {
    pub api_key: String,
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub scope: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// Vehicle Enquiry Service configuration
#[derive(Debug, Clone)]
pub struct VesConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

/// SQLite request log configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_connections: u32,
}

/// Who a lookup made from a group chat is attributed to in the request log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UsageAttribution {
    /// Synthetic `group_chat_<id>` label for the whole chat
    #[default]
    Chat,
    /// The user who sent the registration
    Sender,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            telegram: TelegramConfig::from_env()?,
            mot: MotConfig::from_env()?,
            ves: VesConfig::from_env()?,
            database: DatabaseConfig::from_env(),
            admins: AdminList::parse(&env::var("ADMIN_LIST").unwrap_or_default()),
            group_attribution: UsageAttribution::from_env()?,
        })
    }
}

impl TelegramConfig {
    /// Load Telegram configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            poll_timeout: Duration::from_secs(secs_or("TELEGRAM_POLL_TIMEOUT_SECS", 60)),
        })
    }
}

impl MotConfig {
    /// Load MOT History API configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: required("MOT_API_KEY")?,
            client_id: required("MOT_CLIENT_ID")?,
            client_secret: required("MOT_CLIENT_SECRET")?,
            token_url: env::var("MOT_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_MOT_TOKEN_URL.to_string()),
            scope: env::var("MOT_SCOPE").unwrap_or_else(|_| DEFAULT_MOT_SCOPE.to_string()),
            base_url: env::var("MOT_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_MOT_BASE_URL.to_string()),
            timeout: Duration::from_secs(secs_or("MOT_TIMEOUT_SECS", 30)),
        })
    }
}

impl VesConfig {
    /// Load Vehicle Enquiry Service configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: required("VES_API_KEY")?,
            base_url: required("VES_API_BASE_URL")?,
            timeout: Duration::from_secs(secs_or("VES_TIMEOUT_SECS", 10)),
        })
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            path: env::var("SQLITE_DB_PATH").unwrap_or_else(|_| "./data/requests.db".to_string()),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
        }
    }
}

impl UsageAttribution {
    /// Load the group attribution policy from `GROUP_USAGE_ATTRIBUTION`
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var("GROUP_USAGE_ATTRIBUTION") {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl std::str::FromStr for UsageAttribution {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "sender" => Ok(Self::Sender),
            other => Err(ConfigError::InvalidAttribution(other.to_string())),
        }
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn secs_or(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidAttribution(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(name) => {
                write!(f, "{} environment variable is not set", name)
            }
            ConfigError::InvalidAttribution(value) => {
                write!(
                    f,
                    "GROUP_USAGE_ATTRIBUTION must be 'chat' or 'sender', got '{}'",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
