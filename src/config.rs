use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        }
    }

    fn env_file(self) -> &'static str {
        match self {
            Environment::Production => ".env.prod",
            Environment::Development => ".env.dev",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Per-client-IP request budget over a sliding window.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 15 * 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `LOG_FORMAT`; unset means JSON in production, plain text otherwise.
    pub format: Option<String>,
    /// Directory of the daily error log.
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub seed_initial_data: bool,
    pub rate_limit: RateLimitConfig,
    pub log: LogConfig,
}

/// Loads `.env.prod` or `.env.dev` depending on `APP_ENV`, then a plain `.env`.
/// Variables already set in the process environment win.
pub fn load_env_files() {
    dotenvy::from_filename(Environment::from_env().env_file()).ok();
    dotenvy::dotenv().ok();
}

fn env_number<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|_| anyhow::anyhow!("{key} must be a number, got {v:?}")),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "bizcards".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "bizcards-users".into()),
        };
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        let seed_initial_data = std::env::var("SEED_INITIAL_DATA")
            .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
            .unwrap_or(true);
        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max_requests: env_number("RATE_LIMIT_MAX", defaults.max_requests)?,
            window_secs: env_number("RATE_LIMIT_WINDOW_SECS", defaults.window_secs)?,
        };
        anyhow::ensure!(
            rate_limit.max_requests > 0 && rate_limit.window_secs > 0,
            "RATE_LIMIT_MAX and RATE_LIMIT_WINDOW_SECS must be positive"
        );
        let log = LogConfig {
            format: std::env::var("LOG_FORMAT").ok(),
            dir: std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            environment: Environment::from_env(),
            seed_initial_data,
            rate_limit,
            log,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn json_logs(&self) -> bool {
        match self.log.format.as_deref() {
            Some(format) => format == "json",
            None => self.environment == Environment::Production,
        }
    }
}
