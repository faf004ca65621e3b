use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: Option<DatabaseConfig>,
    pub swagger: SwaggerConfig,
    pub push: PushConfig,
    pub processor: ProcessorConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_request_body_size: usize,
    /// Shared secret for `/api/internal/*` routes; internal routes are
    /// disabled when unset
    pub internal_api_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// Push gateway configuration.
///
/// When `gateway_url` is unset, notifications are logged instead of sent.
#[derive(Debug, Clone)]
pub struct PushConfig {
    pub gateway_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

/// Report processor worker configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Capacity of the "report created" event queue
    pub queue_capacity: usize,
    /// Attempts per event before the failure is reported and dropped
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            push: PushConfig::from_env()?,
            processor: ProcessorConfig::from_env()?,
        })
    }
}

impl AppConfig {
    const DEFAULT_MAX_REQUEST_BODY_SIZE: usize = 2 * 1024 * 1024; // 2MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_request_body_size = env::var("MAX_REQUEST_BODY_SIZE")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_REQUEST_BODY_SIZE.to_string())
            .parse::<usize>()
            .map_err(|_| "MAX_REQUEST_BODY_SIZE must be a valid number".to_string())?;

        let internal_api_token = env::var("INTERNAL_API_TOKEN")
            .ok()
            .filter(|s| !s.is_empty());

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_request_body_size,
            internal_api_token,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    /// Returns `None` when `DATABASE_URL` is not set; the service then runs
    /// on the in-memory store.
    pub fn from_env() -> Result<Option<Self>, String> {
        let url = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => return Ok(None),
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Some(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        }))
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "CivicPulse API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Civic report triage and notification API".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl PushConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 10;

    pub fn from_env() -> Result<Self, String> {
        let gateway_url = env::var("PUSH_GATEWAY_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty());
        let api_key = env::var("PUSH_API_KEY").ok().filter(|s| !s.is_empty());

        let timeout_secs = env::var("PUSH_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "PUSH_TIMEOUT_SECS must be a valid number".to_string())?;

        Ok(Self {
            gateway_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl ProcessorConfig {
    const DEFAULT_QUEUE_CAPACITY: usize = 1024;
    const DEFAULT_MAX_RETRIES: u32 = 3;
    const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

    pub fn from_env() -> Result<Self, String> {
        let queue_capacity = env::var("PROCESSOR_QUEUE_CAPACITY")
            .unwrap_or_else(|_| Self::DEFAULT_QUEUE_CAPACITY.to_string())
            .parse::<usize>()
            .map_err(|_| "PROCESSOR_QUEUE_CAPACITY must be a valid number".to_string())?;

        if queue_capacity == 0 {
            return Err("PROCESSOR_QUEUE_CAPACITY must be greater than 0".to_string());
        }

        let max_retries = env::var("PROCESSOR_MAX_RETRIES")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_RETRIES.to_string())
            .parse::<u32>()
            .map_err(|_| "PROCESSOR_MAX_RETRIES must be a valid number".to_string())?;

        let retry_delay_secs = env::var("PROCESSOR_RETRY_DELAY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_RETRY_DELAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "PROCESSOR_RETRY_DELAY_SECS must be a valid number".to_string())?;

        Ok(Self {
            queue_capacity,
            max_retries: max_retries.max(1),
            retry_delay: Duration::from_secs(retry_delay_secs),
        })
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
            max_retries: Self::DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(Self::DEFAULT_RETRY_DELAY_SECS),
        }
    }
}
