use std::path::PathBuf;

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // HTTP
    pub api_port: u16,
    /// Bearer token required by the destructive rebuild endpoint.
    pub admin_token: String,

    // Signal thresholds TOML; built-in defaults when unset
    pub signal_config_path: Option<PathBuf>,

    // Ingestion
    /// Where raw uploads are archived. Uploads are not kept when unset.
    pub upload_dir: Option<PathBuf>,
    pub ingest_batch_size: usize,
}

impl Config {
    pub const DEFAULT_API_PORT: u16 = 8080;
    pub const DEFAULT_INGEST_BATCH_SIZE: usize = 500;

    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let ingest_batch_size = optional_env("INGEST_BATCH_SIZE")
            .map(|v| {
                v.trim().parse::<usize>().ok().filter(|n| *n > 0).unwrap_or_else(|| {
                    panic!("INGEST_BATCH_SIZE must be a positive integer, got: '{v}'")
                })
            })
            .unwrap_or(Self::DEFAULT_INGEST_BATCH_SIZE);

        Config {
            database_url: required_env("DATABASE_URL"),
            api_port: optional_env("API_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(Self::DEFAULT_API_PORT),
            admin_token: required_env("ADMIN_TOKEN"),
            signal_config_path: optional_env("SIGNAL_CONFIG_PATH").map(PathBuf::from),
            upload_dir: optional_env("UPLOAD_DIR").map(PathBuf::from),
            ingest_batch_size,
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
