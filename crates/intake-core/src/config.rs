//! Configuration module
//!
//! Reads the server, storage, pipeline and notification settings from the
//! environment (a `.env` file is honored through `dotenvy`).

use std::env;
use std::time::Duration;

use crate::constants::{DEFAULT_BUCKET, DEFAULT_RETENTION_DAYS, MAX_RETENTION_DAYS};
use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const IO_TIMEOUT_SECS: u64 = 30;
const SMTP_PORT: u16 = 587;
const DEFAULT_SUBJECT: &str = "New Passport Submission";
const DEFAULT_CONTENT_TYPES: &str = "image/jpeg,image/png,image/webp,image/heic,image/gif";

/// Object storage settings.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// `{storage_base}` of public photo URLs (`{storage_base}/{bucket}/{key}`).
    pub public_base_url: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

impl StorageConfig {
    /// Public URL prefix photos are served under, without trailing slash.
    pub fn storage_base(&self) -> Option<String> {
        let base = match self.backend {
            StorageBackend::S3 => self.public_base_url.clone().or_else(|| {
                self.s3_endpoint.clone().or_else(|| {
                    self.s3_region
                        .as_ref()
                        .map(|region| format!("https://s3.{}.amazonaws.com", region))
                })
            }),
            StorageBackend::Local => self
                .public_base_url
                .clone()
                .or_else(|| self.local_storage_base_url.clone()),
        };
        base.map(|b| b.trim_end_matches('/').to_string())
    }
}

/// Operator notification (SMTP) settings.
#[derive(Clone, Debug)]
pub struct NotifyConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    pub from: Option<String>,
    pub recipient: Option<String>,
    pub subject: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct IntakeConfig {
    pub environment: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub storage: StorageConfig,
    pub notify: NotifyConfig,
    pub allowed_content_types: Vec<String>,
    /// Upper bound for each upload, insert and notification call.
    pub io_timeout: Duration,
    pub retention_days: i64,
}

impl IntakeConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let allowed_content_types = env::var("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|_| DEFAULT_CONTENT_TYPES.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse::<StorageBackend>()?,
            Err(_) => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            bucket: env::var("STORAGE_BUCKET")
                .or_else(|_| env::var("S3_BUCKET"))
                .unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            public_base_url: env::var("STORAGE_PUBLIC_BASE_URL").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
        };

        let notify = NotifyConfig {
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(SMTP_PORT),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_tls: env::var("SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            from: env::var("NOTIFY_FROM")
                .or_else(|_| env::var("SMTP_FROM"))
                .ok(),
            recipient: env::var("NOTIFY_RECIPIENT").ok(),
            subject: env::var("NOTIFY_SUBJECT").unwrap_or_else(|_| DEFAULT_SUBJECT.to_string()),
        };

        let config = IntakeConfig {
            environment,
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage,
            notify,
            allowed_content_types,
            io_timeout: Duration::from_secs(
                env::var("IO_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| IO_TIMEOUT_SECS.to_string())
                    .parse()
                    .unwrap_or(IO_TIMEOUT_SECS),
            ),
            retention_days: env::var("RETENTION_DAYS")
                .unwrap_or_else(|_| DEFAULT_RETENTION_DAYS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RETENTION_DAYS must be a whole number of days"))?,
        };

        Ok(config)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Validate settings needed by the submission server.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.validate_store_settings()?;

        if self.notify.smtp_host.is_none() {
            return Err(anyhow::anyhow!("SMTP_HOST must be set to notify the operator"));
        }
        if self.notify.from.is_none() {
            return Err(anyhow::anyhow!("NOTIFY_FROM must be set"));
        }
        if self.notify.recipient.is_none() {
            return Err(anyhow::anyhow!("NOTIFY_RECIPIENT must be set"));
        }
        if self.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_CONTENT_TYPES must not be empty"));
        }
        if self.io_timeout.is_zero() {
            return Err(anyhow::anyhow!("IO_TIMEOUT_SECONDS must be greater than zero"));
        }

        Ok(())
    }

    /// Validate the subset needed by the retention sweep (database + storage).
    pub fn validate_store_settings(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if !(1..=MAX_RETENTION_DAYS).contains(&self.retention_days) {
            return Err(anyhow::anyhow!(
                "RETENTION_DAYS must be between 1 and {}",
                MAX_RETENTION_DAYS
            ));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BUCKET must not be empty"));
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none()
                    && self.storage.public_base_url.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn retention(&self) -> Result<chrono::Duration, anyhow::Error> {
        chrono::Duration::try_days(self.retention_days).ok_or_else(|| {
            anyhow::anyhow!("RETENTION_DAYS {} is out of range", self.retention_days)
        })
    }
}
