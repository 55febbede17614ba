//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroU64},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::rate_limit::{RateLimitPolicy, SubmissionPolicies};
use crate::application::sitemap::{DEFAULT_SITE_URL, normalize_site_url};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "jdigital";
const ENV_PREFIX: &str = "JDIGITAL";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_ADMIN_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_ADMIN_PORT: u16 = 3001;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_LEAD_MAX_REQUESTS: u64 = 5;
const DEFAULT_AUDIT_MAX_REQUESTS: u64 = 3;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_RATE_LIMIT_CLEANUP_SECS: u64 = 300;
const DEFAULT_SESSION_TTL_HOURS: u64 = 24 * 7;
const DEFAULT_BCRYPT_COST: u32 = 12;
const DEFAULT_RESEND_FROM: &str = "J-Digital Leads <onboarding@resend.dev>";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_UPLOAD_LIMIT_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_CACHE_CAPACITY: usize = 200;
const DEFAULT_ADMIN_EMAIL: &str = "admin@jdigital.local";

/// Command-line arguments for the J-Digital binary.
#[derive(Debug, Parser)]
#[command(name = "jdigital", version, about = "J-Digital Solutions site backend")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "JDIGITAL_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public and admin HTTP services.
    Serve(Box<ServeArgs>),
    /// Apply pending database migrations and exit.
    Migrate(MigrateArgs),
    /// Create the first admin account.
    #[command(name = "seed-admin")]
    SeedAdmin(SeedAdminArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SeedAdminArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Admin email; defaults to `site.admin_email`.
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Admin password; defaults to `site.admin_password`.
    #[arg(long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Display name for the account.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Select the submission rate limiter (memory|postgres).
    #[arg(long = "rate-limit-backend", value_name = "BACKEND")]
    pub rate_limit_backend: Option<String>,

    /// Toggle the public response cache.
    #[arg(
        long = "cache-enabled",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_enabled: Option<bool>,

    /// Override the public site URL used in the sitemap.
    #[arg(long = "site-base-url", value_name = "URL")]
    pub site_base_url: Option<String>,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub database: DatabaseSettings,
    pub rate_limit: RateLimitSettings,
    pub auth: AuthSettings,
    pub notifications: NotificationSettings,
    pub storage: StorageSettings,
    pub cache: CacheSettings,
    pub site: SiteSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: NonZeroU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub backend: RateLimitBackend,
    pub trust_forwarded_for: bool,
    pub lead_max_requests: NonZeroU32,
    pub audit_max_requests: NonZeroU32,
    pub window: Duration,
    pub cleanup_interval: Duration,
}

impl RateLimitSettings {
    pub fn policies(&self) -> SubmissionPolicies {
        SubmissionPolicies {
            consultation: RateLimitPolicy::new(self.lead_max_requests.get(), self.window),
            audit: RateLimitPolicy::new(self.audit_max_requests.get(), self.window),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub secret: Option<String>,
    pub session_ttl_hours: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub recipient: Option<String>,
    pub resend_api_key: Option<String>,
    pub resend_from: String,
    pub smtp: Option<SmtpSettings>,
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub supabase_url: Option<String>,
    pub service_role_key: Option<String>,
    pub bucket: Option<String>,
    pub upload_limit_bytes: NonZeroU64,
}

impl StorageSettings {
    /// Environment variables that still need a value before uploads work.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("JDIGITAL__STORAGE__SUPABASE_URL", &self.supabase_url),
            ("JDIGITAL__STORAGE__SERVICE_ROLE_KEY", &self.service_role_key),
            ("JDIGITAL__STORAGE__BUCKET", &self.bucket),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key)
        .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub base_url: String,
    pub admin_email: String,
    pub admin_password: Option<String>,
    pub admin_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Migrate(args)) => raw.apply_database_override(&args.database),
        Some(Command::SeedAdmin(args)) => raw.apply_seed_overrides(args),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    database: RawDatabaseSettings,
    rate_limit: RawRateLimitSettings,
    auth: RawAuthSettings,
    notifications: RawNotificationSettings,
    storage: RawStorageSettings,
    cache: RawCacheSettings,
    site: RawSiteSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(host) = overrides.server_admin_host.as_ref() {
            self.server.admin_host = Some(host.clone());
        }
        if let Some(port) = overrides.public_port {
            self.server.public_port = Some(port);
        }
        if let Some(port) = overrides.admin_port {
            self.server.admin_port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
        if let Some(max) = overrides.database_max_connections {
            self.database.max_connections = Some(max);
        }
        if let Some(backend) = overrides.rate_limit_backend.as_ref() {
            self.rate_limit.backend = Some(backend.clone());
        }
        if let Some(enabled) = overrides.cache_enabled {
            self.cache.enabled = Some(enabled);
        }
        if let Some(url) = overrides.site_base_url.as_ref() {
            self.site.base_url = Some(url.clone());
        }
    }

    fn apply_database_override(&mut self, overrides: &DatabaseOverride) {
        if let Some(url) = overrides.database_url.as_ref() {
            self.database.url = Some(url.clone());
        }
    }

    fn apply_seed_overrides(&mut self, args: &SeedAdminArgs) {
        self.apply_database_override(&args.database);
        if let Some(email) = args.email.as_ref() {
            self.site.admin_email = Some(email.clone());
        }
        if let Some(password) = args.password.as_ref() {
            self.site.admin_password = Some(password.clone());
        }
        if let Some(name) = args.name.as_ref() {
            self.site.admin_name = Some(name.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            database,
            rate_limit,
            auth,
            notifications,
            storage,
            cache,
            site,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            database: build_database_settings(database)?,
            rate_limit: build_rate_limit_settings(rate_limit)?,
            auth: build_auth_settings(auth)?,
            notifications: build_notification_settings(notifications)?,
            storage: build_storage_settings(storage)?,
            cache: build_cache_settings(cache),
            site: build_site_settings(site),
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());
    let admin_host = server
        .admin_host
        .unwrap_or_else(|| DEFAULT_ADMIN_HOST.to_string());

    let public_port = server.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
    if public_port == 0 {
        return Err(LoadError::invalid(
            "server.public_port",
            "port must be greater than zero",
        ));
    }

    let admin_port = server.admin_port.unwrap_or(DEFAULT_ADMIN_PORT);
    if admin_port == 0 {
        return Err(LoadError::invalid(
            "server.admin_port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, public_port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;
    let admin_addr = parse_socket_addr(&admin_host, admin_port)
        .map_err(|reason| LoadError::invalid("server.admin_addr", reason))?;
    if public_addr == admin_addr {
        return Err(LoadError::invalid(
            "server.admin_port",
            "admin listener must differ from the public listener",
        ));
    }

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        public_addr,
        admin_addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_database_settings(database: RawDatabaseSettings) -> Result<DatabaseSettings, LoadError> {
    let max_connections = non_zero_u32(
        database
            .max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
            .into(),
        "database.max_connections",
    )?;

    Ok(DatabaseSettings {
        url: non_blank(database.url),
        max_connections,
    })
}

fn build_rate_limit_settings(
    rate_limit: RawRateLimitSettings,
) -> Result<RateLimitSettings, LoadError> {
    let backend = match rate_limit
        .backend
        .as_deref()
        .map(|value| value.trim().to_ascii_lowercase())
        .as_deref()
    {
        None | Some("memory") => RateLimitBackend::Memory,
        Some("postgres") => RateLimitBackend::Postgres,
        Some(other) => {
            return Err(LoadError::invalid(
                "rate_limit.backend",
                format!("expected `memory` or `postgres`, got `{other}`"),
            ));
        }
    };

    let window_secs = rate_limit
        .window_seconds
        .unwrap_or(DEFAULT_RATE_LIMIT_WINDOW_SECS);
    if window_secs == 0 {
        return Err(LoadError::invalid(
            "rate_limit.window_seconds",
            "must be greater than zero",
        ));
    }
    let cleanup_secs = rate_limit
        .cleanup_interval_seconds
        .unwrap_or(DEFAULT_RATE_LIMIT_CLEANUP_SECS);
    if cleanup_secs == 0 {
        return Err(LoadError::invalid(
            "rate_limit.cleanup_interval_seconds",
            "must be greater than zero",
        ));
    }

    Ok(RateLimitSettings {
        backend,
        trust_forwarded_for: rate_limit.trust_forwarded_for.unwrap_or(true),
        lead_max_requests: non_zero_u32(
            rate_limit
                .lead_max_requests
                .unwrap_or(DEFAULT_LEAD_MAX_REQUESTS),
            "rate_limit.lead_max_requests",
        )?,
        audit_max_requests: non_zero_u32(
            rate_limit
                .audit_max_requests
                .unwrap_or(DEFAULT_AUDIT_MAX_REQUESTS),
            "rate_limit.audit_max_requests",
        )?,
        window: Duration::from_secs(window_secs),
        cleanup_interval: Duration::from_secs(cleanup_secs),
    })
}

fn build_auth_settings(auth: RawAuthSettings) -> Result<AuthSettings, LoadError> {
    let ttl = auth.session_ttl_hours.unwrap_or(DEFAULT_SESSION_TTL_HOURS);
    if ttl == 0 {
        return Err(LoadError::invalid(
            "auth.session_ttl_hours",
            "must be greater than zero",
        ));
    }
    let session_ttl_hours = i64::try_from(ttl)
        .map_err(|_| LoadError::invalid("auth.session_ttl_hours", "value is too large"))?;

    let bcrypt_cost = auth.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST);
    if !(4..=31).contains(&bcrypt_cost) {
        return Err(LoadError::invalid(
            "auth.bcrypt_cost",
            "must be between 4 and 31",
        ));
    }

    Ok(AuthSettings {
        secret: non_blank(auth.secret),
        session_ttl_hours,
        bcrypt_cost,
    })
}

fn build_notification_settings(
    notifications: RawNotificationSettings,
) -> Result<NotificationSettings, LoadError> {
    let resend_from =
        non_blank(notifications.resend_from).unwrap_or_else(|| DEFAULT_RESEND_FROM.to_string());

    let host = non_blank(notifications.smtp_host);
    let user = non_blank(notifications.smtp_user);
    let password = non_blank(notifications.smtp_password);
    let port = notifications.smtp_port.unwrap_or(DEFAULT_SMTP_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "notifications.smtp_port",
            "port must be greater than zero",
        ));
    }

    let smtp = match (host, user, password) {
        (Some(host), Some(user), Some(password)) => Some(SmtpSettings {
            from: non_blank(notifications.smtp_from).unwrap_or_else(|| user.clone()),
            host,
            port,
            user,
            password,
        }),
        _ => None,
    };

    Ok(NotificationSettings {
        recipient: non_blank(notifications.recipient),
        resend_api_key: non_blank(notifications.resend_api_key),
        resend_from,
        smtp,
    })
}

fn build_storage_settings(storage: RawStorageSettings) -> Result<StorageSettings, LoadError> {
    let limit = storage
        .upload_limit_bytes
        .unwrap_or(DEFAULT_UPLOAD_LIMIT_BYTES);
    let upload_limit_bytes = NonZeroU64::new(limit).ok_or_else(|| {
        LoadError::invalid("storage.upload_limit_bytes", "must be greater than zero")
    })?;
    usize::try_from(limit).map_err(|_| {
        LoadError::invalid(
            "storage.upload_limit_bytes",
            "value exceeds supported range for usize",
        )
    })?;

    Ok(StorageSettings {
        supabase_url: non_blank(storage.supabase_url),
        service_role_key: non_blank(storage.service_role_key),
        bucket: non_blank(storage.bucket),
        upload_limit_bytes,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> CacheSettings {
    CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        capacity: cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY),
    }
}

fn build_site_settings(site: RawSiteSettings) -> SiteSettings {
    SiteSettings {
        base_url: normalize_site_url(
            non_blank(site.base_url)
                .as_deref()
                .unwrap_or(DEFAULT_SITE_URL),
        ),
        admin_email: non_blank(site.admin_email)
            .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
        admin_password: non_blank(site.admin_password),
        admin_name: non_blank(site.admin_name),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    admin_host: Option<String>,
    public_port: Option<u16>,
    admin_port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDatabaseSettings {
    url: Option<String>,
    max_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRateLimitSettings {
    backend: Option<String>,
    trust_forwarded_for: Option<bool>,
    lead_max_requests: Option<u64>,
    audit_max_requests: Option<u64>,
    window_seconds: Option<u64>,
    cleanup_interval_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawAuthSettings {
    secret: Option<String>,
    session_ttl_hours: Option<u64>,
    bcrypt_cost: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawNotificationSettings {
    recipient: Option<String>,
    resend_api_key: Option<String>,
    resend_from: Option<String>,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    smtp_from: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStorageSettings {
    supabase_url: Option<String>,
    service_role_key: Option<String>,
    bucket: Option<String>,
    upload_limit_bytes: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    capacity: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    base_url: Option<String>,
    admin_email: Option<String>,
    admin_password: Option<String>,
    admin_name: Option<String>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
