//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "rifugio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_ORIGIN: &str = "http://127.0.0.1:3000";
const DEFAULT_CACHE_VERSION: &str = "rifugio-v1";
const DEFAULT_OFFLINE_PATH: &str = "/offline";

fn default_precache() -> Vec<String> {
    [
        "/",
        "/offline",
        "/fonts/inter-var.woff2",
        "/favicon.svg",
        "/manifest.json",
    ]
    .map(str::to_string)
    .to_vec()
}

fn default_exclusions() -> Vec<String> {
    ["/api/", "google-analytics.com", "giscus.app"]
        .map(str::to_string)
        .to_vec()
}

/// Command-line arguments for the Rifugio binary.
#[derive(Debug, Parser)]
#[command(name = "rifugio", version, about = "Rifugio offline cache worker")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RIFUGIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the gateway worker.
    Serve(Box<ServeArgs>),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the gateway listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the gateway listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the upstream origin base URL.
    #[arg(long = "origin-url", value_name = "URL")]
    pub origin_url: Option<String>,

    /// Override the cache namespace version.
    #[arg(long = "cache-version", value_name = "NAME")]
    pub cache_version: Option<String>,

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
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub worker: WorkerSettings,
    pub origin: OriginSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
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
pub struct WorkerSettings {
    pub cache_version: String,
    pub precache: Vec<String>,
    pub offline_path: String,
    pub exclude_substrings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OriginSettings {
    pub base_url: Url,
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

/// Parse CLI arguments and load settings with them applied.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("RIFUGIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    worker: RawWorkerSettings,
    origin: RawOriginSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawWorkerSettings {
    cache_version: Option<String>,
    precache: Option<Vec<String>>,
    offline_path: Option<String>,
    exclude_substrings: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawOriginSettings {
    base_url: Option<String>,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(url) = overrides.origin_url.as_ref() {
            self.origin.base_url = Some(url.clone());
        }
        if let Some(version) = overrides.cache_version.as_ref() {
            self.worker.cache_version = Some(version.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            worker,
            origin,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let worker = build_worker_settings(worker)?;
        let origin = build_origin_settings(origin)?;

        Ok(Self {
            server,
            logging,
            worker,
            origin,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let ip: IpAddr = host
        .parse()
        .map_err(|err| LoadError::invalid("server.host", format!("failed to parse: {err}")))?;

    Ok(ServerSettings {
        addr: SocketAddr::new(ip, port),
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

fn build_worker_settings(worker: RawWorkerSettings) -> Result<WorkerSettings, LoadError> {
    let cache_version = worker
        .cache_version
        .unwrap_or_else(|| DEFAULT_CACHE_VERSION.to_string());
    if cache_version.trim().is_empty() {
        return Err(LoadError::invalid(
            "worker.cache_version",
            "version must not be empty",
        ));
    }

    let precache = worker.precache.unwrap_or_else(default_precache);
    if precache.is_empty() {
        return Err(LoadError::invalid(
            "worker.precache",
            "precache set must not be empty",
        ));
    }
    for path in &precache {
        if !path.starts_with('/') {
            return Err(LoadError::invalid(
                "worker.precache",
                format!("`{path}` must be an absolute path"),
            ));
        }
    }

    let offline_path = worker
        .offline_path
        .unwrap_or_else(|| DEFAULT_OFFLINE_PATH.to_string());
    if !precache.contains(&offline_path) {
        return Err(LoadError::invalid(
            "worker.offline_path",
            format!("`{offline_path}` must be a member of the precache set"),
        ));
    }

    let exclude_substrings = worker.exclude_substrings.unwrap_or_else(default_exclusions);

    Ok(WorkerSettings {
        cache_version,
        precache,
        offline_path,
        exclude_substrings,
    })
}

fn build_origin_settings(origin: RawOriginSettings) -> Result<OriginSettings, LoadError> {
    let raw = origin.base_url.unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
    let base_url = Url::parse(&raw)
        .map_err(|err| LoadError::invalid("origin.base_url", format!("failed to parse: {err}")))?;

    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "origin.base_url",
            "scheme must be http or https",
        ));
    }

    Ok(OriginSettings { base_url })
}
