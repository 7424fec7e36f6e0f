use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::camera::{
    redact::redact_url_credentials, service::SnapshotRequest, traits::CaptureParams,
};

const DEFAULT_TIMEOUT_SEC: u64 = 6;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
    pub snapshot: SnapshotSettings,
}

/// User-facing snapshot settings. Read fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSettings {
    pub input_url: String,
    pub ffmpeg_path: String,
    pub rtsp_transport: String,
    pub timeout_sec: u64,
    /// Zero or negative disables caching.
    pub cache_ttl_ms: i64,
    /// Whitespace separated, inserted before `-i`.
    pub extra_input_args: String,
    pub allow_last_good: bool,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            input_url: String::new(),
            ffmpeg_path: "ffmpeg".to_owned(),
            rtsp_transport: "tcp".to_owned(),
            timeout_sec: DEFAULT_TIMEOUT_SEC,
            cache_ttl_ms: 750,
            extra_input_args: String::new(),
            allow_last_good: true,
        }
    }
}

/// Partial update accepted by `POST /settings`.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsUpdate {
    pub input_url: Option<String>,
    pub ffmpeg_path: Option<String>,
    pub rtsp_transport: Option<String>,
    pub timeout_sec: Option<u64>,
    pub cache_ttl_ms: Option<i64>,
    pub extra_input_args: Option<String>,
    pub allow_last_good: Option<bool>,
}

impl SnapshotSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            input_url: env::var("SNAPSHOT_INPUT_URL").unwrap_or(defaults.input_url),
            ffmpeg_path: env::var("SNAPSHOT_FFMPEG_PATH")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.ffmpeg_path),
            rtsp_transport: env::var("SNAPSHOT_RTSP_TRANSPORT")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(defaults.rtsp_transport),
            timeout_sec: parse_env("SNAPSHOT_TIMEOUT_SEC").unwrap_or(defaults.timeout_sec),
            cache_ttl_ms: parse_env("SNAPSHOT_CACHE_TTL_MS").unwrap_or(defaults.cache_ttl_ms),
            extra_input_args: env::var("SNAPSHOT_EXTRA_INPUT_ARGS")
                .unwrap_or(defaults.extra_input_args),
            allow_last_good: env::var("SNAPSHOT_ALLOW_LAST_GOOD")
                .ok()
                .and_then(|value| parse_bool(&value))
                .unwrap_or(defaults.allow_last_good),
        }
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(input_url) = update.input_url {
            self.input_url = input_url;
        }
        if let Some(ffmpeg_path) = update.ffmpeg_path {
            self.ffmpeg_path = ffmpeg_path;
        }
        if let Some(rtsp_transport) = update.rtsp_transport {
            self.rtsp_transport = rtsp_transport;
        }
        if let Some(timeout_sec) = update.timeout_sec {
            self.timeout_sec = timeout_sec;
        }
        if let Some(cache_ttl_ms) = update.cache_ttl_ms {
            self.cache_ttl_ms = cache_ttl_ms;
        }
        if let Some(extra_input_args) = update.extra_input_args {
            self.extra_input_args = extra_input_args;
        }
        if let Some(allow_last_good) = update.allow_last_good {
            self.allow_last_good = allow_last_good;
        }
    }

    /// Copy safe to log or return to clients.
    pub fn redacted(&self) -> Self {
        Self {
            input_url: redact_url_credentials(&self.input_url),
            ..self.clone()
        }
    }

    pub fn to_request(&self) -> SnapshotRequest {
        let timeout_sec = if self.timeout_sec == 0 {
            DEFAULT_TIMEOUT_SEC
        } else {
            self.timeout_sec
        };
        SnapshotRequest {
            params: CaptureParams {
                input_url: self.input_url.trim().to_owned(),
                tool_path: self.ffmpeg_path.trim().to_owned(),
                transport: self.rtsp_transport.trim().to_owned(),
                timeout: Duration::from_secs(timeout_sec),
                extra_args: self
                    .extra_input_args
                    .split_whitespace()
                    .map(str::to_owned)
                    .collect(),
                allow_last_good: self.allow_last_good,
            },
            cache_ttl_ms: self.cache_ttl_ms,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
            .parse()?;
        let log_dir = env::var("LOG_DIR")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("logs"));

        Ok(Self {
            bind_addr,
            log_dir,
            snapshot: SnapshotSettings::from_env(),
        })
    }
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
