use std::{env, fs, path::Path, time::Duration};

use crate::{domain::ChatId, errors::Error, forward::policy::RetryPolicy, Result};

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Identities
    pub source_bot_token: String,
    pub dest_bot_token: String,
    pub target_chat_id: ChatId,

    // Webhook receiver
    pub webhook_url: Option<String>,
    pub bind_addr: String,
    pub port: u16,
    pub webhook_path: String,

    // Worker timings
    pub forward_backoff: Duration,
    pub forward_pacing: Duration,
    pub worker_fault_pause: Duration,
    pub forward_max_attempts: Option<u32>,

    // Telegram client
    pub request_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        // Required
        let source_bot_token = get("SOURCE_BOT_TOKEN")
            .or_else(|| get("TOKEN_BOT1"))
            .ok_or_else(|| {
                Error::Config("SOURCE_BOT_TOKEN environment variable is required".to_string())
            })?;
        let dest_bot_token = get("DEST_BOT_TOKEN")
            .or_else(|| get("TOKEN_BOT2"))
            .ok_or_else(|| {
                Error::Config("DEST_BOT_TOKEN environment variable is required".to_string())
            })?;
        let target_chat_id = get("TARGET_CHAT_ID")
            .ok_or_else(|| {
                Error::Config("TARGET_CHAT_ID environment variable is required".to_string())
            })?
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|e| Error::Config(format!("TARGET_CHAT_ID must be an integer: {e}")))?;

        // Receiver
        let webhook_url = get("WEBHOOK_URL");
        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&get, "PORT", 10_000u16)?;
        let webhook_path = normalize_path(&get("WEBHOOK_PATH").unwrap_or_default());

        // Worker
        let defaults = RetryPolicy::default();
        let forward_backoff = millis_or(&get, "FORWARD_BACKOFF_MS", defaults.backoff)?;
        let forward_pacing = millis_or(&get, "FORWARD_PACING_MS", defaults.pacing)?;
        let worker_fault_pause = millis_or(&get, "WORKER_FAULT_PAUSE_MS", defaults.fault_pause)?;
        let forward_max_attempts = match get("FORWARD_MAX_ATTEMPTS") {
            Some(v) => Some(parse::<u32>("FORWARD_MAX_ATTEMPTS", &v)?).filter(|n| *n > 0),
            None => None,
        };

        let request_timeout =
            Duration::from_secs(parse_or(&get, "TELEGRAM_REQUEST_TIMEOUT_SECS", 30u64)?);

        Ok(Self {
            source_bot_token,
            dest_bot_token,
            target_chat_id,
            webhook_url,
            bind_addr,
            port,
            webhook_path,
            forward_backoff,
            forward_pacing,
            worker_fault_pause,
            forward_max_attempts,
            request_timeout,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            backoff: self.forward_backoff,
            pacing: self.forward_pacing,
            fault_pause: self.worker_fault_pause,
            max_attempts: self.forward_max_attempts,
        }
    }
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        "/webhook".to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn parse<T>(key: &str, raw: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| Error::Config(format!("{key} is invalid ({raw:?}): {e}")))
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(v) => parse(key, &v),
        None => Ok(default),
    }
}

fn millis_or(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration> {
    match get(key) {
        Some(v) => parse::<u64>(key, &v).map(Duration::from_millis),
        None => Ok(default),
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Export `KEY=value` pairs from `path`; variables already set win.
fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in contents.lines().filter_map(parse_dotenv_line) {
        if env::var_os(key).is_none() {
            env::set_var(key, val);
        }
    }
}

/// One `.env` line: blank lines and `#` comments yield nothing, values may be
/// wrapped in single or double quotes.
fn parse_dotenv_line(raw: &str) -> Option<(&str, &str)> {
    let line = raw.trim();
    if line.starts_with('#') {
        return None;
    }
    let (k, v) = line.split_once('=')?;
    let key = k.trim().trim_start_matches("export ").trim();
    if key.is_empty() {
        return None;
    }

    let val = v.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| val.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(val);
    Some((key, unquoted))
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
