use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Settings {
    pub http_addr: String,
    pub upstream_url: String,
    pub upstream_timeout_secs: u64,
    pub upstream_delay_ms: Option<u64>,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub http_request_body_limit_bytes: usize,
    pub http_concurrency_limit: usize,
    pub http_request_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let http_addr = match std::env::var("HTTP_ADDR") {
            Ok(addr) => addr,
            Err(_) => match std::env::var("PORT") {
                Ok(port) => format!("0.0.0.0:{}", port.trim()),
                Err(_) => "0.0.0.0:5000".to_string(),
            },
        };
        let upstream_url = std::env::var("UPSTREAM_URL")
            .unwrap_or_else(|_| "https://dummyjson.com".to_string());
        if !upstream_url.starts_with("http://") && !upstream_url.starts_with("https://") {
            return Err(anyhow!("UPSTREAM_URL must start with http:// or https://"));
        }
        let upstream_timeout_secs = parse_u64_env("UPSTREAM_TIMEOUT_SECS", 15)?;
        let upstream_delay_ms = parse_optional_u64(std::env::var("UPSTREAM_DELAY_MS").ok())
            .context("Failed to parse UPSTREAM_DELAY_MS, expecting integer")?;
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let http_request_body_limit_bytes =
            parse_usize_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;
        let http_concurrency_limit = parse_usize_env("HTTP_CONCURRENCY_LIMIT", 256)?;
        let http_request_timeout_secs = parse_u64_env("HTTP_REQUEST_TIMEOUT_SECS", 30)?;

        Ok(Self {
            http_addr,
            upstream_url,
            upstream_timeout_secs,
            upstream_delay_ms,
            cors_origins,
            log_level,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Пустое значение или `0` означают «без задержки».
fn parse_optional_u64(raw: Option<String>) -> Result<Option<u64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value = raw.parse::<u64>()?;
    Ok((value > 0).then_some(value))
}

fn parse_usize_env(key: &str, default: usize) -> Result<usize> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<usize>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

fn parse_u64_env(key: &str, default: u64) -> Result<u64> {
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<u64>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == 0 {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_origins_are_trimmed_and_blank_entries_dropped() {
        let origins = parse_cors_origins(" http://a , ,http://b ".to_string());
        assert_eq!(origins, vec!["http://a".to_string(), "http://b".to_string()]);
    }

    #[test]
    fn optional_delay_treats_blank_and_zero_as_none() {
        assert_eq!(parse_optional_u64(None).expect("ok"), None);
        assert_eq!(parse_optional_u64(Some("  ".to_string())).expect("ok"), None);
        assert_eq!(parse_optional_u64(Some("0".to_string())).expect("ok"), None);
        assert_eq!(
            parse_optional_u64(Some("5000".to_string())).expect("ok"),
            Some(5000)
        );
        assert!(parse_optional_u64(Some("soon".to_string())).is_err());
    }
}
