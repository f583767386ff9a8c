use std::{env, str::FromStr, time::Duration};

use chrono::{FixedOffset, Offset, Utc};

/// What a repeated "add to cart" does to an existing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartAddPolicy {
    /// Upsert the line back to quantity 1 (repeat adds are idempotent).
    #[default]
    Set,
    /// Bump the existing quantity by one.
    Increment,
}

impl FromStr for CartAddPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "set" => Ok(CartAddPolicy::Set),
            "increment" => Ok(CartAddPolicy::Increment),
            other => Err(anyhow::anyhow!("unknown CART_ADD_POLICY `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub agent_webhook_url: Option<String>,
    pub agent_timeout: Duration,
    pub agent_platform: String,
    pub cart_add_policy: CartAddPolicy,
    /// Zone used when dates are written into chat replies.
    pub display_offset: FixedOffset,
}

/// Brasília time. Brazil has had no daylight saving since 2019.
pub fn default_display_offset() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap_or_else(|| Utc.fix())
}

/// Parses a whole-hour UTC offset such as `-3` or `+1`.
pub fn parse_display_offset(raw: &str) -> anyhow::Result<FixedOffset> {
    let hours: i32 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid DISPLAY_UTC_OFFSET_HOURS `{raw}`"))?;
    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| anyhow::anyhow!("DISPLAY_UTC_OFFSET_HOURS out of range: {hours}"))
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let agent_webhook_url = env::var("AGENT_WEBHOOK_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        let agent_timeout = env::var("AGENT_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(5));
        let agent_platform = env::var("AGENT_PLATFORM").unwrap_or_else(|_| "web".to_string());
        let cart_add_policy = match env::var("CART_ADD_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => CartAddPolicy::default(),
        };

        let display_offset = match env::var("DISPLAY_UTC_OFFSET_HOURS") {
            Ok(raw) => parse_display_offset(&raw)?,
            Err(_) => default_display_offset(),
        };

        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            agent_webhook_url,
            agent_timeout,
            agent_platform,
            cart_add_policy,
            display_offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_add_policy_parses_case_insensitively() {
        assert_eq!("SET".parse::<CartAddPolicy>().unwrap(), CartAddPolicy::Set);
        assert_eq!(
            " increment ".parse::<CartAddPolicy>().unwrap(),
            CartAddPolicy::Increment
        );
        assert!("double".parse::<CartAddPolicy>().is_err());
    }

    #[test]
    fn display_offset_parses_whole_hours() {
        assert_eq!(parse_display_offset("-3").unwrap(), default_display_offset());
        assert_eq!(parse_display_offset(" +1 ").unwrap().local_minus_utc(), 3600);
        assert!(parse_display_offset("brt").is_err());
        assert!(parse_display_offset("30").is_err());
    }

    #[test]
    fn cart_add_policy_defaults_to_set() {
        assert_eq!(CartAddPolicy::default(), CartAddPolicy::Set);
    }
}
