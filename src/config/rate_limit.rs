use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

/// Optional request throttling. Disabled unless RATE_LIMIT is set to
/// "per_second:burst" (e.g. "10:20").
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub rule: RateLimitRule,
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        match env::var("RATE_LIMIT") {
            Ok(raw) => match parse_rule(&raw) {
                Ok(rule) => Self {
                    enabled: true,
                    rule,
                },
                Err(e) => {
                    tracing::warn!("Invalid RATE_LIMIT value ({}), rate limiting disabled", e);
                    Self::disabled()
                }
            },
            Err(_) => Self::disabled(),
        }
    }

    fn disabled() -> Self {
        Self {
            enabled: false,
            rule: RateLimitRule {
                per_second: 10,
                burst_size: 20,
            },
        }
    }
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .trim()
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw.trim()))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 || burst_size == 0 {
        return Err("per_second and burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule {
        per_second,
        burst_size,
    })
}
