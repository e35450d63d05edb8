//! Fixed-window request budgeting keyed by client address.
//!
//! A [`RateLimitRule`] such as `"5 per minute"` is enforced by
//! [`FixedWindowRateLimiter`] on top of a [`RateLimitStore`], which keeps the
//! counters outside the process so every instance sharing the store sees the
//! same budget.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use tracing::{error, warn};

use crate::domain::Error;
use crate::domain::ports::{RateLimitStore, RateLimitStoreError, RateLimiter};

/// Errors raised while parsing a rate limit rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitRuleError {
    /// The rule did not match `<count> per [<n>] <unit>`.
    #[error("rate limit rule `{rule}` must look like `5 per minute` or `100/2 hours`")]
    Malformed { rule: String },
    /// The rule admits no requests at all.
    #[error("rate limit must allow at least one request")]
    ZeroLimit,
    /// The window length is zero.
    #[error("rate limit window must be at least one unit long")]
    ZeroWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowUnit {
    Second,
    Minute,
    Hour,
    Day,
}

impl WindowUnit {
    fn seconds(self) -> u64 {
        match self {
            Self::Second => 1,
            Self::Minute => 60,
            Self::Hour => 60 * 60,
            Self::Day => 24 * 60 * 60,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
        }
    }
}

static RULE_RE: OnceLock<Regex> = OnceLock::new();

fn rule_regex() -> &'static Regex {
    RULE_RE.get_or_init(|| {
        let pattern = r"(?i)^\s*(\d+)\s*(?:per|/)\s*(\d+)?\s*(second|minute|hour|day)s?\s*$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("rate limit rule regex failed to compile: {error}"))
    })
}

/// Maximum number of requests accepted per window.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use backend::domain::rate_limit::RateLimitRule;
///
/// let rule: RateLimitRule = "5 per minute".parse().expect("valid rule");
/// assert_eq!(rule.limit(), 5);
/// assert_eq!(rule.window(), Duration::from_secs(60));
/// assert_eq!(rule.to_string(), "5 per 1 minute");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitRule {
    limit: u32,
    multiples: u32,
    unit: WindowUnit,
}

impl RateLimitRule {
    /// Requests admitted per window.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_secs(u64::from(self.multiples).saturating_mul(self.unit.seconds()))
    }
}

impl FromStr for RateLimitRule {
    type Err = RateLimitRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RateLimitRuleError::Malformed { rule: s.to_owned() };
        let captures = rule_regex().captures(s).ok_or_else(malformed)?;

        let limit = captures
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .ok_or_else(malformed)?;
        let multiples = match captures.get(2) {
            Some(m) => m.as_str().parse::<u32>().map_err(|_| malformed())?,
            None => 1,
        };
        let unit = match captures.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
            Some(unit) if unit == "second" => WindowUnit::Second,
            Some(unit) if unit == "minute" => WindowUnit::Minute,
            Some(unit) if unit == "hour" => WindowUnit::Hour,
            Some(unit) if unit == "day" => WindowUnit::Day,
            _ => return Err(malformed()),
        };

        if limit == 0 {
            return Err(RateLimitRuleError::ZeroLimit);
        }
        if multiples == 0 {
            return Err(RateLimitRuleError::ZeroWindow);
        }
        Ok(Self {
            limit,
            multiples,
            unit,
        })
    }
}

impl fmt::Display for RateLimitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} per {} {}", self.limit, self.multiples, self.unit.as_str())
    }
}

/// Identity a request budget is charged to, normally the peer IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientKey(String);

impl ClientKey {
    /// Key shared by requests whose peer address is unknown.
    pub const UNKNOWN: &'static str = "unknown";

    /// Wrap a client identity.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl AsRef<str> for ClientKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// [`RateLimiter`] counting hits per client in fixed windows.
///
/// Counters are namespaced by `scope` so several endpoints can share one
/// store without sharing budgets.
pub struct FixedWindowRateLimiter<S: ?Sized> {
    store: Arc<S>,
    rule: RateLimitRule,
    scope: String,
}

impl<S: ?Sized> FixedWindowRateLimiter<S> {
    /// Create a limiter enforcing `rule` for counters under `scope`.
    pub fn new(store: Arc<S>, rule: RateLimitRule, scope: impl Into<String>) -> Self {
        Self {
            store,
            rule,
            scope: scope.into(),
        }
    }

    /// Rule enforced by this limiter.
    pub fn rule(&self) -> &RateLimitRule {
        &self.rule
    }

    fn counter_key(&self, client: &ClientKey) -> String {
        format!("ratelimit:{}:{}", self.scope, client)
    }

    fn map_store_error(error: RateLimitStoreError) -> Error {
        error!(%error, "rate limit store failed");
        match error {
            RateLimitStoreError::Connection { message } => {
                Error::service_unavailable(format!("rate limit store unavailable: {message}"))
            }
            RateLimitStoreError::Command { message } => {
                Error::internal(format!("rate limit store error: {message}"))
            }
        }
    }
}

#[async_trait]
impl<S> RateLimiter for FixedWindowRateLimiter<S>
where
    S: RateLimitStore + ?Sized,
{
    async fn check(&self, client: &ClientKey) -> Result<(), Error> {
        let hit = self
            .store
            .hit(&self.counter_key(client), self.rule.window())
            .await
            .map_err(Self::map_store_error)?;

        if hit.count <= u64::from(self.rule.limit) {
            return Ok(());
        }

        let retry_after = hit.resets_in.as_secs().max(1);
        warn!(
            client = %client,
            scope = %self.scope,
            count = hit.count,
            retry_after,
            "rate limit exceeded"
        );
        Err(
            Error::rate_limited(format!("Rate limit exceeded: {}", self.rule)).with_details(
                json!({
                    "limit": self.rule.to_string(),
                    "retryAfterSecs": retry_after,
                }),
            ),
        )
    }
}
