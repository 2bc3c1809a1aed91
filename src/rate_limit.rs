use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;

/// A single request-count bound: at most `max_requests` per `window`.
///
/// Parsed from and displayed in the `N/PERIOD` notation (`10/minute`,
/// `200/day`, `5/30s`); `description` renders the human form quota errors
/// carry (`10 per 1 minute`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimit {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn per_hour(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60 * 60))
    }

    pub fn per_day(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(24 * 60 * 60))
    }

    /// The human form quota errors carry, e.g. `10 per 1 minute`.
    pub fn description(&self) -> String {
        let secs = self.window.as_secs();
        let (count, unit) = if secs % 86_400 == 0 {
            (secs / 86_400, "day")
        } else if secs % 3_600 == 0 {
            (secs / 3_600, "hour")
        } else if secs % 60 == 0 {
            (secs / 60, "minute")
        } else {
            (secs, "second")
        };

        format!("{} per {} {}{}", self.max_requests, count, unit, plural(count))
    }
}

/// Renders the same `N/PERIOD` notation `FromStr` accepts, so parsing a
/// displayed limit round-trips.
impl fmt::Display for RateLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.window.as_secs();
        match secs {
            1 => write!(f, "{}/second", self.max_requests),
            60 => write!(f, "{}/minute", self.max_requests),
            3_600 => write!(f, "{}/hour", self.max_requests),
            86_400 => write!(f, "{}/day", self.max_requests),
            _ => write!(f, "{}/{}s", self.max_requests, secs),
        }
    }
}

fn plural(count: u64) -> &'static str {
    if count == 1 { "" } else { "s" }
}

impl FromStr for RateLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, period) = s
            .split_once('/')
            .ok_or_else(|| format!("'{s}' is not of the form N/PERIOD"))?;

        let max_requests: u32 = count
            .trim()
            .parse()
            .map_err(|_| format!("'{count}' is not a valid request count"))?;
        if max_requests == 0 {
            return Err("request count must be at least 1".to_string());
        }

        let window = match period.trim().to_ascii_lowercase().as_str() {
            "second" => Duration::from_secs(1),
            "minute" => Duration::from_secs(60),
            "hour" => Duration::from_secs(60 * 60),
            "day" => Duration::from_secs(24 * 60 * 60),
            other => {
                let secs: u64 = other
                    .strip_suffix('s')
                    .unwrap_or(other)
                    .parse()
                    .map_err(|_| {
                        format!("'{other}' is not a known period (second/minute/hour/day/Ns)")
                    })?;
                if secs == 0 {
                    return Err("window must be at least 1 second".to_string());
                }
                Duration::from_secs(secs)
            }
        };

        Ok(Self::new(max_requests, window))
    }
}

/// The limit a rejected request violated.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{}", .limit.description())]
pub struct RateLimitExceeded {
    pub limit: RateLimit,
}

/// A sliding-window request counter keyed by client address.
///
/// Design:
/// - Explicitly owned and injected rather than ambient process state, so
///   tests construct isolated instances per case.
/// - One mutex guards the whole hit map; recording and checking happen under
///   a single lock acquisition so two concurrent requests from one client
///   cannot both claim the last slot in a window.
/// - Every attempt is recorded, including rejected ones.
pub struct SlidingWindowLimiter {
    limits: Vec<RateLimit>,
    hits: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    /// Create a limiter enforcing all of `limits` simultaneously.
    pub fn new(limits: Vec<RateLimit>) -> Self {
        Self {
            limits,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// The configured limits, tightest-window first ordering not guaranteed.
    pub fn limits(&self) -> &[RateLimit] {
        &self.limits
    }

    /// Record an attempt for `key` and check it against every limit.
    pub fn check(&self, key: &str) -> Result<(), RateLimitExceeded> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), RateLimitExceeded> {
        if self.limits.is_empty() {
            return Ok(());
        }

        let longest = self
            .limits
            .iter()
            .map(|l| l.window)
            .max()
            .unwrap_or_default();

        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        let entry = hits.entry(key.to_string()).or_default();

        // Hits older than the longest window can never matter again.
        entry.retain(|hit| now.duration_since(*hit) < longest);
        entry.push(now);

        for limit in &self.limits {
            let in_window = entry
                .iter()
                .filter(|hit| now.duration_since(**hit) < limit.window)
                .count();
            if in_window > limit.max_requests as usize {
                return Err(RateLimitExceeded { limit: *limit });
            }
        }

        Ok(())
    }
}
