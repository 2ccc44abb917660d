//! Uniqueness tokens for renamed files.
//!
//! New file names embed a token derived from the wall clock. The clock is
//! injected through [`TokenClock`] so tests can drive token generation
//! deterministically instead of sleeping real time.

use chrono::Utc;
use std::thread;
use std::time::{Duration, Instant};

/// Minimum wall-clock distance between two tokens issued by [`SystemClock`].
pub const MIN_TOKEN_SPACING: Duration = Duration::from_millis(10);

/// Source of strictly increasing tokens.
pub trait TokenClock {
    /// Return a token strictly greater than every token previously returned.
    fn next_token(&mut self) -> u128;
}

/// Tokens from nanoseconds since the Unix epoch.
///
/// Successive tokens are spaced at least [`MIN_TOKEN_SPACING`] apart, and a
/// token never repeats or goes backwards even if the clock is coarse or steps.
#[derive(Debug)]
pub struct SystemClock {
    last: Option<(Instant, u128)>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenClock for SystemClock {
    fn next_token(&mut self) -> u128 {
        if let Some((issued_at, _)) = self.last {
            let elapsed = issued_at.elapsed();
            if elapsed < MIN_TOKEN_SPACING {
                thread::sleep(MIN_TOKEN_SPACING - elapsed);
            }
        }

        let now = wall_clock_nanos();
        let token = match self.last {
            Some((_, previous)) if now <= previous => previous + 1,
            _ => now,
        };
        self.last = Some((Instant::now(), token));
        token
    }
}

fn wall_clock_nanos() -> u128 {
    // timestamp_nanos_opt is None past the year 2262; a pre-epoch clock is negative
    Utc::now()
        .timestamp_nanos_opt()
        .and_then(|nanos| u128::try_from(nanos).ok())
        .unwrap_or_default()
}

/// Deterministic counter clock. Never sleeps.
#[derive(Debug, Clone)]
pub struct ManualClock {
    next: u128,
    step: u128,
}

impl ManualClock {
    /// Tokens `start`, `start + step`, `start + 2 * step`, ...
    ///
    /// A zero step is treated as one.
    pub fn new(start: u128, step: u128) -> Self {
        Self {
            next: start,
            step: step.max(1),
        }
    }
}

impl TokenClock for ManualClock {
    fn next_token(&mut self) -> u128 {
        let token = self.next;
        self.next += self.step;
        token
    }
}

/// Render a token the way it appears in file names: lowercase hex, no `0x`.
pub fn token_hex(token: u128) -> String {
    format!("{:x}", token)
}
