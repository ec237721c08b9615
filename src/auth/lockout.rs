//! Brute-force protection for the login endpoint.
//!
//! Three failed logins inside a trailing 24-hour window block the account for
//! 24 hours. The policy is a pure function of the stored state, the current
//! time and the password check; persisting the result is up to the caller.

use time::{Duration, OffsetDateTime};

pub const LOCKOUT_WINDOW: Duration = Duration::hours(24);
pub const BLOCK_DURATION: Duration = Duration::hours(24);
pub const MAX_FAILED_ATTEMPTS: usize = 3;

/// Lockout bookkeeping stored with each user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginAttempts {
    pub login_tries: Vec<OffsetDateTime>,
    pub blocked_until: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDecision {
    Allow,
    BadCredentials,
    Blocked { hours_left: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutOutcome {
    pub attempts: LoginAttempts,
    pub decision: LoginDecision,
    /// False when the attempt was rejected before touching the state.
    pub changed: bool,
}

/// Whole hours, rounded up.
fn hours_ceil(d: Duration) -> i64 {
    const HOUR_MS: i128 = 3_600_000;
    let ms = d.whole_milliseconds();
    ((ms + HOUR_MS - 1) / HOUR_MS) as i64
}

impl LoginAttempts {
    /// Remaining block time if the account is blocked at `now`.
    pub fn block_remaining(&self, now: OffsetDateTime) -> Option<Duration> {
        self.blocked_until
            .map(|until| until - now)
            .filter(|left| left.is_positive())
    }

    /// Runs one login attempt through the policy. `password_matches` is only
    /// called when the account is not blocked.
    pub fn evaluate<E>(
        &self,
        now: OffsetDateTime,
        password_matches: impl FnOnce() -> Result<bool, E>,
    ) -> Result<LockoutOutcome, E> {
        if let Some(left) = self.block_remaining(now) {
            return Ok(LockoutOutcome {
                attempts: self.clone(),
                decision: LoginDecision::Blocked {
                    hours_left: hours_ceil(left),
                },
                changed: false,
            });
        }

        let mut tries: Vec<OffsetDateTime> = self
            .login_tries
            .iter()
            .copied()
            .filter(|t| now - *t < LOCKOUT_WINDOW)
            .collect();

        if password_matches()? {
            return Ok(LockoutOutcome {
                attempts: LoginAttempts::default(),
                decision: LoginDecision::Allow,
                changed: true,
            });
        }

        tries.push(now);
        if tries.len() >= MAX_FAILED_ATTEMPTS {
            return Ok(LockoutOutcome {
                attempts: LoginAttempts {
                    login_tries: Vec::new(),
                    blocked_until: Some(now + BLOCK_DURATION),
                },
                decision: LoginDecision::Blocked {
                    hours_left: hours_ceil(BLOCK_DURATION),
                },
                changed: true,
            });
        }

        Ok(LockoutOutcome {
            attempts: LoginAttempts {
                login_tries: tries,
                blocked_until: None,
            },
            decision: LoginDecision::BadCredentials,
            changed: true,
        })
    }
}
