use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::{distributions::Alphanumeric, thread_rng, Rng};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Generate a cryptographically secure random session token.
pub fn generate_session_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// How long a login lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDuration {
    /// 1 hour when "remember me" is unchecked
    Short,
    /// 30 days when "remember me" is checked
    Long,
}

impl SessionDuration {
    #[must_use]
    pub const fn from_remember_me(remember: bool) -> Self {
        if remember {
            Self::Long
        } else {
            Self::Short
        }
    }

    #[must_use]
    pub const fn as_seconds(&self) -> i64 {
        match self {
            Self::Short => 3600,
            Self::Long => 2_592_000,
        }
    }
}

/// Format a time the way SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ')` does, so
/// stored timestamps compare correctly as text.
#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Expiry timestamp for a session starting now.
#[must_use]
pub fn expiry_timestamp(duration: SessionDuration) -> String {
    format_timestamp(Utc::now() + Duration::seconds(duration.as_seconds()))
}

/// Accept a post-login redirect target only if it stays on this site.
#[must_use]
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    local.then_some(next)
}
