//! Shared helper functions for CLI commands

use chrono::{Local, NaiveDate, NaiveDateTime};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};

use crate::core::summary::DateRange;

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Parse a `YYYY-MM-DD` date argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| miette::miette!("invalid date '{}': expected YYYY-MM-DD", s))
}

/// Parse a record timestamp: `YYYY-MM-DD HH:MM[:SS]` or a bare date at midnight
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    Ok(parse_date(s)
        .map_err(|_| miette::miette!("invalid date/time '{}': expected YYYY-MM-DD HH:MM", s))?
        .and_time(chrono::NaiveTime::MIN))
}

/// Build a date range from optional bounds
///
/// `to` defaults to today and `from` to `default_days` before `to`.
pub fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    default_days: u64,
) -> Result<DateRange> {
    let end = match to {
        Some(s) => parse_date(s)?,
        None => Local::now().date_naive(),
    };
    let range = match from {
        Some(s) => DateRange::new(parse_date(s)?, end),
        None => DateRange::last_days(end, default_days),
    };
    if range.start > range.end {
        return Err(miette::miette!(
            "start date {} is after end date {}",
            range.start,
            range.end
        ));
    }
    Ok(range)
}

/// One decimal place, "-" for unset readings
pub fn format_reading(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

/// Ask before a destructive action unless `--yes` was given
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}
