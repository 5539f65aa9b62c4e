//! Parsing of the `Expires` attribute, using the forgiving date algorithm
//! of [RFC 6265, section
//! 5.1.1](https://tools.ietf.org/html/rfc6265#section-5.1.1): the input is
//! chopped into tokens at delimiter runs, and the first tokens that look
//! like a time, a day, a month, and a year win, in whatever order they
//! appear.

use chrono::{DateTime, TimeZone, Utc};
use once_cell::sync::Lazy;

use crate::abnf::{alt, core::digit, repeat, seq, terminal, Match, Rule};

static TIME: Lazy<Rule<Vec<String>>> = Lazy::new(|| {
    seq(vec![
        digits(1, 2),
        terminal(":"),
        digits(1, 2),
        terminal(":"),
        digits(1, 2),
    ])
});

static MONTH: Lazy<Rule<u32>> = Lazy::new(|| {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];

    alt(MONTHS
        .iter()
        .enumerate()
        .map(|(index, name)| terminal(name).map(move |_| index as u32 + 1))
        .collect())
});

fn digits(min: usize, max: usize) -> Rule<String> {
    repeat(min, Some(max), digit()).map(|d| d.concat())
}

/// Delimiters separating date tokens.
fn is_delimiter(c: char) -> bool {
    matches!(c, '\x09' | '\x20'..='\x2F' | '\x3B'..='\x40' | '\x5B'..='\x60' | '\x7B'..='\x7E')
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().map_or(false, |c| c.is_ascii_digit())
}

/// Parse a cookie date string. Returns `None` if no valid date could be
/// extracted.
pub(crate) fn parse(input: &str) -> Option<DateTime<Utc>> {
    let mut time: Option<(u32, u32, u32)> = None;
    let mut day: Option<u32> = None;
    let mut month: Option<u32> = None;
    let mut year: Option<i32> = None;

    for token in input.split(is_delimiter).filter(|t| !t.is_empty()) {
        if time.is_none() {
            if let Some(t) = match_time(token) {
                time = Some(t);
                continue;
            }
        }

        if day.is_none() {
            if let Some(d) = match_day(token) {
                day = Some(d);
                continue;
            }
        }

        if month.is_none() {
            if let Some(m) = match_month(token) {
                month = Some(m);
                continue;
            }
        }

        if year.is_none() {
            if let Some(y) = match_year(token) {
                year = Some(y);
            }
        }
    }

    let (hour, minute, second) = time?;
    let (day, month, year) = (day?, month?, year?);

    if year < 1601 || hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    // Also rejects out-of-range days for the month.
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
}

fn match_time(token: &str) -> Option<(u32, u32, u32)> {
    match TIME.apply(token) {
        Match::Ok { remaining, value } if !starts_with_digit(remaining) => Some((
            value[0].parse().ok()?,
            value[2].parse().ok()?,
            value[4].parse().ok()?,
        )),
        _ => None,
    }
}

fn match_day(token: &str) -> Option<u32> {
    match digits(1, 2).apply(token) {
        Match::Ok { remaining, value } if !starts_with_digit(remaining) => value.parse().ok(),
        _ => None,
    }
}

fn match_month(token: &str) -> Option<u32> {
    MONTH.apply(token).ok().map(|(_, month)| month)
}

fn match_year(token: &str) -> Option<i32> {
    match digits(1, 4).apply(token) {
        Match::Ok { remaining, value } if !starts_with_digit(remaining) => {
            let year: i32 = value.parse().ok()?;

            match value.len() {
                // Two-digit years: 00-68 land in the 2000s, 69-99 in the
                // 1900s.
                2 if year <= 68 => Some(year + 2000),
                2 => Some(year + 1900),
                4 => Some(year),
                _ => None,
            }
        }
        _ => None,
    }
}
