//! Date shape and date comparison rules.
//!
//! `date`, `dateAll` and `dateTime` store the date they accepted in the
//! pass's [`DateCache`](crate::foundation::DateCache); `tillDate` and
//! `shouldOld` compare that reading when present and otherwise parse the
//! text themselves.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use tracing::trace;

use crate::foundation::{Outcome, RuleContext};
use crate::grammar::{DateFormat, RuleArg};

static DASHED_YEAR_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static SLASHED_YEAR_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").unwrap());
static SLASHED_YEAR_LAST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{1,2}):(\d{1,2})$").unwrap());

const MIN_YEAR: i32 = 1000;
const MAX_YEAR: i32 = 3000;

// ============================================================================
// PARSING
// ============================================================================

/// Reads `text` in `format`; `None` for a wrong shape or an impossible date.
pub fn parse_date(format: DateFormat, text: &str) -> Option<NaiveDate> {
    let (pattern, [year, month, day]) = match format {
        DateFormat::YearDayMonth => (&DASHED_YEAR_FIRST, [1, 3, 2]),
        DateFormat::YearDayMonthSlashed => (&SLASHED_YEAR_FIRST, [1, 3, 2]),
        DateFormat::MonthDayYear => (&SLASHED_YEAR_LAST, [3, 1, 2]),
        DateFormat::DayMonthYear => (&SLASHED_YEAR_LAST, [3, 2, 1]),
        DateFormat::YearMonthDay => (&DASHED_YEAR_FIRST, [1, 2, 3]),
    };
    let captures = pattern.captures(text.trim())?;
    let year: i32 = captures[year].parse().ok()?;
    let month: u32 = captures[month].parse().ok()?;
    let day: u32 = captures[day].parse().ok()?;
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let captures = TIME.captures(text.trim())?;
    let hour = captures[1].parse().ok()?;
    let minute = captures[2].parse().ok()?;
    let second = captures[3].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// The first of [`DateFormat::ALL`] that reads `text`.
fn parse_first(text: &str) -> Option<(DateFormat, NaiveDate)> {
    DateFormat::ALL
        .into_iter()
        .find_map(|format| parse_date(format, text).map(|date| (format, date)))
}

/// Best-effort reading for comparisons: ISO dates and date-times first,
/// then every layout `dateAll` accepts.
fn parse_any(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    for layout in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(date_time) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(date_time);
        }
    }
    parse_first(text).map(|(_, date)| date.and_time(NaiveTime::MIN))
}

/// The field's date as accepted earlier in the pass, or parsed from `text`.
fn field_date(text: &str, cx: &RuleContext<'_>) -> Option<NaiveDateTime> {
    cx.cached_date()
        .map(|cached| cached.to_date_time())
        .or_else(|| parse_any(text))
}

/// Whole years from `birth` to `today`.
fn age_in_years(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years
}

// ============================================================================
// SHAPE RULES
// ============================================================================

crate::text_rule! {
    /// A date in one layout, `YYYY-DD-MM` unless another token is given.
    pub Date;
    arg: DateFormat;
    check(text, arg, cx) {
        let format = match arg {
            RuleArg::DateFormat(format) => format.unwrap_or_default(),
            _ => DateFormat::default(),
        };
        Ok(match parse_date(format, text) {
            Some(date) => {
                let field = cx.field().to_owned();
                cx.dates().insert(&field, date);
                Outcome::Passed
            }
            None => Outcome::Failed,
        })
    }
}

crate::text_rule! {
    /// A date in any supported layout; the first layout that reads wins.
    pub DateAll;
    arg: None;
    check(text, arg, cx) {
        Ok(match parse_first(text) {
            Some((format, date)) => {
                trace!(field = %cx.field(), format = format.token(), "date layout matched");
                let field = cx.field().to_owned();
                cx.dates().insert(&field, date);
                Outcome::Passed
            }
            None => Outcome::Failed,
        })
    }
}

crate::text_rule! {
    /// A date followed by a space and `HH:MM:SS`.
    ///
    /// Without a format token the date part may use any layout `dateAll`
    /// accepts.
    pub DateTime;
    arg: DateFormat;
    check(text, arg, cx) {
        let Some((date, time)) = text.trim().split_once(' ') else {
            return Ok(Outcome::Failed);
        };
        let date = match arg {
            RuleArg::DateFormat(Some(format)) => parse_date(*format, date),
            _ => parse_first(date).map(|(_, date)| date),
        };
        let (Some(date), Some(time)) = (date, parse_time(time)) else {
            return Ok(Outcome::Failed);
        };
        let field = cx.field().to_owned();
        cx.dates().insert(&field, date);
        cx.dates().set_time(&field, time);
        Ok(Outcome::Passed)
    }
}

// ============================================================================
// COMPARISON RULES
// ============================================================================

crate::text_rule! {
    /// On or before the reference date.
    pub TillDate;
    arg: DateReference;
    check(text, arg, cx) {
        let RuleArg::DateReference(reference) = arg else {
            return Ok(Outcome::Failed);
        };
        let Some(limit) = reference.resolve(cx.now()) else {
            return Ok(Outcome::Failed);
        };
        Ok(field_date(text, cx).is_some_and(|date| date <= limit).into())
    }
}

crate::text_rule! {
    /// A birth date at least the argument's number of years ago.
    pub ShouldOld;
    arg: Number;
    check(text, arg, cx) {
        let (Some(birth), Some(years)) = (field_date(text, cx), arg.as_number()) else {
            return Ok(Outcome::Failed);
        };
        let age = age_in_years(birth.date(), cx.now().date());
        Ok((f64::from(age) >= years).into())
    }
}
