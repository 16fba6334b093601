//! Schedule cadence grammar
//!
//! A cadence is either a preset token (`@weekly`, `@daily`, ...) or a
//! five-field cron-like expression with extended syntax: lists, ranges and
//! steps, `L`/`last` and negative offsets in the day-of-month field, and
//! three-letter month and weekday names. Presets are case-sensitive
//! lowercase; cron field tokens are case-insensitive.
//!
//! Parsed with explicit token classes rather than one big pattern so each
//! grammar rule can be exercised in isolation.

use std::fmt;

use thiserror::Error;

/// Preset cadence tokens. Lowercase only; `@WEEKLY` is not a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Yearly,
    Annually,
    Monthly,
    Weekly,
    Daily,
    Midnight,
    Noon,
    Hourly,
}

impl Preset {
    fn from_token(token: &str) -> Option<Preset> {
        match token {
            "@yearly" => Some(Preset::Yearly),
            "@annually" => Some(Preset::Annually),
            "@monthly" => Some(Preset::Monthly),
            "@weekly" => Some(Preset::Weekly),
            "@daily" => Some(Preset::Daily),
            "@midnight" => Some(Preset::Midnight),
            "@noon" => Some(Preset::Noon),
            "@hourly" => Some(Preset::Hourly),
            _ => None,
        }
    }
}

/// One end of a value or range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronBound {
    Number(i32),
    /// `L` / `last`, the last day of the month.
    Last,
}

/// A single comma-separated entry within a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronItem {
    Any,
    Value(CronBound),
    Range(CronBound, CronBound),
}

/// A parsed cron field: its items plus an optional `/step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronField {
    pub items: Vec<CronItem>,
    pub step: Option<u32>,
}

/// A full five-field cron expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    pub minute: CronField,
    pub hour: CronField,
    pub day_of_month: CronField,
    pub month: CronField,
    pub day_of_week: CronField,
}

/// A validated schedule cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cadence {
    Preset(Preset),
    Cron(CronExpr),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CadenceError {
    #[error("cadence must be a preset or a 5-field cron expression, got {0} fields")]
    FieldCount(usize),

    #[error("invalid {field} field '{value}': {reason}")]
    Field {
        field: FieldKind,
        value: String,
        reason: String,
    },
}

/// Which of the five cron fields a token belongs to. Determines which named
/// tokens and offsets are admissible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Minute,
    Hour,
    DayOfMonth,
    Month,
    DayOfWeek,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Minute => "minute",
            FieldKind::Hour => "hour",
            FieldKind::DayOfMonth => "day of month",
            FieldKind::Month => "month",
            FieldKind::DayOfWeek => "day of week",
        };
        f.write_str(name)
    }
}

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

impl Cadence {
    /// Parse and validate a cadence string.
    pub fn parse(input: &str) -> Result<Cadence, CadenceError> {
        if let Some(preset) = Preset::from_token(input) {
            return Ok(Cadence::Preset(preset));
        }

        let fields: Vec<&str> = input.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CadenceError::FieldCount(fields.len()));
        }

        Ok(Cadence::Cron(CronExpr {
            minute: parse_field(FieldKind::Minute, fields[0])?,
            hour: parse_field(FieldKind::Hour, fields[1])?,
            day_of_month: parse_field(FieldKind::DayOfMonth, fields[2])?,
            month: parse_field(FieldKind::Month, fields[3])?,
            day_of_week: parse_field(FieldKind::DayOfWeek, fields[4])?,
        }))
    }

    /// Whether a string is a valid cadence.
    pub fn is_valid(input: &str) -> bool {
        Cadence::parse(input).is_ok()
    }
}

fn field_error(kind: FieldKind, value: &str, reason: impl Into<String>) -> CadenceError {
    CadenceError::Field {
        field: kind,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_field(kind: FieldKind, input: &str) -> Result<CronField, CadenceError> {
    let (body, step) = match input.split_once('/') {
        Some((body, step_str)) => {
            if step_str.is_empty() || !step_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(field_error(kind, input, "step must be a number"));
            }
            let step = step_str
                .parse()
                .map_err(|_| field_error(kind, input, "step is out of range"))?;
            (body, Some(step))
        }
        None => (input, None),
    };

    if body == "*" {
        return Ok(CronField {
            items: vec![CronItem::Any],
            step,
        });
    }

    if body.is_empty() {
        return Err(field_error(kind, input, "field is empty"));
    }

    let mut items = Vec::new();
    for part in body.split(',') {
        if part.is_empty() {
            return Err(field_error(kind, input, "empty list entry"));
        }
        items.push(parse_item(kind, input, part)?);
    }

    Ok(CronField { items, step })
}

fn parse_item(kind: FieldKind, field: &str, part: &str) -> Result<CronItem, CadenceError> {
    let (first, rest) = parse_bound(kind, field, part)?;

    if rest.is_empty() {
        return Ok(CronItem::Value(first));
    }

    let Some(rest) = rest.strip_prefix('-') else {
        return Err(field_error(
            kind,
            field,
            format!("unexpected trailing input in '{part}'"),
        ));
    };

    let (second, rest) = parse_bound(kind, field, rest)?;
    if !rest.is_empty() {
        return Err(field_error(
            kind,
            field,
            format!("unexpected trailing input in '{part}'"),
        ));
    }

    Ok(CronItem::Range(first, second))
}

/// Parse one bound off the front of `input`, returning the remainder.
///
/// Numbers are not range-checked beyond integer overflow, matching the
/// grammar the original scheduler accepted; named tokens and offsets are
/// restricted to the fields they belong to.
fn parse_bound<'a>(
    kind: FieldKind,
    field: &str,
    input: &'a str,
) -> Result<(CronBound, &'a str), CadenceError> {
    // Negative day-of-month offset, e.g. -1 is the last day.
    if let Some(after_sign) = input.strip_prefix('-') {
        if kind != FieldKind::DayOfMonth {
            return Err(field_error(
                kind,
                field,
                "negative offsets are only allowed in the day of month field",
            ));
        }
        let digits = leading_digits(after_sign);
        if digits.is_empty() {
            return Err(field_error(kind, field, "expected a number after '-'"));
        }
        let value: i32 = digits
            .parse()
            .map_err(|_| field_error(kind, field, "number is out of range"))?;
        return Ok((CronBound::Number(-value), &after_sign[digits.len()..]));
    }

    let digits = leading_digits(input);
    if !digits.is_empty() {
        let value: i32 = digits
            .parse()
            .map_err(|_| field_error(kind, field, "number is out of range"))?;
        return Ok((CronBound::Number(value), &input[digits.len()..]));
    }

    let word = leading_alphabetic(input);
    if word.is_empty() {
        return Err(field_error(
            kind,
            field,
            format!("unexpected character '{}'", input.chars().next().unwrap_or(' ')),
        ));
    }
    let rest = &input[word.len()..];
    let token = word.to_ascii_lowercase();

    match kind {
        FieldKind::DayOfMonth if token == "l" || token == "last" => Ok((CronBound::Last, rest)),
        FieldKind::Month => MONTH_NAMES
            .iter()
            .position(|name| *name == token)
            .map(|index| (CronBound::Number(index as i32 + 1), rest))
            .ok_or_else(|| field_error(kind, field, format!("unrecognized month name '{word}'"))),
        FieldKind::DayOfWeek => WEEKDAY_NAMES
            .iter()
            .position(|name| *name == token)
            .map(|index| (CronBound::Number(index as i32), rest))
            .ok_or_else(|| {
                field_error(kind, field, format!("unrecognized weekday name '{word}'"))
            }),
        _ => Err(field_error(
            kind,
            field,
            format!("unrecognized token '{word}'"),
        )),
    }
}

fn leading_digits(input: &str) -> &str {
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    &input[..end]
}

fn leading_alphabetic(input: &str) -> &str {
    let end = input
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(input.len());
    &input[..end]
}
