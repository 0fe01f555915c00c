//! Per-step input validation. A failed validation returns the diagnostic
//! to re-prompt with; it never advances the flow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::model::{DayOfWeek, ALL_DAYS};

use super::Step;

/// A validated answer, typed per step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Text(String),
    Integer(i64),
    Number(f64),
    Days(Vec<DayOfWeek>),
    Day(DayOfWeek),
}

/// Accumulated answers keyed by the step's field name. Ordered so the
/// serialized form (and the profile snapshot hash) is deterministic.
pub type AnswerMap = BTreeMap<&'static str, Answer>;

impl Answer {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Answer::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Answer::Number(value) => Some(*value),
            Answer::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_days(&self) -> Option<&[DayOfWeek]> {
        match self {
            Answer::Days(days) => Some(days),
            _ => None,
        }
    }

    pub fn as_day(&self) -> Option<DayOfWeek> {
        match self {
            Answer::Day(day) => Some(*day),
            _ => None,
        }
    }
}

/// Validates `input` for `step`. `answers` supplies cross-step context
/// (the long-run day must be one of the preferred days).
pub fn validate_answer(step: Step, input: &str, answers: &AnswerMap) -> Result<Answer, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("I need an answer to move on.".to_string());
    }
    match step {
        Step::Age => parse_integer(input, 10, 100, "years"),
        Step::SessionsPerWeek => parse_integer(input, 1, 14, "runs per week"),
        Step::MealsPerDay => parse_integer(input, 1, 8, "meals per day"),
        Step::SleepHours => parse_integer(input, 3, 14, "hours"),
        Step::Height => parse_number(input, 120.0, 230.0, "cm"),
        Step::Weight => parse_number(input, 30.0, 250.0, "kg"),
        Step::WeeklyVolume => parse_number(input, 0.0, 400.0, "km per week"),
        Step::PreferredDays => parse_day_set(input),
        Step::LongRunDay => parse_long_run_day(input, answers),
        _ => Ok(Answer::Text(input.to_string())),
    }
}

fn parse_integer(input: &str, min: i64, max: i64, unit: &str) -> Result<Answer, String> {
    let value: i64 = input
        .parse()
        .map_err(|_| format!("That doesn't look like a number. Digits only, in {unit}."))?;
    if value < min || value > max {
        return Err(format!(
            "That's outside the range I can work with ({min}\u{2013}{max} {unit})."
        ));
    }
    Ok(Answer::Integer(value))
}

fn parse_number(input: &str, min: f64, max: f64, unit: &str) -> Result<Answer, String> {
    let normalized = input.replace(',', ".");
    let value: f64 = normalized
        .parse()
        .map_err(|_| format!("That doesn't look like a number. For example: 72.5 ({unit})."))?;
    if !value.is_finite() || value < min || value > max {
        return Err(format!(
            "That's outside the range I can work with ({min}\u{2013}{max} {unit})."
        ));
    }
    Ok(Answer::Number(value))
}

fn parse_day_set(input: &str) -> Result<Answer, String> {
    let mut days = Vec::new();
    for token in input.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let day = DayOfWeek::parse(token).ok_or_else(|| {
            format!(
                "I didn't recognize \"{token}\" as a day. Use day names like {}.",
                example_days()
            )
        })?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        return Err(format!(
            "Give me at least one day, e.g. {}.",
            example_days()
        ));
    }
    // Present the set in calendar order regardless of input order.
    days.sort_by_key(|day| ALL_DAYS.iter().position(|d| d == day));
    Ok(Answer::Days(days))
}

fn parse_long_run_day(input: &str, answers: &AnswerMap) -> Result<Answer, String> {
    let day = DayOfWeek::parse(input)
        .ok_or_else(|| format!("I didn't recognize that day. Use a day name like {}.", example_days()))?;
    let preferred = answers
        .get(Step::PreferredDays.field())
        .and_then(Answer::as_days)
        .unwrap_or(&[]);
    if !preferred.contains(&day) {
        let listed = preferred
            .iter()
            .map(|d| d.label())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(format!(
            "{} isn't one of your training days ({listed}). Pick one of those.",
            day.label()
        ));
    }
    Ok(Answer::Day(day))
}

fn example_days() -> &'static str {
    "\"Mon, Wed, Sat\""
}
