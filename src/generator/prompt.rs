//! Prompt composition and response parsing for the plan generator.

use crate::plans::model::PlanDocument;
use crate::profile::model::RunnerProfile;

use super::GeneratorError;

/// Fixes the coach persona and the exact document shape we parse back.
pub const SYSTEM_PROMPT: &str = "You are an expert running coach. Using the runner's \
profile, build a structured, motivating one-week training and nutrition plan. \
Respond with a single JSON object and nothing else, using exactly these keys: \
\"training_days\" (array of {\"day\", \"session\", \"volume\", \"details\"}; \"day\" is a \
lowercase weekday name like \"monday\", \"details\" is an array of short strings), \
\"meal_plan\" (array of {\"day\", \"meals\"}), \"shopping_list\" (array of strings), \
\"recommendations\" (string). Schedule training only on the runner's preferred days \
and put the long run on the requested day.";

/// Serializes the profile (and regeneration feedback, if any) into the
/// user-role message.
pub fn build_user_prompt(profile: &RunnerProfile, feedback: Option<&str>) -> String {
    let mut lines = vec!["Runner profile:".to_string()];
    lines.push(format!("- Name: {}", profile.name));
    push_opt(&mut lines, "Age", profile.age.map(|v| v.to_string()));
    push_opt(
        &mut lines,
        "Height",
        profile.height_cm.map(|v| format!("{v} cm")),
    );
    push_opt(
        &mut lines,
        "Weight",
        profile.weight_kg.map(|v| format!("{v} kg")),
    );
    push_opt(&mut lines, "Goal", profile.goal.clone());
    push_opt(&mut lines, "Target date", profile.target_date.clone());
    push_opt(&mut lines, "Experience", profile.experience.clone());
    push_opt(
        &mut lines,
        "Current weekly volume",
        profile.weekly_volume_km.map(|v| format!("{v} km")),
    );
    push_opt(
        &mut lines,
        "Runs per week",
        profile.sessions_per_week.map(|v| v.to_string()),
    );
    if !profile.preferred_days.is_empty() {
        let days = profile
            .preferred_days
            .iter()
            .map(|d| d.label())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("- Preferred training days: {days}"));
    }
    push_opt(
        &mut lines,
        "Long run day",
        profile.long_run_day.map(|d| d.label().to_string()),
    );
    push_opt(&mut lines, "Motivation", profile.motivation.clone());
    push_opt(&mut lines, "Injuries", profile.injuries.clone());
    push_opt(&mut lines, "Equipment", profile.equipment.clone());
    push_opt(
        &mut lines,
        "Dietary restrictions",
        profile.dietary_restrictions.clone(),
    );
    push_opt(
        &mut lines,
        "Meals per day",
        profile.meals_per_day.map(|v| v.to_string()),
    );
    push_opt(&mut lines, "Food dislikes", profile.food_dislikes.clone());
    push_opt(
        &mut lines,
        "Sleep",
        profile.sleep_hours.map(|v| format!("{v} h/night")),
    );
    push_opt(&mut lines, "Stress level", profile.stress_level.clone());
    push_opt(
        &mut lines,
        "Additional info",
        profile.additional_info.clone(),
    );

    if let Some(feedback) = feedback {
        lines.push(String::new());
        lines.push(
            "The runner reviewed the previous plan and asked for changes:".to_string(),
        );
        lines.push(feedback.to_string());
        lines.push("Produce a full replacement plan honoring this request.".to_string());
    }

    lines.join("\n")
}

fn push_opt(lines: &mut Vec<String>, label: &str, value: Option<String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            lines.push(format!("- {label}: {value}"));
        }
    }
}

/// Parses the assistant message content into a plan document.
///
/// Models wrap JSON in a code fence often enough that stripping one is part
/// of the contract; anything else that fails to parse is `Malformed`.
pub fn parse_plan_document(content: &str) -> Result<PlanDocument, GeneratorError> {
    let stripped = strip_code_fence(content.trim());
    serde_json::from_str(stripped).map_err(|err| GeneratorError::Malformed(err.to_string()))
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Drop the info string ("json") up to the first newline.
    let body = match rest.find('\n') {
        Some(index) => &rest[index + 1..],
        None => rest,
    };
    body.strip_suffix("```").map(str::trim).unwrap_or(body)
}
