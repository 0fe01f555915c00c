//! Chat-text renderer for plan documents.
//!
//! Deterministic output: the same document always renders to the same
//! string, and every section has an explicit empty-state line so a thin
//! generator response still reads like a finished message.

use chrono::NaiveDate;

use super::model::{MealDay, PlanDocument, TrainingDay};

/// Renders the plan the way it is delivered in chat.
pub fn render_plan(document: &PlanDocument, week_start: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Your week starting {}\n",
        week_start.format("%A, %-d %B")
    ));
    out.push('\n');

    out.push_str("Training\n");
    if document.training_days.is_empty() {
        out.push_str("  No sessions scheduled.\n");
    } else {
        for day in &document.training_days {
            render_training_day(&mut out, day);
        }
    }

    out.push('\n');
    out.push_str("Meals\n");
    if document.meal_plan.is_empty() {
        out.push_str("  No meal plan this week.\n");
    } else {
        for day in &document.meal_plan {
            render_meal_day(&mut out, day);
        }
    }

    if !document.shopping_list.is_empty() {
        out.push('\n');
        out.push_str("Shopping list\n");
        for item in &document.shopping_list {
            out.push_str(&format!("  - {item}\n"));
        }
    }

    let recommendations = document.recommendations.trim();
    if !recommendations.is_empty() {
        out.push('\n');
        out.push_str("Coach's notes\n");
        for line in recommendations.lines() {
            out.push_str(&format!("  {}\n", line.trim_end()));
        }
    }

    out
}

fn render_training_day(out: &mut String, day: &TrainingDay) {
    match &day.volume {
        Some(volume) if !volume.is_empty() => {
            out.push_str(&format!("  {} — {} ({})\n", day.day.label(), day.session, volume));
        }
        _ => out.push_str(&format!("  {} — {}\n", day.day.label(), day.session)),
    }
    for detail in &day.details {
        out.push_str(&format!("      {detail}\n"));
    }
}

fn render_meal_day(out: &mut String, day: &MealDay) {
    out.push_str(&format!("  {}\n", day.day.label()));
    for meal in &day.meals {
        out.push_str(&format!("      {meal}\n"));
    }
}
