//! User-facing message templates and keyboards.
//!
//! Everything the bot says lives here so the dispatcher reads as flow
//! control and the tests can assert on stable fragments.

use crate::generator::GeneratorError;
use crate::onboarding::Step;
use crate::telegram::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const CALLBACK_BACK: &str = "onboarding:back";
pub const CALLBACK_ANSWER_PREFIX: &str = "answer:";
pub const CALLBACK_REVIEW_CONFIRM: &str = "review:confirm";
pub const CALLBACK_REVIEW_EDIT: &str = "review:edit";

pub fn welcome(first_name: &str) -> String {
    format!(
        "Hi {first_name}! I'm StrideCoach. I'll ask you a series of short questions, \
then build you a weekly training and nutrition plan.\n\
You can press Back (or send /back) to fix an earlier answer, and /cancel to stop."
    )
}

pub fn help_text() -> &'static str {
    "Here's what I understand:\n\
/start - begin (or restart) the questionnaire\n\
/back - return to the previous question\n\
/cancel - drop the current session\n\
/help - this message\n\
Everything else is read as your answer to the pending question."
}

pub fn no_session_hint() -> &'static str {
    "We're not in a questionnaire right now. Send /start and I'll set you up with a plan."
}

pub fn cancelled() -> &'static str {
    "Cancelled. Your answers are discarded; send /start whenever you want to begin again."
}

pub fn nothing_to_cancel() -> &'static str {
    "Nothing to cancel. Send /start to begin."
}

pub fn already_at_first_question() -> &'static str {
    "We're at the first question, there's nothing to go back to."
}

pub fn generating() -> &'static str {
    "That's everything I need. Give me a moment to put your plan together..."
}

pub fn review_prompt() -> &'static str {
    "How does this look? Confirm it and we're done, or tell me what to change."
}

pub fn edit_request_prompt() -> &'static str {
    "Tell me what should change and I'll rebuild the plan around it."
}

pub fn confirmed_farewell() -> &'static str {
    "Locked in. Your plan is saved, now go run it. Send /start any time for a fresh week."
}

pub fn plan_save_failed_note() -> &'static str {
    "(I couldn't save the plan just now, but here it is.)"
}

pub fn storage_apology() -> &'static str {
    "Sorry, I couldn't reach storage just now. Please try again in a moment."
}

pub fn retry_terminal_hint() -> &'static str {
    "Your answers are safe. Send any message and I'll try building the plan again."
}

pub fn previous_plan_stands() -> &'static str {
    "Your previous plan still stands. Confirm it, or ask for changes again."
}

pub fn generator_apology(err: &GeneratorError) -> String {
    match err {
        GeneratorError::MissingApiKey => {
            "Sorry, plan generation isn't configured on my end yet. Ask the operator to set the \
generator API key."
                .to_string()
        }
        GeneratorError::Timeout => {
            "Sorry, the plan generator took too long to answer. Please try again.".to_string()
        }
        GeneratorError::EmptyChoices | GeneratorError::Malformed(_) => {
            "Sorry, I got a plan I couldn't read back from the generator. Please try again."
                .to_string()
        }
        GeneratorError::Upstream { .. } | GeneratorError::Transport(_) => {
            "Sorry, the plan generator is having trouble right now. Please try again later."
                .to_string()
        }
    }
}

/// Keyboard shown with a questionnaire prompt: suggested answers stacked
/// vertically, a Back row beneath when a predecessor exists.
pub fn step_keyboard(step: Step) -> Option<InlineKeyboardMarkup> {
    let mut markup = InlineKeyboardMarkup::default();
    for suggestion in step.suggestions() {
        markup.push_row(vec![InlineKeyboardButton::callback(
            *suggestion,
            format!("{CALLBACK_ANSWER_PREFIX}{suggestion}"),
        )]);
    }
    if step.prev().is_some() {
        markup.push_row(vec![InlineKeyboardButton::callback("Back", CALLBACK_BACK)]);
    }
    if markup.is_empty() {
        None
    } else {
        Some(markup)
    }
}

pub fn review_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::row(vec![
        InlineKeyboardButton::callback("Looks good", CALLBACK_REVIEW_CONFIRM),
        InlineKeyboardButton::callback("Request changes", CALLBACK_REVIEW_EDIT),
    ])
}
