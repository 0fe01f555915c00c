//! The onboarding questionnaire: a fixed total order of steps, each with
//! one pending question. Valid input advances to exactly one successor;
//! invalid input re-prompts; "back" jumps to the static predecessor.

pub mod session;
pub mod validate;

use serde::{Deserialize, Serialize};

pub use session::{ReviewStage, Session, SessionStore, Stage};
pub use validate::{validate_answer, Answer, AnswerMap};

/// The questionnaire steps, in the order they are asked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Name,
    Age,
    Height,
    Weight,
    Goal,
    TargetDate,
    Experience,
    WeeklyVolume,
    SessionsPerWeek,
    PreferredDays,
    LongRunDay,
    Motivation,
    Injuries,
    Equipment,
    Dietary,
    MealsPerDay,
    FoodDislikes,
    SleepHours,
    StressLevel,
    AdditionalInfo,
}

/// Static total order backing `next`/`prev`.
pub const STEP_ORDER: [Step; 20] = [
    Step::Name,
    Step::Age,
    Step::Height,
    Step::Weight,
    Step::Goal,
    Step::TargetDate,
    Step::Experience,
    Step::WeeklyVolume,
    Step::SessionsPerWeek,
    Step::PreferredDays,
    Step::LongRunDay,
    Step::Motivation,
    Step::Injuries,
    Step::Equipment,
    Step::Dietary,
    Step::MealsPerDay,
    Step::FoodDislikes,
    Step::SleepHours,
    Step::StressLevel,
    Step::AdditionalInfo,
];

impl Step {
    pub fn first() -> Self {
        STEP_ORDER[0]
    }

    fn position(self) -> usize {
        STEP_ORDER
            .iter()
            .position(|step| *step == self)
            .expect("every step appears in STEP_ORDER")
    }

    /// Linear successor; `None` after the last step (terminal action fires).
    pub fn next(self) -> Option<Self> {
        STEP_ORDER.get(self.position() + 1).copied()
    }

    /// Static predecessor; `None` at the first step.
    pub fn prev(self) -> Option<Self> {
        let position = self.position();
        if position == 0 {
            None
        } else {
            Some(STEP_ORDER[position - 1])
        }
    }

    /// Field name the answer is recorded under.
    pub fn field(self) -> &'static str {
        match self {
            Step::Name => "name",
            Step::Age => "age",
            Step::Height => "height_cm",
            Step::Weight => "weight_kg",
            Step::Goal => "goal",
            Step::TargetDate => "target_date",
            Step::Experience => "experience",
            Step::WeeklyVolume => "weekly_volume_km",
            Step::SessionsPerWeek => "sessions_per_week",
            Step::PreferredDays => "preferred_days",
            Step::LongRunDay => "long_run_day",
            Step::Motivation => "motivation",
            Step::Injuries => "injuries",
            Step::Equipment => "equipment",
            Step::Dietary => "dietary_restrictions",
            Step::MealsPerDay => "meals_per_day",
            Step::FoodDislikes => "food_dislikes",
            Step::SleepHours => "sleep_hours",
            Step::StressLevel => "stress_level",
            Step::AdditionalInfo => "additional_info",
        }
    }

    /// The question shown for this step.
    pub fn prompt(self) -> &'static str {
        match self {
            Step::Name => "Let's get you set up. What should I call you?",
            Step::Age => "How old are you?",
            Step::Height => "What's your height in centimeters?",
            Step::Weight => "What's your weight in kilograms?",
            Step::Goal => "What are you training for?",
            Step::TargetDate => {
                "Is there a race or target date? Tell me when, or say \"none\"."
            }
            Step::Experience => "How would you describe your running experience?",
            Step::WeeklyVolume => "Roughly how many kilometers do you run per week right now?",
            Step::SessionsPerWeek => "How many runs per week can you commit to?",
            Step::PreferredDays => {
                "Which days suit you for training? List them, e.g. \"Mon, Wed, Sat\"."
            }
            Step::LongRunDay => "Which of those days should carry the long run?",
            Step::Motivation => "What's driving you? A sentence or two helps me coach you.",
            Step::Injuries => "Any injuries or health issues I should plan around? Say \"none\" if not.",
            Step::Equipment => {
                "What do you have access to? Treadmill, gym, track, just the road?"
            }
            Step::Dietary => "Any dietary restrictions? Vegetarian, allergies, say \"none\" if not.",
            Step::MealsPerDay => "How many meals a day do you usually eat?",
            Step::FoodDislikes => "Any foods you'd rather not see in a meal plan?",
            Step::SleepHours => "How many hours do you sleep on a typical night?",
            Step::StressLevel => "How stressful is your life right now?",
            Step::AdditionalInfo => {
                "Last one: anything else I should know before I build your plan?"
            }
        }
    }

    /// Suggested answers rendered as inline buttons. Free text is always
    /// accepted too; these just save typing.
    pub fn suggestions(self) -> &'static [&'static str] {
        match self {
            Step::Goal => &[
                "5k",
                "10k",
                "Half marathon",
                "Marathon",
                "Weight loss",
                "General fitness",
            ],
            Step::Experience => &["Beginner", "Intermediate", "Advanced"],
            Step::StressLevel => &["Low", "Moderate", "High"],
            _ => &[],
        }
    }
}
