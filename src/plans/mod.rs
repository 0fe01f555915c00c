pub mod model;
pub mod render;

pub use model::{week_start_after, MealDay, PlanDocument, PlanRecord, TrainingDay};
pub use render::render_plan;
