pub mod model;

pub use model::{DayOfWeek, ProfileStatus, RunnerProfile};
