// Application layer - Use case orchestration

pub mod container;
pub mod trim_planner;

pub use container::AppContainer;
pub use trim_planner::{PlannerOptions, TrimPlanner};
