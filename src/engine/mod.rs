//! Segment execution engine module

pub mod hybrid;
pub mod workspace;

pub use hybrid::HybridExecutor;
pub use workspace::{StagedOutput, TrimWorkspace};
