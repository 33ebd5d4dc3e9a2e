//! Cut strategy planning and keyframe analysis module

pub mod keyframes;
pub mod strategy;

pub use keyframes::KeyframeIndex;
pub use strategy::plan_segments;
