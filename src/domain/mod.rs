// Domain layer - Core types of a trim

pub mod model;
