// Domain layer - Core types, per-track failures and validation rules

pub mod errors;
pub mod model;
pub mod rules;
