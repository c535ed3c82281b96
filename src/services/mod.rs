// src/services/mod.rs

pub mod aggregation;
pub mod assistant;
pub mod grading;
pub mod submission;
