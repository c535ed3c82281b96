// src/handlers/mod.rs

pub mod assistant;
pub mod auth;
pub mod exam;
pub mod papers;
pub mod questions;
pub mod statistics;
