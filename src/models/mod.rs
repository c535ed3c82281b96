// src/models/mod.rs

pub mod answer;
pub mod assistant;
pub mod exam_record;
pub mod paper;
pub mod paper_question;
pub mod question;
pub mod statistics;
pub mod user;
