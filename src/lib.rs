//! SkillNotes: question banks, free-text exams with fuzzy grading, attempt
//! history and XP badges, kept in a local key-value store.

pub mod app;
pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod exam;
pub mod grading;
pub mod growth;
pub mod help;
pub mod logging;
pub mod models;
pub mod profiles;
pub mod progress;
pub mod question_bank;
pub mod reports;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod tui;
pub mod ui;
pub mod workspace;
