//! Small statistics helpers for training reports.

pub mod descriptive;
