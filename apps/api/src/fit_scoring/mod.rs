// Fit Scoring Engine
// Scores one candidate against one job on four weighted axes, with explainability,
// plus order-preserving batch scoring and stable ranking.

pub mod handlers;
pub mod models;
pub mod scorer;
