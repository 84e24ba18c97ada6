// Competency Signal Engine
// Turns a talent's multi-source evidence into scored, explainable per-skill signals.
// Pure pipeline: extractor → aggregator → composer. Handlers own persistence.

pub mod aggregator;
pub mod composer;
pub mod extractor;
pub mod generator;
pub mod handlers;
pub mod models;
pub mod sources;
pub mod weights;
