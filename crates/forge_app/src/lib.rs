//! Forge app: configuration, logging, and the frame loop that drives the
//! core state machine against the generation engine.
pub mod config;
pub mod effects;
pub mod logging;
pub mod render;
pub mod runner;
