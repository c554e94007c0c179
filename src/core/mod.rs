// PlayLens - core/mod.rs
//
// Core business logic layer: line classification, the execution tree state
// machine, metrics, and report rendering.
// Must NOT depend on: app or platform, or touch the filesystem directly.

pub mod classifier;
pub mod clock;
pub mod context;
pub mod export;
pub mod metrics;
pub mod model;
pub mod render;
pub mod tree;
