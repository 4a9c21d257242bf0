//! Placement pipeline: requests, per-request seeding, the runner, observation events
//! and mask post-processing.
//!
//! Control flow of one run:
//! 1. build the [`crate::grid::Grid`] and analyze the height source once;
//! 2. resolve requests against the [`crate::rules::RuleTable`] and order them by priority;
//! 3. per request: score suitability, distribute with a request-local RNG, post-process.
//!
//! Requests never read each other's masks, so step 3 may run in parallel.
pub mod events;
pub mod postprocess;
pub mod request;
pub mod runner;
pub mod seed;
