//! # Engine Module
//!
//! The stateful half of the library: it owns a particle's pose and cached wetted areas
//! and relaxes them with a Metropolis random walk over height and orientation.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Builders for the model, the per-step proposal widths
//!   and complete relaxation runs
//! - **Model** ([`model`]) - `EllipsoidModel`, area accounting, energy and the elementary step
//! - **Sharing** ([`shared`], [`state`]) - Lock-guarded handle whose readers only ever see
//!   whole poses, and the copied-out `RigidBodyState` snapshot
//! - **Running** ([`runner`], [`cancel`]) - Cooperative cancellation and the background run
//!   controller that stages parameter edits while idle
//! - **Randomness** ([`random`]) - Seedable source of uniform and normal deviates
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Engine-specific error types
//!
//! ## Concurrency
//!
//! A single mutator steps the model; every elementary step runs inside one exclusive
//! critical section, so concurrent snapshot readers never observe a torn pose.

pub mod cancel;
pub mod config;
pub mod error;
pub mod model;
pub mod progress;
pub mod random;
pub mod runner;
pub mod shared;
pub mod state;
