//! # Core Module
//!
//! Stateless foundations shared by the engine: [`math`] provides the vector and quaternion
//! types, [`geometry`] the closed-form plane-ellipsoid intersection, and [`models`] the
//! particle description (surface grid, interaction parameters and wetted-area buckets).

pub mod geometry;
pub mod math;
pub mod models;
