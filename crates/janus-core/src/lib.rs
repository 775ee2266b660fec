//! # JanusMC Core Library
//!
//! Equilibrium orientation and height of a rigid Janus ellipsoid straddling a flat
//! oil-water interface, found by Metropolis relaxation of an interfacial free energy.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless value types and pure functions: vector and
//!   quaternion algebra, the analytic plane-ellipsoid intersection area, the discretized
//!   particle surface and the free-energy functional.
//!
//! - **[`engine`]: The Logic Core.** The stateful `EllipsoidModel` with its cached wetted
//!   areas and Metropolis step, the lock-guarded `SharedModel` that external viewers sample
//!   from, the seedable random source and the background run controller.
//!
//! - **[`workflows`]: The Public API.** Complete procedures built on the engine, such as a
//!   relaxation run that reports observables at a fixed interval.

pub mod core;
pub mod engine;
pub mod workflows;
