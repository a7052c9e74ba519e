//! `ars`: adaptive rejection sampling for univariate log-concave densities.
//!
//! Draws exact, independent samples from any univariate log-concave density
//! given only its unnormalized log-density; no derivative, no normalization
//! constant. The algorithm (Gilks & Wild, 1992) maintains piecewise-linear
//! upper and lower envelopes over a growing set of evaluation points, samples
//! proposals from the upper envelope, and refines both envelopes whenever a
//! proposal needs a direct density evaluation.
//!
//! Exposed modules:
//! - `ars`: the sampling driver (validation, initial mesh, accept/reject loop).
//! - `hull`: envelope construction, evaluation, and proposal sampling.

#![forbid(unsafe_code)]

pub mod ars;
pub mod hull;

pub use ars::{
    adaptive_rejection_sampling, adaptive_rejection_sampling_with_rng, ArsError,
    N_INITIAL_MESH_POINTS,
};
pub use hull::{
    compute_hulls, evaluate_hulls, sample_upper_hull, sample_upper_hull_with_rng,
    segment_log_prob, HullError, HullSegment,
};
