//! Quality-control triage for diffusion-weighted MRI volumes.
//!
//! A run checks image geometry, diffusion information, slice-wise and
//! interlace-wise correlation and gradient-wise motion, drops gradients that
//! fail, and packs the verdicts into one status byte (see [`status::QcStatus`]).
//! The numeric filters are collaborators behind the traits in [`checkers`].

pub mod checkers;
pub mod cli;
pub mod ctx;
pub mod error;
pub mod geometry;
pub mod gradients;
pub mod io;
pub mod math;
pub mod pipeline;
pub mod protocol;
pub mod qc;
pub mod schema;
pub mod statistics;
pub mod status;
pub mod volume;
