//! Dual-problem solvers

pub mod smo;

pub use self::smo::*;
