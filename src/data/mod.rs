//! Data loading and splitting

pub mod mnist;
pub mod split;

pub use self::mnist::*;
pub use self::split::*;
