//! Binary and multiclass SVM models

pub mod binary;
pub mod multiclass;

pub use self::binary::*;
pub use self::multiclass::*;
