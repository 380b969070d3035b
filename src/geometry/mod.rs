pub mod affine;
pub mod ease;
pub mod path;
