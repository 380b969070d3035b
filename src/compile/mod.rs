pub mod compiler;
pub(crate) mod matte;
pub(crate) mod shapes;
pub(crate) mod transform;
