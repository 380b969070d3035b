pub mod cache;
pub mod registry;
pub mod tessellate;
