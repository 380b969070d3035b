pub mod batch;
pub mod command;
pub mod emitter;
pub mod extract;
pub mod fingerprint;
pub mod probe;
pub mod space;
pub mod validate;
