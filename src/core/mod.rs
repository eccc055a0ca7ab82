pub mod engine;
pub mod locks;
