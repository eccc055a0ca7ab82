pub mod engine;
pub mod locks;
pub mod period;
