pub mod config;
pub mod error;
pub mod kernel;
pub mod storage;
pub mod outputs;

// Convenience re-exports for the driver and tests
pub use config::EngineConfig;
pub use kernel::engine::Engine;
pub use kernel::reactor::Reactor;
