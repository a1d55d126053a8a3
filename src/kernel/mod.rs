pub mod time;
pub mod event;
pub mod phase;
pub mod buffer;
pub mod classifier;
pub mod tracker;
pub mod debouncer;
pub mod consolidator;
pub mod effect;
pub mod engine;
pub mod reactor;
pub mod telemetry;
