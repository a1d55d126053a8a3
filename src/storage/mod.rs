pub mod types;
pub mod store;
pub mod gateway;

pub use types::*;
pub use store::*;
pub use gateway::*;
