pub mod report;
pub mod text;

pub use report::*;
pub use text::*;
