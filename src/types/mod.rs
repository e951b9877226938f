//! Data types for the execution grid.

mod column;
mod config;
mod filter;
mod row;
mod selection;

pub use column::*;
pub use config::*;
pub use filter::*;
pub use row::*;
pub use selection::*;
