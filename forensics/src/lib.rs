pub mod artifacts;
pub mod core;
pub mod decoder;
pub mod error;
mod output;
pub mod search;
pub mod source;
pub mod structs;
pub mod utils;
