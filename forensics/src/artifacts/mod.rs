pub(crate) mod android;
pub mod collection;
pub mod diagnostics;
mod error;
