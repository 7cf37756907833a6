pub(crate) mod compression;
pub(crate) mod encoding;
pub mod error;
pub(crate) mod logging;
pub(crate) mod nom_helper;
pub(crate) mod regex_options;
pub(crate) mod strings;
pub(crate) mod temp;
pub mod time;
pub(crate) mod uuid;
mod wipetrace_toml;
