pub mod android;
pub mod diagnostics;
pub mod report;
pub mod search;
pub mod timeline;
