mod analysis;
pub mod timeline;
