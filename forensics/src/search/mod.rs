pub mod cancel;
pub mod deep;
pub mod error;
pub mod patterns;
pub mod representations;
