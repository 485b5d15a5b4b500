pub mod archive;
pub mod asset;
pub mod error;
pub mod extract;
pub mod http;
pub mod install;
pub mod platform;
pub mod runtime;
pub mod source;

pub use error::{Error, Result};
