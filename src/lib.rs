#![doc = include_str!("../README.md")]

pub mod array;
pub mod csv;
pub mod deserializer;
pub mod error;
pub mod flatten;
pub mod json;
pub mod options;
pub mod reader;

pub use crate::error::Error;
pub use crate::error::Result;
pub use crate::flatten::{flatten, flatten_prefixed, flatten_with};
pub use crate::options::ReaderOptions;
pub use crate::options::WriterOptions;
pub use crate::reader::Object;
pub use crate::reader::Value;
pub use crate::reader::ValueReader as Reader;

#[doc(hidden)]
pub use serde_json;
