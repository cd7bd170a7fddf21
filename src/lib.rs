#[macro_use]
pub mod unwrap;

pub mod book;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod document;
pub mod errors;
pub mod geometry;
pub mod history;
pub mod logging;
pub mod spatial_index;
pub mod utils;
pub mod wires;

pub use book::DocumentSet;
pub use catalog::Catalog;
pub use codec::{decode, encode_document, encode_document_set, Decoded};
pub use document::Document;
pub use errors::{CodecError, DocumentError};
