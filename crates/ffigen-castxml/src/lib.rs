//! ffigen-castxml: CastXML integration for ffigen.
//!
//! This crate invokes the `castxml` AST dumper, loads the XML document it
//! produces and lowers it into the `ffigen-core` type node model.

pub mod builder;
pub mod document;
pub mod error;
pub mod process;

pub use builder::{parse_file, parse_str, Builder};
pub use document::CastXmlDocument;
pub use error::{CastXmlError, Result};
pub use process::{CastXml, DumpOptions};
