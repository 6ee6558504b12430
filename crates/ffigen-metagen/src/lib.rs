//! ffigen-metagen: PhpStorm metadata generation from the ffigen type model.
//!
//! Walks a built [`ffigen_core::TranslationUnit`], infers PHP type
//! descriptions for every native type and runs a fixed pipeline of visitors
//! that emit the abstract statements of the `.phpstorm.meta.php` surface and
//! the external entrypoint interface.

pub mod generator;
pub mod type_info;
pub mod visitor;
pub mod visitors;

pub use generator::{GeneratorConfig, MetadataGenerator};
pub use type_info::{builtin_type_names, TypeInfo, TypeInfoGenerator};
pub use visitor::{Member, MetadataVisitor, VisitCx};
