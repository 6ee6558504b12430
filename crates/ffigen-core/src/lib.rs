//! ffigen-core: language-neutral model of a C header's declarations.
//!
//! This crate holds the type node graph built from an AST dump, the
//! namespace/function declarations that reference it, the abstract PHP
//! statement model the metadata generators emit, and the naming policy
//! that maps raw C names onto generated PHP names.

pub mod naming;
pub mod node;
pub mod php;

pub use naming::{NameKind, NamingStrategy, SimpleNamingStrategy};
pub use node::{
    EnumNode, EnumValue, FunctionArgument, FunctionNode, FunctionTypeArgument, Location,
    NamespaceNode, RecordField, RecordKind, RecordNode, TranslationUnit, TypeArena, TypeId,
    TypeNode,
};
pub use php::GeneratedMetadata;
