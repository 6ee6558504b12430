//! Abstract PHP statement model emitted by the metadata generators.
//!
//! This is the contract with the pretty-printer collaborator: generators
//! produce ordered statement lists, a printer renders them to concrete PHP
//! syntax later. Only the node kinds the generators actually emit are
//! modeled.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Str(String),
    Int(i64),
    Array(Vec<ArrayItem>),
    FuncCall { name: String, args: Vec<Arg> },
    StaticCall { class: String, method: String, args: Vec<Arg> },
    ClassConstFetch { class: String, constant: String },
}

impl Expr {
    pub fn func_call(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Expr::FuncCall {
            name: name.into(),
            args,
        }
    }

    pub fn static_call(class: impl Into<String>, method: impl Into<String>) -> Self {
        Expr::StaticCall {
            class: class.into(),
            method: method.into(),
            args: vec![],
        }
    }
}

/// Call argument; `name` is a PHP named argument, `comment` a leading
/// line comment attached by the printer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
    pub comment: Option<String>,
}

impl Arg {
    pub fn new(value: Expr) -> Self {
        Self {
            name: None,
            value,
            comment: None,
        }
    }

    pub fn with_comment(value: Expr, comment: impl Into<String>) -> Self {
        Self {
            name: None,
            value,
            comment: Some(comment.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayItem {
    pub key: Option<String>,
    pub value: Expr,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: String,
    pub variadic: bool,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub visibility: Visibility,
    pub params: Vec<Param>,
    pub return_ty: Option<String>,
    pub doc: Option<String>,
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub ty: String,
    pub doc: Option<String>,
    pub readonly: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub is_final: bool,
    pub extends: Option<String>,
    pub doc: Option<String>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expression(Expr),
    Class(ClassDecl),
    Interface(InterfaceDecl),
}

/// A braced `namespace <name> { ... }` grouping of generated statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhpNamespace {
    pub name: String,
    pub stmts: Vec<Stmt>,
}

impl PhpNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stmts: vec![],
        }
    }
}

/// Final product of the generator pipeline: the IDE-internal helper
/// declarations and the external-facing declaration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedMetadata {
    pub internal: PhpNamespace,
    pub external: PhpNamespace,
}
