//! Type node model for C declarations extracted from an AST dump.
//!
//! The type graph is arena-keyed: every distinct type in the dumped document
//! resolves to exactly one [`TypeId`] per build pass, so self-referential
//! structures (a linked-list struct pointing at itself through a field) are
//! plain index cycles instead of ownership cycles.

use serde::{Deserialize, Serialize};

/// Stable key of a type node inside a [`TypeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Owned store of every type node produced by one build pass.
///
/// Interior mutation is only performed while the builder runs; once a
/// [`TranslationUnit`] is returned the arena is read-only.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TypeArena {
    nodes: Vec<TypeNode>,
}

impl TypeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Allocates a slot that will be patched via [`TypeArena::set`] once the
    /// node's references have been resolved. Used for records, typedefs and
    /// function types, whose ids must be registered before their members are
    /// walked to break recursion on self-referential graphs.
    pub fn reserve(&mut self) -> TypeId {
        self.alloc(TypeNode::Unknown { tag: String::new() })
    }

    pub fn set(&mut self, id: TypeId, node: TypeNode) {
        self.nodes[id.index()] = node;
    }

    pub fn get(&self, id: TypeId) -> &TypeNode {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Peels typedef, qualifier and array wrappers until a terminal node is
    /// reached. Pointers are considered terminal: the caller decides whether
    /// to descend into a pointee.
    pub fn terminal(&self, id: TypeId) -> TypeId {
        let mut current = id;
        loop {
            let node = self.get(current);
            if matches!(node, TypeNode::Pointer { .. }) {
                return current;
            }
            match node.of_type() {
                Some(inner) => current = inner,
                None => return current,
            }
        }
    }
}

/// One C type-system concept. Closed over every kind the AST dumper emits;
/// consumers match exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeNode {
    /// Named primitive (`int`, `char`, `float`, ...); size and alignment in
    /// bits.
    Fundamental { name: String, size: u32, align: u32 },
    Pointer { pointee: TypeId },
    Array { element: TypeId },
    Record(RecordNode),
    Enum(EnumNode),
    Typedef {
        name: String,
        aliased: TypeId,
        location: Location,
    },
    FunctionType {
        returns: TypeId,
        arguments: Vec<FunctionTypeArgument>,
    },
    Const { inner: TypeId },
    Volatile { inner: TypeId },
    Restrict { inner: TypeId },
    /// Element kind the model has no representation for; keeps the original
    /// tag name for diagnostics.
    Unknown { tag: String },
    Unimplemented { type_class: String },
    UnimplementedDecl { kind: String },
}

impl TypeNode {
    /// Single wrapped type for the generic wrapper variants, `None` for
    /// terminal nodes. Lets one recursive routine peel qualifier, typedef,
    /// array and pointer layers without per-variant code.
    pub fn of_type(&self) -> Option<TypeId> {
        match self {
            TypeNode::Pointer { pointee } => Some(*pointee),
            TypeNode::Array { element } => Some(*element),
            TypeNode::Typedef { aliased, .. } => Some(*aliased),
            TypeNode::Const { inner }
            | TypeNode::Volatile { inner }
            | TypeNode::Restrict { inner } => Some(*inner),
            _ => None,
        }
    }
}

/// Aggregate flavor of a record declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Union,
    Class,
}

/// Struct/union/class declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordNode {
    pub kind: RecordKind,
    pub name: Option<String>,
    pub location: Location,
    pub fields: Vec<RecordField>,
    /// Declared but not defined (forward reference); an incomplete record
    /// cannot be instantiated.
    pub incomplete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordField {
    pub name: Option<String>,
    pub ty: TypeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumNode {
    pub name: Option<String>,
    pub size: u32,
    pub align: u32,
    pub values: Vec<EnumValue>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

/// Argument of an anonymous function type (e.g. a callback parameter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTypeArgument {
    pub ty: TypeId,
    pub variadic: bool,
}

/// File and line a declaration came from. `file == None` denotes a built-in
/// declaration with no source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: Option<String>,
    pub line: u32,
}

impl Location {
    pub fn builtin() -> Self {
        Self {
            file: None,
            line: 0,
        }
    }

    /// Whether the location falls under any of the excluded path prefixes.
    /// Built-in locations never match. Separators are normalized so Windows
    /// paths compare against POSIX-style prefixes.
    pub fn matches(&self, excludes: &[String]) -> bool {
        let Some(file) = &self.file else {
            return false;
        };

        let pathname = file.replace('\\', "/");

        excludes
            .iter()
            .any(|prefix| pathname.starts_with(&prefix.replace('\\', "/")))
    }
}

/// Named top-level function living in a namespace. Distinct from
/// [`TypeNode::FunctionType`], which is anonymous and structural.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionNode {
    pub name: Option<String>,
    pub returns: TypeId,
    pub arguments: Vec<FunctionArgument>,
    pub location: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionArgument {
    pub name: Option<String>,
    pub ty: TypeId,
    pub variadic: bool,
}

/// One namespace of the dumped document. `name == None` is the global
/// namespace. Immutable once the builder finishes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamespaceNode {
    pub name: Option<String>,
    /// Typedef ids in document order.
    pub types: Vec<TypeId>,
    /// Named functions in document order.
    pub functions: Vec<FunctionNode>,
}

impl NamespaceNode {
    pub fn is_global(&self) -> bool {
        self.name.is_none()
    }
}

/// Product of one build pass: the namespaces of the document plus the arena
/// their type references point into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub types: TypeArena,
    pub namespaces: Vec<NamespaceNode>,
}

impl TranslationUnit {
    pub fn global_namespace(&self) -> Option<&NamespaceNode> {
        self.namespaces.iter().find(|ns| ns.is_global())
    }
}
