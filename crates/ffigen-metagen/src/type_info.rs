//! Inference of PHP type descriptions for native C types.
//!
//! Every query produces a [`TypeInfo`] holding two parallel descriptions: a
//! narrow runtime type set used for PHP type-checking, and a richer
//! documentation type expression used by tooling. Inference never fails;
//! unmodeled constructs degrade to `mixed`.

use ffigen_core::naming::{NameKind, NamingStrategy};
use ffigen_core::node::{RecordKind, TranslationUnit, TypeId, TypeNode};
use itertools::Itertools;

/// Bits of the natural platform integer on the PHP host.
const HOST_INT_BITS: u32 = 64;

/// Builtin C type spellings and their core type alias, in registration
/// order. These names are always accepted at FFI construction sites.
const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("void*", "void*"),
    ("bool", "bool"),
    ("float", "float"),
    ("double", "double"),
    ("long double", "double"),
    ("char", "char"),
    ("signed char", "int8_t"),
    ("unsigned char", "uint8_t"),
    ("short", "int16_t"),
    ("short int", "int16_t"),
    ("signed short", "int16_t"),
    ("short signed", "int16_t"),
    ("signed short int", "int16_t"),
    ("short signed int", "int16_t"),
    ("unsigned short", "uint16_t"),
    ("short unsigned", "uint16_t"),
    ("short unsigned int", "uint16_t"),
    ("int", "int32_t"),
    ("signed int", "int32_t"),
    ("unsigned int", "uint32_t"),
    ("long", "int32_t"),
    ("long int", "int32_t"),
    ("signed long", "int32_t"),
    ("long signed", "int32_t"),
    ("signed long int", "int32_t"),
    ("long signed int", "int32_t"),
    ("unsigned long", "uint32_t"),
    ("long unsigned", "uint32_t"),
    ("unsigned long int", "uint32_t"),
    ("long unsigned int", "uint32_t"),
    ("long long", "int64_t"),
    ("long long int", "int64_t"),
    ("signed long long", "int64_t"),
    ("long long signed", "int64_t"),
    ("signed long long int", "int64_t"),
    ("long long signed int", "int64_t"),
    ("unsigned long long", "uint64_t"),
    ("long long unsigned", "uint64_t"),
    ("unsigned long long int", "uint64_t"),
    ("long long unsigned int", "uint64_t"),
    ("intptr_t", "int64_t"),
    ("uintptr_t", "uint64_t"),
    ("size_t", "uint64_t"),
    ("ssize_t", "int64_t"),
    ("ptrdiff_t", "int64_t"),
    ("off_t", "int32_t"),
    ("va_list", "void*"),
    ("__builtin_va_list", "void*"),
    ("__gnuc_va_list", "void*"),
    ("int8_t", "int8_t"),
    ("uint8_t", "uint8_t"),
    ("int16_t", "int16_t"),
    ("uint16_t", "uint16_t"),
    ("int32_t", "int32_t"),
    ("uint32_t", "uint32_t"),
    ("int64_t", "int64_t"),
    ("uint64_t", "uint64_t"),
];

/// Builtin type names in registration order.
pub fn builtin_type_names() -> impl Iterator<Item = &'static str> {
    BUILTIN_TYPES.iter().map(|(name, _)| *name)
}

/// Inference result for one type query. Built fresh per query, collapsed
/// into final strings on demand.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeInfo {
    /// Narrow host-runtime type names; duplicates allowed until finalized.
    pub php_types: Vec<String>,
    /// Descriptive documentation type fragments.
    pub doc_types: Vec<String>,
    /// Whether the original type carried a const qualifier.
    pub const_: bool,
    /// Fully-qualified enum case references, populated only when the type
    /// resolves to an enum.
    pub expected_values: Vec<String>,
}

impl TypeInfo {
    pub fn add_type(&mut self, ty: &str) {
        self.add_php_type(ty);
        self.add_doc_type(ty);
    }

    pub fn add_php_type(&mut self, ty: &str) {
        let ty = ty.trim();
        if !ty.is_empty() {
            self.php_types.push(ty.to_string());
        }
    }

    pub fn add_doc_type(&mut self, ty: &str) {
        let ty = ty.trim();
        if !ty.is_empty() {
            self.doc_types.push(ty.to_string());
        }
    }

    pub fn add_expected_value(&mut self, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.expected_values.push(value.to_string());
        }
    }

    /// Collapses the narrow type set into one string: duplicates removed
    /// preserving first-seen order, `void` dropped unless it stands alone,
    /// `{null, T}` rendered as the `?T` shorthand, the empty set as `mixed`.
    pub fn php_type_string(&self) -> String {
        let mut types: Vec<&str> = self.php_types.iter().map(String::as_str).unique().collect();

        if types.len() > 1 {
            types.retain(|ty| *ty != "void");
        }

        if types.len() == 2 && types.contains(&"null") {
            if let Some(other) = types.iter().find(|ty| **ty != "null") {
                return format!("?{other}");
            }
        }

        if types.is_empty() {
            "mixed".to_string()
        } else {
            types.join("|")
        }
    }

    /// Collapses the documentation type set into one string. A doc set that
    /// adds no information beyond the narrow set renders as `mixed`.
    pub fn doc_type_string(&self) -> String {
        let types: Vec<&str> = self.doc_types.iter().map(String::as_str).unique().collect();
        let php_types: Vec<&str> = self.php_types.iter().map(String::as_str).unique().collect();

        if types.is_empty() || types == php_types {
            return "mixed".to_string();
        }

        types.join("|")
    }
}

/// The inference engine. Cheap to construct; one instance can serve any
/// number of queries.
pub struct TypeInfoGenerator<'a> {
    naming: &'a dyn NamingStrategy,
}

impl<'a> TypeInfoGenerator<'a> {
    pub fn new(naming: &'a dyn NamingStrategy) -> Self {
        Self { naming }
    }

    /// Infers the PHP type description of `ty` within `unit`.
    pub fn get(&self, unit: &TranslationUnit, ty: TypeId) -> TypeInfo {
        let mut info = TypeInfo::default();
        self.apply(unit, ty, &mut info);
        info
    }

    fn apply(&self, unit: &TranslationUnit, id: TypeId, info: &mut TypeInfo) {
        let arena = &unit.types;

        match arena.get(id) {
            TypeNode::Pointer { pointee } => {
                let pointee = *pointee;
                let terminal = arena.terminal(pointee);

                info.php_types = vec!["null".to_string(), "\\FFI\\CData".to_string()];
                info.doc_types = vec!["null".to_string()];

                // The pointee contributes its collapsed doc string only, not
                // its structural info, so pointer-to-self chains terminate.
                let child_doc = self.get(unit, pointee).doc_type_string();

                if child_doc != "mixed" {
                    info.add_doc_type("\\FFI\\CData");
                    // A pointer may denote a single value or an array of
                    // them; scalars get the cdata-wrapper shape, everything
                    // else the sequence shape.
                    match arena.get(terminal) {
                        TypeNode::Fundamental { .. } => {
                            info.add_doc_type(&format!("object{{cdata:{child_doc}}}"));
                        }
                        _ => info.add_doc_type(&format!("array{{{child_doc}}}")),
                    }
                } else {
                    info.add_doc_type("\\FFI\\CData");
                }

                match arena.get(terminal) {
                    // The "char*" looks like a string
                    TypeNode::Fundamental { name, .. } if name == "char" => {
                        info.php_types = vec!["string".to_string(), "\\FFI\\CData".to_string()];
                        info.doc_types = info.php_types.clone();
                    }
                    TypeNode::FunctionType { .. } => {
                        info.php_types = vec!["\\Closure".to_string(), "null".to_string()];
                        info.doc_types = vec![
                            "\\FFI\\CData".to_string(),
                            "null".to_string(),
                            child_doc,
                        ];
                    }
                    _ => {}
                }

                // A pointer straight at a record additionally surfaces the
                // record's own rules (e.g. an anonymous struct's shape).
                if matches!(arena.get(pointee), TypeNode::Record(_)) {
                    self.apply(unit, pointee, info);
                }
            }

            TypeNode::Typedef { name, aliased, .. } => {
                let aliased = *aliased;

                match arena.get(aliased) {
                    TypeNode::Enum(e) => {
                        info.add_php_type("int");
                        info.add_doc_type(&int_doc_block(e.size, false));

                        let enum_name = self.naming.name_for(name, NameKind::Enum);
                        info.add_doc_type(&format!("\\{enum_name}::*"));

                        for value in &e.values {
                            let case = self.naming.name_for(&value.name, NameKind::EnumValue);
                            info.add_expected_value(&format!("\\{enum_name}::{case}"));
                        }
                    }
                    TypeNode::Record(record) => {
                        info.add_php_type("\\FFI\\CData");
                        info.add_php_type("null");

                        let kind = record_name_kind(record.kind);
                        info.add_doc_type(&format!("\\{}", self.naming.name_for(name, kind)));
                    }
                    _ => {}
                }

                self.apply(unit, aliased, info);
            }

            TypeNode::Record(record) if record.name.is_none() => {
                info.add_php_type("\\FFI\\CData");
                info.add_php_type("null");

                let mut fields = vec![];
                for field in &record.fields {
                    // Do not add anonymous fields
                    let Some(field_name) = &field.name else {
                        continue;
                    };
                    let field_doc = self.get(unit, field.ty).doc_type_string();
                    fields.push(format!("{field_name}:{field_doc}"));
                }

                info.add_doc_type("null");
                info.add_doc_type(&format!("object{{{}}}", fields.join(", ")));
            }

            TypeNode::Fundamental { name, size, .. } => match name.as_str() {
                "void" => info.add_type("void"),
                "bool" => info.add_type("bool"),
                "float" | "double" | "long double" => info.add_type("float"),
                "char" => info.add_type("string"),
                "unsigned char" => {
                    info.add_php_type("int");
                    info.add_doc_type("int<0, 255>");
                }
                "signed char" => {
                    info.add_php_type("int");
                    info.add_doc_type("int<-128, 127>");
                }
                _ => {
                    info.add_php_type("int");
                    info.add_doc_type(&int_doc_block(*size, name.contains("unsigned")));
                }
            },

            TypeNode::FunctionType { returns, arguments } => {
                let return_doc = self.get(unit, *returns).doc_type_string();

                let argument_docs: Vec<String> = arguments
                    .iter()
                    .map(|argument| {
                        let mut doc = self.get(unit, argument.ty).doc_type_string();
                        if argument.variadic {
                            doc.push_str("...");
                        }
                        doc
                    })
                    .collect();

                info.add_php_type("\\Closure");
                info.add_doc_type(&format!(
                    "callable({}):({return_doc})",
                    argument_docs.join(", ")
                ));
            }

            // Arrays short-circuit; no other rule contributes.
            TypeNode::Array { element } => {
                let element_doc = self.get(unit, *element).doc_type_string();
                info.php_types = vec!["array".to_string()];
                info.doc_types = vec![format!("list<{element_doc}>")];
            }

            TypeNode::Const { inner } => {
                info.const_ = true;
                self.apply(unit, *inner, info);
            }
            TypeNode::Volatile { inner } | TypeNode::Restrict { inner } => {
                self.apply(unit, *inner, info);
            }

            // Named records and bare enums reached outside a typedef, plus
            // every unmodeled fallback, contribute nothing.
            TypeNode::Record(_)
            | TypeNode::Enum(_)
            | TypeNode::Unknown { .. }
            | TypeNode::Unimplemented { .. }
            | TypeNode::UnimplementedDecl { .. } => {}
        }
    }
}

/// `int<lo, hi>` expression for an integer of `size` bits.
fn int_doc_block(size: u32, unsigned: bool) -> String {
    let (lo, hi) = int_bounds(size, unsigned);
    format!("int<{lo}, {hi}>")
}

fn int_bounds(size: u32, unsigned: bool) -> (String, String) {
    if size == 0 || size >= HOST_INT_BITS {
        return if unsigned {
            ("0".to_string(), "max".to_string())
        } else {
            ("min".to_string(), "max".to_string())
        };
    }

    if unsigned {
        ("0".to_string(), (1u128 << size).to_string())
    } else {
        let half = 1i128 << (size - 1);
        ((-half).to_string(), (half - 1).to_string())
    }
}

fn record_name_kind(kind: RecordKind) -> NameKind {
    match kind {
        RecordKind::Struct => NameKind::Struct,
        RecordKind::Union => NameKind::Union,
        RecordKind::Class => NameKind::Class,
    }
}
