//! Lowering of a CastXML document into the ffigen-core type node model.

use crate::document::CastXmlDocument;
use crate::error::{CastXmlError, Result};
use ffigen_core::node::{
    EnumNode, EnumValue, FunctionArgument, FunctionNode, FunctionTypeArgument, Location,
    NamespaceNode, RecordField, RecordKind, RecordNode, TranslationUnit, TypeArena, TypeId,
    TypeNode,
};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

type XmlNode<'d, 'input> = roxmltree::Node<'d, 'input>;

const BUILTIN_FILE_NAME: &str = "<builtin>";

/// Reads and builds a CastXML file into a [`TranslationUnit`].
pub fn parse_file(path: impl AsRef<Path>) -> Result<TranslationUnit> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(CastXmlError::FileNotFound(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path)?;
    parse_str(&text)
}

/// Builds a CastXML document given as a string into a [`TranslationUnit`].
pub fn parse_str(text: &str) -> Result<TranslationUnit> {
    let doc = CastXmlDocument::parse(text)?;
    Builder::new(&doc).build()
}

/// Single-pass builder resolving id references into arena-keyed type nodes.
///
/// Two memo tables (id → type, id → file name) guarantee that every id
/// resolves to exactly one node per pass: a record or typedef registers its
/// arena slot *before* its referenced types are walked, which terminates
/// recursion on self-referential structures. One builder serves one pass;
/// concurrent callers each use their own.
pub struct Builder<'d, 'input> {
    root: XmlNode<'d, 'input>,
    index: HashMap<&'d str, XmlNode<'d, 'input>>,
    types: HashMap<&'d str, TypeId>,
    files: HashMap<String, Option<String>>,
    arena: TypeArena,
}

impl<'d, 'input> Builder<'d, 'input> {
    pub fn new(doc: &'d CastXmlDocument<'input>) -> Self {
        Self {
            root: doc.root(),
            index: doc.index(),
            types: HashMap::new(),
            files: HashMap::new(),
            arena: TypeArena::new(),
        }
    }

    /// Lowers every `Namespace` element found anywhere in the document, in
    /// document order.
    pub fn build(mut self) -> Result<TranslationUnit> {
        let namespace_elements: Vec<_> = self
            .root
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == "Namespace")
            .collect();

        let mut namespaces = Vec::with_capacity(namespace_elements.len());
        for element in namespace_elements {
            namespaces.push(self.lower_namespace(element)?);
        }

        Ok(TranslationUnit {
            types: self.arena,
            namespaces,
        })
    }

    fn lower_namespace(&mut self, el: XmlNode<'d, 'input>) -> Result<NamespaceNode> {
        // CastXML spells the global namespace "::".
        let name = el
            .attribute("name")
            .filter(|n| !n.is_empty() && *n != "::")
            .map(String::from);

        let mut namespace = NamespaceNode {
            name,
            types: vec![],
            functions: vec![],
        };

        for id in el.attribute("members").unwrap_or("").split_whitespace() {
            let member = self.element_by_id(id)?;

            match member.tag_name().name() {
                "Function" => {
                    let function = self.lower_function(member)?;

                    // Skip anonymous global functions
                    if function.name.is_some() {
                        namespace.functions.push(function);
                    }
                }
                "Typedef" => {
                    let typedef = self.resolve_type(member)?;
                    namespace.types.push(typedef);
                }
                _ => {}
            }
        }

        Ok(namespace)
    }

    fn lower_function(&mut self, el: XmlNode<'d, 'input>) -> Result<FunctionNode> {
        let name = self.optional_name(el);
        let mut arguments: Vec<FunctionArgument> = vec![];

        for child in el.children().filter(|c| c.is_element()) {
            match child.tag_name().name() {
                "Argument" => {
                    let ty = self.argument_type(child)?;
                    arguments.push(FunctionArgument {
                        name: self.optional_name(child),
                        ty,
                        variadic: false,
                    });
                }
                "Ellipsis" => match arguments.last_mut() {
                    Some(argument) => argument.variadic = true,
                    None => {
                        return Err(CastXmlError::DanglingEllipsis(
                            self.describe(el).to_string(),
                        ))
                    }
                },
                _ => {}
            }
        }

        let returns = self.type_attr(el, "returns")?;
        let location = self.location_of(el)?;

        Ok(FunctionNode {
            name,
            returns,
            arguments,
            location,
        })
    }

    fn resolve_type(&mut self, el: XmlNode<'d, 'input>) -> Result<TypeId> {
        if let Some(id) = el.attribute("id") {
            if let Some(existing) = self.types.get(id) {
                return Ok(*existing);
            }
        }

        match el.tag_name().name() {
            "Typedef" => self.lower_typedef(el),
            "Struct" => self.lower_record(el, RecordKind::Struct),
            "Union" => self.lower_record(el, RecordKind::Union),
            "Class" => self.lower_record(el, RecordKind::Class),
            "Enumeration" => self.lower_enum(el),
            "FunctionType" => self.lower_function_type(el),
            "FundamentalType" => {
                let name = self.required_attr(el, "name")?.to_string();
                let node = TypeNode::Fundamental {
                    name,
                    size: attr_u32(el, "size", 0),
                    align: attr_u32(el, "align", 0),
                };
                Ok(self.memoize(el, node))
            }
            "PointerType" => {
                let pointee = self.type_attr(el, "type")?;
                Ok(self.memoize(el, TypeNode::Pointer { pointee }))
            }
            "ArrayType" => {
                let element = self.type_attr(el, "type")?;
                Ok(self.memoize(el, TypeNode::Array { element }))
            }
            "CvQualifiedType" => self.lower_cv_qualified(el),
            "Unimplemented" => {
                let node = match el.attribute("kind").filter(|k| !k.is_empty()) {
                    Some(kind) => TypeNode::UnimplementedDecl {
                        kind: kind.to_string(),
                    },
                    None => TypeNode::Unimplemented {
                        type_class: el.attribute("type_class").unwrap_or("").to_string(),
                    },
                };
                Ok(self.memoize(el, node))
            }
            // A typedef/elaborated reference forwards to its underlying type
            // instead of allocating a competing node.
            "ElaboratedType" => {
                let target = self.type_attr(el, "type")?;
                if let Some(id) = el.attribute("id") {
                    self.types.insert(id, target);
                }
                Ok(target)
            }
            other => {
                debug!(tag = other, "no model for element kind, degrading");
                Ok(self.memoize(
                    el,
                    TypeNode::Unknown {
                        tag: other.to_string(),
                    },
                ))
            }
        }
    }

    fn lower_typedef(&mut self, el: XmlNode<'d, 'input>) -> Result<TypeId> {
        let name = self.required_attr(el, "name")?.to_string();

        // Register the slot before walking the aliased type.
        let slot = self.reserve(el);
        let aliased = self.type_attr(el, "type")?;
        let location = self.location_of(el)?;

        self.arena.set(
            slot,
            TypeNode::Typedef {
                name,
                aliased,
                location,
            },
        );
        Ok(slot)
    }

    fn lower_record(&mut self, el: XmlNode<'d, 'input>, kind: RecordKind) -> Result<TypeId> {
        let name = self.optional_name(el);
        let slot = self.reserve(el);
        let location = self.location_of(el)?;
        let incomplete = el.attribute("incomplete") == Some("1");

        let mut fields = vec![];
        for id in el.attribute("members").unwrap_or("").split_whitespace() {
            let member = self.element_by_id(id)?;

            // Member lists interleave fields with methods and other kinds the
            // model does not support.
            if member.tag_name().name() != "Field" {
                continue;
            }

            let ty = self.type_attr(member, "type")?;
            fields.push(RecordField {
                name: self.optional_name(member),
                ty,
            });
        }

        self.arena.set(
            slot,
            TypeNode::Record(RecordNode {
                kind,
                name,
                location,
                fields,
                incomplete,
            }),
        );
        Ok(slot)
    }

    fn lower_enum(&mut self, el: XmlNode<'d, 'input>) -> Result<TypeId> {
        let name = self.optional_name(el);
        let location = self.location_of(el)?;

        let mut values = vec![];
        for child in el.children().filter(|c| c.is_element()) {
            if child.tag_name().name() != "EnumValue" {
                continue;
            }
            values.push(EnumValue {
                name: self.required_attr(child, "name")?.to_string(),
                value: child
                    .attribute("init")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
            });
        }

        let node = TypeNode::Enum(EnumNode {
            name,
            size: attr_u32(el, "size", 32),
            align: attr_u32(el, "align", 32),
            values,
            location,
        });
        Ok(self.memoize(el, node))
    }

    fn lower_function_type(&mut self, el: XmlNode<'d, 'input>) -> Result<TypeId> {
        let slot = self.reserve(el);
        let returns = self.type_attr(el, "returns")?;

        let mut arguments: Vec<FunctionTypeArgument> = vec![];
        for child in el.children().filter(|c| c.is_element()) {
            match child.tag_name().name() {
                "Argument" => {
                    let ty = self.argument_type(child)?;
                    arguments.push(FunctionTypeArgument {
                        ty,
                        variadic: false,
                    });
                }
                "Ellipsis" => match arguments.last_mut() {
                    Some(argument) => argument.variadic = true,
                    None => {
                        return Err(CastXmlError::DanglingEllipsis(
                            self.describe(el).to_string(),
                        ))
                    }
                },
                _ => {}
            }
        }

        self.arena
            .set(slot, TypeNode::FunctionType { returns, arguments });
        Ok(slot)
    }

    fn lower_cv_qualified(&mut self, el: XmlNode<'d, 'input>) -> Result<TypeId> {
        let mut ty = self.type_attr(el, "type")?;

        if el.attribute("restrict") == Some("1") {
            ty = self.arena.alloc(TypeNode::Restrict { inner: ty });
        }
        if el.attribute("volatile") == Some("1") {
            ty = self.arena.alloc(TypeNode::Volatile { inner: ty });
        }
        if el.attribute("const") == Some("1") {
            ty = self.arena.alloc(TypeNode::Const { inner: ty });
        }

        if let Some(id) = el.attribute("id") {
            self.types.insert(id, ty);
        }
        Ok(ty)
    }

    /// Resolves the type an `Argument` element references; an explicit
    /// `original_type` wins over `type`.
    fn argument_type(&mut self, el: XmlNode<'d, 'input>) -> Result<TypeId> {
        let id = match el.attribute("original_type").filter(|v| !v.is_empty()) {
            Some(original) => original,
            None => self.required_attr(el, "type")?,
        };
        self.type_by_id(id)
    }

    fn type_attr(&mut self, el: XmlNode<'d, 'input>, attribute: &str) -> Result<TypeId> {
        let id = self.required_attr(el, attribute)?;
        self.type_by_id(id)
    }

    fn type_by_id(&mut self, id: &str) -> Result<TypeId> {
        let el = self.element_by_id(id)?;
        self.resolve_type(el)
    }

    fn location_of(&mut self, el: XmlNode<'d, 'input>) -> Result<Location> {
        let Some(raw) = el.attribute("location") else {
            return Ok(Location::builtin());
        };

        let (file_id, line) = raw
            .split_once(':')
            .ok_or_else(|| CastXmlError::MalformedLocation(raw.to_string()))?;
        let line = line
            .parse()
            .map_err(|_| CastXmlError::MalformedLocation(raw.to_string()))?;
        let file = self.file_name_by_id(file_id)?;

        Ok(Location { file, line })
    }

    fn file_name_by_id(&mut self, id: &str) -> Result<Option<String>> {
        if let Some(name) = self.files.get(id) {
            return Ok(name.clone());
        }

        let el = self.element_by_id(id)?;
        let name = el
            .attribute("name")
            .filter(|n| !n.is_empty() && *n != BUILTIN_FILE_NAME)
            .map(String::from);

        self.files.insert(id.to_string(), name.clone());
        Ok(name)
    }

    fn required_attr(&self, el: XmlNode<'d, 'input>, attribute: &str) -> Result<&'d str> {
        el.attribute(attribute)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CastXmlError::MissingAttribute {
                tag: el.tag_name().name().to_string(),
                attribute: attribute.to_string(),
            })
    }

    fn element_by_id(&self, id: &str) -> Result<XmlNode<'d, 'input>> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| CastXmlError::UnresolvedId(id.to_string()))
    }

    fn memoize(&mut self, el: XmlNode<'d, 'input>, node: TypeNode) -> TypeId {
        let id = self.arena.alloc(node);
        if let Some(xml_id) = el.attribute("id") {
            self.types.insert(xml_id, id);
        }
        id
    }

    fn reserve(&mut self, el: XmlNode<'d, 'input>) -> TypeId {
        let slot = self.arena.reserve();
        if let Some(xml_id) = el.attribute("id") {
            self.types.insert(xml_id, slot);
        }
        slot
    }

    fn optional_name(&self, el: XmlNode<'d, 'input>) -> Option<String> {
        el.attribute("name")
            .filter(|n| !n.is_empty())
            .map(String::from)
    }

    fn describe(&self, el: XmlNode<'d, 'input>) -> &str {
        el.attribute("name")
            .or_else(|| el.attribute("id"))
            .unwrap_or("<anonymous>")
    }
}

fn attr_u32(el: XmlNode<'_, '_>, name: &str, default: u32) -> u32 {
    el.attribute(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const POINT_DOC: &str = r#"
        <CastXML format="1.4.0">
          <Namespace id="_1" name="::" members="_5 _6"/>
          <FundamentalType id="_2" name="int" size="32" align="32"/>
          <Struct id="_3" name="Point" location="f0:1" members="_10 _11"/>
          <Field id="_10" name="x" type="_2"/>
          <Field id="_11" name="y" type="_2"/>
          <Typedef id="_5" name="Point" type="_3" location="f0:1"/>
          <Function id="_6" name="make_point" returns="_5" location="f0:3">
            <Argument name="x" type="_2"/>
            <Argument name="y" type="_2"/>
          </Function>
          <File id="f0" name="point.h"/>
        </CastXML>
    "#;

    #[test]
    fn builds_global_namespace_in_document_order() {
        let unit = parse_str(POINT_DOC).unwrap();

        assert_eq!(unit.namespaces.len(), 1);
        let ns = &unit.namespaces[0];
        assert!(ns.is_global());
        assert_eq!(ns.types.len(), 1);
        assert_eq!(ns.functions.len(), 1);

        let TypeNode::Typedef { name, aliased, location } = unit.types.get(ns.types[0]) else {
            panic!("expected a typedef");
        };
        assert_eq!(name, "Point");
        assert_eq!(location.file.as_deref(), Some("point.h"));

        let TypeNode::Record(record) = unit.types.get(*aliased) else {
            panic!("expected a record");
        };
        assert_eq!(record.kind, RecordKind::Struct);
        assert_eq!(record.fields.len(), 2);
        assert_eq!(record.fields[0].name.as_deref(), Some("x"));

        let function = &ns.functions[0];
        assert_eq!(function.name.as_deref(), Some("make_point"));
        assert_eq!(function.arguments.len(), 2);
        assert_eq!(function.returns, ns.types[0]);
    }

    #[test]
    fn repeated_references_share_one_node() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5 _6"/>
              <Struct id="_3" name="Buffer" location="f0:1" members=""/>
              <Typedef id="_5" name="Buffer" type="_3" location="f0:1"/>
              <Typedef id="_6" name="BufferAlias" type="_3" location="f0:2"/>
              <File id="f0" name="buf.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let ns = &unit.namespaces[0];
        let first = unit.types.get(ns.types[0]).of_type().unwrap();
        let second = unit.types.get(ns.types[1]).of_type().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn self_referential_struct_terminates() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5"/>
              <Struct id="_3" name="node" location="f0:1" members="_10"/>
              <Field id="_10" name="next" type="_4"/>
              <PointerType id="_4" type="_3"/>
              <Typedef id="_5" name="node_t" type="_3" location="f0:4"/>
              <File id="f0" name="list.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let record_id = unit.types.get(unit.namespaces[0].types[0]).of_type().unwrap();
        let TypeNode::Record(record) = unit.types.get(record_id) else {
            panic!("expected a record");
        };
        let TypeNode::Pointer { pointee } = unit.types.get(record.fields[0].ty) else {
            panic!("expected a pointer field");
        };
        assert_eq!(*pointee, record_id);
    }

    #[test]
    fn elaborated_type_forwards_to_target() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5 _6"/>
              <Struct id="_3" name="Opaque" location="f0:1" members=""/>
              <ElaboratedType id="_4" type="_3"/>
              <Typedef id="_5" name="A" type="_3" location="f0:2"/>
              <Typedef id="_6" name="B" type="_4" location="f0:3"/>
              <File id="f0" name="o.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let ns = &unit.namespaces[0];
        let direct = unit.types.get(ns.types[0]).of_type().unwrap();
        let forwarded = unit.types.get(ns.types[1]).of_type().unwrap();
        assert_eq!(direct, forwarded);
    }

    #[test]
    fn cv_qualifiers_wrap_in_order() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5"/>
              <FundamentalType id="_2" name="char" size="8" align="8"/>
              <CvQualifiedType id="_3" type="_2" const="1" volatile="1"/>
              <Typedef id="_5" name="cvchar" type="_3" location="f0:1"/>
              <File id="f0" name="q.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let qualified = unit.types.get(unit.namespaces[0].types[0]).of_type().unwrap();
        let TypeNode::Const { inner } = unit.types.get(qualified) else {
            panic!("expected const wrapper outermost");
        };
        let TypeNode::Volatile { inner } = unit.types.get(*inner) else {
            panic!("expected volatile under const");
        };
        assert!(matches!(
            unit.types.get(*inner),
            TypeNode::Fundamental { name, .. } if name == "char"
        ));
    }

    #[test]
    fn ellipsis_marks_last_argument_variadic() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_6"/>
              <FundamentalType id="_2" name="int" size="32" align="32"/>
              <FundamentalType id="_7" name="char" size="8" align="8"/>
              <PointerType id="_8" type="_7"/>
              <Function id="_6" name="printf_like" returns="_2" location="f0:1">
                <Argument name="fmt" type="_8"/>
                <Ellipsis/>
              </Function>
              <File id="f0" name="p.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let function = &unit.namespaces[0].functions[0];
        assert_eq!(function.arguments.len(), 1);
        assert!(function.arguments[0].variadic);
    }

    #[test]
    fn ellipsis_without_argument_is_fatal() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_6"/>
              <FundamentalType id="_2" name="int" size="32" align="32"/>
              <Function id="_6" name="broken" returns="_2" location="f0:1">
                <Ellipsis/>
              </Function>
              <File id="f0" name="b.h"/>
            </CastXML>
        "#;
        let err = parse_str(doc).unwrap_err();
        assert!(matches!(err, CastXmlError::DanglingEllipsis(name) if name == "broken"));
    }

    #[test]
    fn unresolved_reference_is_fatal() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5"/>
              <Typedef id="_5" name="broken" type="_404" location="f0:1"/>
              <File id="f0" name="b.h"/>
            </CastXML>
        "#;
        let err = parse_str(doc).unwrap_err();
        assert!(matches!(err, CastXmlError::UnresolvedId(id) if id == "_404"));
    }

    #[test]
    fn unmodeled_tags_degrade_to_unknown() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5"/>
              <Method id="_9" name="weird"/>
              <Typedef id="_5" name="odd" type="_9" location="f0:1"/>
              <File id="f0" name="w.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let aliased = unit.types.get(unit.namespaces[0].types[0]).of_type().unwrap();
        assert!(matches!(
            unit.types.get(aliased),
            TypeNode::Unknown { tag } if tag == "Method"
        ));
    }

    #[test]
    fn record_members_skip_non_field_kinds() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5"/>
              <FundamentalType id="_2" name="int" size="32" align="32"/>
              <Struct id="_3" name="s" location="f0:1" members="_10 _11 _12"/>
              <Field id="_10" name="a" type="_2"/>
              <Method id="_11" name="m"/>
              <Field id="_12" name="b" type="_2"/>
              <Typedef id="_5" name="s_t" type="_3" location="f0:4"/>
              <File id="f0" name="s.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let record_id = unit.types.get(unit.namespaces[0].types[0]).of_type().unwrap();
        let TypeNode::Record(record) = unit.types.get(record_id) else {
            panic!("expected a record");
        };
        let names: Vec<_> = record.fields.iter().map(|f| f.name.as_deref()).collect();
        assert_eq!(names, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn builtin_file_maps_to_no_location() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5"/>
              <FundamentalType id="_2" name="int" size="32" align="32"/>
              <Typedef id="_5" name="builtin_t" type="_2" location="f1:0"/>
              <File id="f1" name="&lt;builtin&gt;"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let TypeNode::Typedef { location, .. } = unit.types.get(unit.namespaces[0].types[0])
        else {
            panic!("expected a typedef");
        };
        assert_eq!(location.file, None);
    }

    #[test]
    fn incomplete_record_flag_is_kept() {
        let doc = r#"
            <CastXML format="1.4.0">
              <Namespace id="_1" name="::" members="_5"/>
              <Struct id="_3" name="fwd" location="f0:1" incomplete="1"/>
              <Typedef id="_5" name="fwd_t" type="_3" location="f0:2"/>
              <File id="f0" name="f.h"/>
            </CastXML>
        "#;
        let unit = parse_str(doc).unwrap();

        let record_id = unit.types.get(unit.namespaces[0].types[0]).of_type().unwrap();
        assert!(matches!(
            unit.types.get(record_id),
            TypeNode::Record(r) if r.incomplete
        ));
    }
}
