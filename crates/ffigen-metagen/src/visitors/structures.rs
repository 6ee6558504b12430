//! Record layout classes mirroring struct/union definitions, so field
//! access through `\FFI\CData` values autocompletes.

use ffigen_core::node::{RecordKind, TypeNode};
use ffigen_core::php::{ClassDecl, Method, Property, Stmt, Visibility};

use super::record_name_kind;
use crate::visitor::{Member, MetadataVisitor, VisitCx};

pub struct Structures;

impl MetadataVisitor for Structures {
    type State = ();

    fn enter(
        &self,
        cx: &VisitCx<'_>,
        member: Member<'_>,
        _state: &mut Self::State,
        out: &mut Vec<Stmt>,
    ) {
        let Member::Typedef(id) = member else {
            return;
        };
        if cx.member_excluded(member) {
            return;
        }
        let Some((name, aliased, _)) = cx.typedef(id) else {
            return;
        };
        let TypeNode::Record(record) = cx.unit.types.get(aliased) else {
            return;
        };

        let qualified = cx.naming.name_for(name, record_name_kind(record.kind));
        let class_name = qualified.rsplit('\\').next().unwrap_or(&qualified);

        let kind_word = match record.kind {
            RecordKind::Struct => "structure",
            RecordKind::Union => "union",
            RecordKind::Class => "class",
        };

        let mut properties = Vec::with_capacity(record.fields.len());

        for (i, field) in record.fields.iter().enumerate() {
            let info = cx.info.get(cx.unit, field.ty);
            let doc_type = info.doc_type_string();

            properties.push(Property {
                name: field.name.clone().unwrap_or_else(|| format!("_{i}")),
                ty: info.php_type_string(),
                doc: (doc_type != "mixed").then(|| format!("@var {doc_type}")),
                readonly: info.const_,
            });
        }

        let constructor = Method {
            name: "__construct".to_string(),
            visibility: Visibility::Private,
            params: vec![],
            return_ty: None,
            doc: Some(format!(
                "@internal Please use {{@see \\{}::new()}} with '{name}' argument instead.",
                cx.naming.entrypoint()
            )),
            attributes: vec![],
        };

        out.push(Stmt::Class(ClassDecl {
            name: class_name.to_string(),
            is_final: true,
            extends: Some("\\FFI\\CData".to_string()),
            doc: Some(format!(
                "Generated \"{name}\" {kind_word} layout.\n\n@ignore\n@internal Internal interface to ensure precise type inference."
            )),
            properties,
            methods: vec![constructor],
        }));
    }
}
