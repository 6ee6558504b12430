//! The external entrypoint interface: one typed method per exported
//! function.

use std::mem;

use ffigen_core::php::{
    Arg, ArrayItem, Attribute, Expr, InterfaceDecl, Method, Param, Stmt, Visibility,
};

use crate::type_info::TypeInfo;
use crate::visitor::{Member, MetadataVisitor, VisitCx};

pub struct ExportFunctions;

#[derive(Default)]
pub struct ExportFunctionsState {
    methods: Vec<Method>,
}

impl MetadataVisitor for ExportFunctions {
    type State = ExportFunctionsState;

    fn enter(
        &self,
        cx: &VisitCx<'_>,
        member: Member<'_>,
        state: &mut Self::State,
        _out: &mut Vec<Stmt>,
    ) {
        let Member::Function(function) = member else {
            return;
        };
        let Some(name) = &function.name else {
            return;
        };
        if cx.member_excluded(member) {
            return;
        }

        let mut tags = vec![];
        let mut params = Vec::with_capacity(function.arguments.len());

        for (i, argument) in function.arguments.iter().enumerate() {
            let param_name = argument
                .name
                .clone()
                .unwrap_or_else(|| format!("_{i}"));
            let info = cx.info.get(cx.unit, argument.ty);

            let doc_type = info.doc_type_string();
            if doc_type != "mixed" {
                // Closures cannot cross the FFI boundary; any callable is
                // accepted and converted.
                let doc_type = doc_type.replace("\\Closure", "callable");
                tags.push(format!("@param {doc_type} ${param_name}"));
            }

            let mut attributes = vec![];
            if !info.expected_values.is_empty() {
                attributes.push(expected_values_attribute(&info));
            }

            params.push(Param {
                name: param_name,
                ty: info.php_type_string(),
                variadic: argument.variadic,
                attributes,
            });
        }

        let returns = cx.info.get(cx.unit, function.returns);

        let return_doc = returns.doc_type_string();
        if return_doc != "mixed" {
            tags.push(format!("@return {return_doc}"));
        }

        let mut attributes = vec![];
        if !returns.expected_values.is_empty() {
            attributes.push(expected_values_attribute(&returns));
        }

        state.methods.push(Method {
            name: name.clone(),
            visibility: Visibility::Public,
            params,
            return_ty: Some(returns.php_type_string()),
            doc: (!tags.is_empty()).then(|| tags.join("\n")),
            attributes,
        });
    }

    fn after(
        &self,
        cx: &VisitCx<'_>,
        _members: &[Member<'_>],
        state: &mut Self::State,
        out: &mut Vec<Stmt>,
    ) {
        out.push(Stmt::Interface(InterfaceDecl {
            name: cx.naming.entrypoint_class_name().to_string(),
            methods: mem::take(&mut state.methods),
        }));
    }
}

/// `#[\JetBrains\PhpStorm\ExpectedValues(flags: [\Enum::CASE, ...])]`.
fn expected_values_attribute(info: &TypeInfo) -> Attribute {
    let items = info
        .expected_values
        .iter()
        .filter_map(|value| value.rsplit_once("::"))
        .map(|(class, constant)| ArrayItem {
            key: None,
            value: Expr::ClassConstFetch {
                class: class.to_string(),
                constant: constant.to_string(),
            },
            comment: None,
        })
        .collect();

    Attribute {
        name: "\\JetBrains\\PhpStorm\\ExpectedValues".to_string(),
        args: vec![Arg {
            name: Some("flags".to_string()),
            value: Expr::Array(items),
            comment: None,
        }],
    }
}
