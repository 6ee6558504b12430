//! `override(\Entrypoint::new(0), map(['' => '\PHPSTORM_META\@', ...]))`
//! return type coercions for record typedefs.

use ffigen_core::naming::NameKind;
use ffigen_core::node::TypeNode;
use ffigen_core::php::{Arg, ArrayItem, Expr, Stmt};

use super::record_name_kind;
use crate::visitor::{Member, MetadataVisitor, VisitCx};

pub struct StructOverrides;

impl MetadataVisitor for StructOverrides {
    type State = ();

    fn after(
        &self,
        cx: &VisitCx<'_>,
        members: &[Member<'_>],
        _state: &mut Self::State,
        out: &mut Vec<Stmt>,
    ) {
        let placeholder = format!("\\{}", cx.naming.name_for("@", NameKind::Struct));

        let mut mappings = vec![ArrayItem {
            key: Some(String::new()),
            value: Expr::Str(placeholder),
            comment: Some("List of return type coercions".to_string()),
        }];

        for member in members {
            let Member::Typedef(id) = *member else {
                continue;
            };
            if cx.member_excluded(*member) {
                continue;
            }
            let Some((name, aliased, _)) = cx.typedef(id) else {
                continue;
            };
            let TypeNode::Record(record) = cx.unit.types.get(cx.unit.types.terminal(aliased))
            else {
                continue;
            };
            if record.incomplete && !cx.config.include_incomplete {
                continue;
            }

            let target = format!("\\{}", cx.naming.name_for(name, record_name_kind(record.kind)));

            mappings.push(mapping(name.to_string(), target.clone()));

            for pointers in 1..=cx.config.pointers_inheritance {
                for depth in 1..=pointers {
                    mappings.push(mapping(
                        format!("{name}{}", "*".repeat(pointers)),
                        format!("{target}{}", "[]".repeat(depth)),
                    ));
                }
            }
        }

        if cx.config.scalar_overrides {
            // TODO: scalar, enum and builtin coercion mappings
        }

        out.push(Stmt::Expression(Expr::func_call(
            "override",
            vec![
                Arg::new(Expr::StaticCall {
                    class: cx.entrypoint_ref(),
                    method: "new".to_string(),
                    args: vec![Arg::new(Expr::Int(0))],
                }),
                Arg::new(Expr::func_call(
                    "map",
                    vec![Arg::new(Expr::Array(mappings))],
                )),
            ],
        )));
    }
}

fn mapping(key: String, value: String) -> ArrayItem {
    ArrayItem {
        key: Some(key),
        value: Expr::Str(value),
        comment: None,
    }
}
