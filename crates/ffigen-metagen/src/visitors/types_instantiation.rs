//! The global type name registry: one arguments-set covering every name
//! accepted by `\Entrypoint::new()/cast()/type()`.

use std::collections::HashSet;

use ffigen_core::node::TypeNode;
use ffigen_core::php::{Arg, Expr, Stmt};

use super::{arguments_set, expected_arguments};
use crate::type_info::builtin_type_names;
use crate::visitor::{Member, MetadataVisitor, VisitCx};

pub struct TypesInstantiation;

impl MetadataVisitor for TypesInstantiation {
    type State = ();

    fn after(
        &self,
        cx: &VisitCx<'_>,
        members: &[Member<'_>],
        _state: &mut Self::State,
        out: &mut Vec<Stmt>,
    ) {
        let set_name = format!(
            "{}{}",
            cx.config.argument_set_prefix, cx.config.types_list_suffix
        );

        let mut args = vec![Arg::with_comment(
            Expr::Str(set_name.clone()),
            "List of available FFI type names".to_string(),
        )];
        let mut seen: HashSet<String> = HashSet::new();

        for name in builtin_type_names() {
            if seen.insert(name.to_string()) {
                args.push(Arg::new(Expr::Str(name.to_string())));
            }
        }

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

            let terminal = cx.unit.types.get(cx.unit.types.terminal(aliased));

            // Names without a usable definition are not creatable.
            match terminal {
                TypeNode::Unknown { .. }
                | TypeNode::Unimplemented { .. }
                | TypeNode::UnimplementedDecl { .. } => continue,
                TypeNode::Record(record)
                    if record.incomplete && !cx.config.include_incomplete =>
                {
                    continue
                }
                _ => {}
            }

            if !seen.insert(name.to_string()) {
                continue;
            }

            args.push(Arg::new(Expr::Str(name.to_string())));

            if matches!(terminal, TypeNode::Record(_)) {
                for pointers in 1..=cx.config.pointers_inheritance {
                    args.push(Arg::new(Expr::Str(format!(
                        "{name}{}",
                        "*".repeat(pointers)
                    ))));
                }
            }
        }

        out.push(Stmt::Expression(Expr::func_call(
            "registerArgumentsSet",
            args,
        )));

        for method in ["new", "cast", "type"] {
            out.push(Stmt::Expression(expected_arguments(
                cx,
                method,
                0,
                arguments_set(&set_name),
            )));
        }
    }
}
