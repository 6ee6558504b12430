//! `registerArgumentsSet('<prefix><enum>', \Enum::CASE, ...)` per enum
//! typedef.

use ffigen_core::naming::NameKind;
use ffigen_core::php::{Arg, Expr, Stmt};

use super::enum_set_name;
use crate::visitor::{Member, MetadataVisitor, VisitCx};

pub struct EnumArgumentsSet;

impl MetadataVisitor for EnumArgumentsSet {
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
        let Some((name, node)) = cx.enum_typedef(id) else {
            return;
        };

        let mut args = vec![Arg::with_comment(
            Expr::Str(enum_set_name(cx, name)),
            format!("List of \"{name}\" enum cases"),
        )];

        let class = format!("\\{}", cx.naming.name_for(name, NameKind::Enum));

        for value in &node.values {
            args.push(Arg::new(Expr::ClassConstFetch {
                class: class.clone(),
                constant: cx.naming.name_for(&value.name, NameKind::EnumValue),
            }));
        }

        out.push(Stmt::Expression(Expr::func_call(
            "registerArgumentsSet",
            args,
        )));
    }
}
