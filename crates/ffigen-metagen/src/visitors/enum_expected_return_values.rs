//! `expectedReturnValues(\Entrypoint::func(), argumentsSet('...'))` for
//! every function returning an enum typedef.

use ffigen_core::php::{Arg, Expr, Stmt};

use super::{arguments_set, enum_set_name};
use crate::visitor::{Member, MetadataVisitor, VisitCx};

pub struct EnumExpectedReturnValues;

impl MetadataVisitor for EnumExpectedReturnValues {
    type State = ();

    fn enter(
        &self,
        cx: &VisitCx<'_>,
        member: Member<'_>,
        _state: &mut Self::State,
        out: &mut Vec<Stmt>,
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
        let Some((type_name, _)) = cx.enum_typedef(function.returns) else {
            return;
        };

        out.push(Stmt::Expression(Expr::func_call(
            "expectedReturnValues",
            vec![
                Arg::new(Expr::static_call(cx.entrypoint_ref(), name)),
                Arg::new(arguments_set(&enum_set_name(cx, type_name))),
            ],
        )));
    }
}
