//! `expectedArguments(\Entrypoint::func(), <position>, argumentsSet('...'))`
//! for every function argument whose type is an enum typedef.

use ffigen_core::php::Stmt;

use super::{arguments_set, enum_set_name, expected_arguments};
use crate::visitor::{Member, MetadataVisitor, VisitCx};

pub struct EnumExpectedArguments;

impl MetadataVisitor for EnumExpectedArguments {
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

        for (position, argument) in function.arguments.iter().enumerate() {
            let Some((type_name, _)) = cx.enum_typedef(argument.ty) else {
                continue;
            };

            out.push(Stmt::Expression(expected_arguments(
                cx,
                name,
                position as i64,
                arguments_set(&enum_set_name(cx, type_name)),
            )));
        }
    }
}
