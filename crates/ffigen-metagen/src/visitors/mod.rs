//! The fixed visitor set of the metadata pipeline, one module per output
//! category.

mod enum_arguments_set;
mod enum_expected_arguments;
mod enum_expected_return_values;
mod export_functions;
mod struct_overrides;
mod structures;
mod types_instantiation;

pub use enum_arguments_set::EnumArgumentsSet;
pub use enum_expected_arguments::EnumExpectedArguments;
pub use enum_expected_return_values::EnumExpectedReturnValues;
pub use export_functions::ExportFunctions;
pub use struct_overrides::StructOverrides;
pub use structures::Structures;
pub use types_instantiation::TypesInstantiation;

use crate::visitor::VisitCx;
use ffigen_core::naming::NameKind;
use ffigen_core::node::RecordKind;
use ffigen_core::php::{Arg, Expr};

fn record_name_kind(kind: RecordKind) -> NameKind {
    match kind {
        RecordKind::Struct => NameKind::Struct,
        RecordKind::Union => NameKind::Union,
        RecordKind::Class => NameKind::Class,
    }
}

/// The arguments-set name an enum typedef registers under.
fn enum_set_name(cx: &VisitCx<'_>, typedef_name: &str) -> String {
    format!(
        "{}{}",
        cx.config.argument_set_prefix,
        typedef_name.to_lowercase()
    )
}

/// `argumentsSet('<name>')` reference expression.
fn arguments_set(name: &str) -> Expr {
    Expr::func_call("argumentsSet", vec![Arg::new(Expr::Str(name.to_string()))])
}

/// `expectedArguments(\Entrypoint::method(), <position>, <expected>)`.
fn expected_arguments(cx: &VisitCx<'_>, method: &str, position: i64, expected: Expr) -> Expr {
    Expr::func_call(
        "expectedArguments",
        vec![
            Arg::new(Expr::static_call(cx.entrypoint_ref(), method)),
            Arg::new(Expr::Int(position)),
            Arg::new(expected),
        ],
    )
}
