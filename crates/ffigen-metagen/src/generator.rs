//! The pipeline coordinator: wires the namespace members through the fixed
//! visitor set and collects the produced statement lists.

use tracing::debug;

use ffigen_core::naming::{NamingStrategy, SimpleNamingStrategy};
use ffigen_core::node::TranslationUnit;
use ffigen_core::php::{GeneratedMetadata, PhpNamespace, Stmt};

use crate::type_info::TypeInfoGenerator;
use crate::visitor::{Member, MetadataVisitor, VisitCx};
use crate::visitors::{
    EnumArgumentsSet, EnumExpectedArguments, EnumExpectedReturnValues, ExportFunctions,
    StructOverrides, Structures, TypesInstantiation,
};

/// Namespace the IDE-internal helper declarations are emitted into.
/// PhpStorm treats this name specially.
pub const INTERNAL_NAMESPACE: &str = "PHPSTORM_META";

/// Tunables of one generation run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Prefix of every registered arguments-set name.
    pub argument_set_prefix: String,
    /// Suffix of the arguments-set listing all instantiable type names.
    pub types_list_suffix: String,
    /// Path prefixes whose declarations produce no metadata.
    pub excludes: Vec<String>,
    /// Maximum pointer depth the type registry and return-type coercions
    /// cover (`T*`, `T**`, ...).
    pub pointers_inheritance: usize,
    /// Whether scalar return-type coercions are emitted alongside the
    /// record coercions.
    pub scalar_overrides: bool,
    /// Whether forward-declared records without a definition participate
    /// in the type registry and coercions.
    pub include_incomplete: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            argument_set_prefix: "ffi_".to_string(),
            types_list_suffix: "types_list".to_string(),
            excludes: vec!["/usr".to_string()],
            pointers_inheritance: 2,
            scalar_overrides: true,
            include_incomplete: false,
        }
    }
}

/// Runs the visitor pipeline over a built translation unit and produces the
/// internal and external declaration surfaces.
pub struct MetadataGenerator {
    naming: Box<dyn NamingStrategy>,
    config: GeneratorConfig,
}

impl Default for MetadataGenerator {
    fn default() -> Self {
        Self::new(SimpleNamingStrategy::default(), GeneratorConfig::default())
    }
}

impl MetadataGenerator {
    pub fn new(naming: impl NamingStrategy + 'static, config: GeneratorConfig) -> Self {
        Self {
            naming: Box::new(naming),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Processes every global namespace of `unit`. Typedefs are visited
    /// before functions, mirroring declaration dependency order.
    pub fn generate(&self, unit: &TranslationUnit) -> GeneratedMetadata {
        let mut internal = PhpNamespace::new(INTERNAL_NAMESPACE);
        let mut external = PhpNamespace::new(self.naming.entrypoint_namespace());

        for namespace in unit.namespaces.iter().filter(|ns| ns.is_global()) {
            let members: Vec<Member<'_>> = namespace
                .types
                .iter()
                .copied()
                .map(Member::Typedef)
                .chain(namespace.functions.iter().map(Member::Function))
                .collect();

            debug!(members = members.len(), "processing global namespace");

            let cx = VisitCx {
                unit,
                namespace,
                naming: self.naming.as_ref(),
                config: &self.config,
                info: TypeInfoGenerator::new(self.naming.as_ref()),
            };

            run_visitor(&EnumArgumentsSet, &cx, &members, &mut internal.stmts);
            run_visitor(&EnumExpectedArguments, &cx, &members, &mut internal.stmts);
            run_visitor(
                &EnumExpectedReturnValues,
                &cx,
                &members,
                &mut internal.stmts,
            );
            run_visitor(&StructOverrides, &cx, &members, &mut internal.stmts);
            run_visitor(&Structures, &cx, &members, &mut internal.stmts);
            run_visitor(&TypesInstantiation, &cx, &members, &mut internal.stmts);
            run_visitor(&ExportFunctions, &cx, &members, &mut external.stmts);
        }

        GeneratedMetadata { internal, external }
    }
}

/// One pass of one visitor over the member list, with a fresh accumulator.
fn run_visitor<V: MetadataVisitor>(
    visitor: &V,
    cx: &VisitCx<'_>,
    members: &[Member<'_>],
    out: &mut Vec<Stmt>,
) {
    let mut state = V::State::default();

    visitor.before(cx, members, &mut state, out);
    for member in members {
        visitor.enter(cx, *member, &mut state, out);
    }
    visitor.after(cx, members, &mut state, out);
}
