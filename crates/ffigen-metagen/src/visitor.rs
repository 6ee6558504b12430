//! Visitor contract of the metadata pipeline.

use crate::generator::GeneratorConfig;
use crate::type_info::TypeInfoGenerator;
use ffigen_core::naming::NamingStrategy;
use ffigen_core::node::{
    EnumNode, FunctionNode, Location, NamespaceNode, TranslationUnit, TypeId, TypeNode,
};
use ffigen_core::php::Stmt;

/// One member of the processed namespace: a typedef or a named function.
#[derive(Clone, Copy)]
pub enum Member<'a> {
    Typedef(TypeId),
    Function(&'a FunctionNode),
}

/// Shared read-only context handed to every hook.
pub struct VisitCx<'a> {
    pub unit: &'a TranslationUnit,
    pub namespace: &'a NamespaceNode,
    pub naming: &'a dyn NamingStrategy,
    pub config: &'a GeneratorConfig,
    pub info: TypeInfoGenerator<'a>,
}

impl<'a> VisitCx<'a> {
    /// Typedef name, aliased type and location of a typedef member.
    pub fn typedef(&self, id: TypeId) -> Option<(&'a str, TypeId, &'a Location)> {
        match self.unit.types.get(id) {
            TypeNode::Typedef {
                name,
                aliased,
                location,
            } => Some((name.as_str(), *aliased, location)),
            _ => None,
        }
    }

    /// Typedef name and enum node when `id` is a typedef directly aliasing
    /// an enum.
    pub fn enum_typedef(&self, id: TypeId) -> Option<(&'a str, &'a EnumNode)> {
        let (name, aliased, _) = self.typedef(id)?;
        match self.unit.types.get(aliased) {
            TypeNode::Enum(node) => Some((name, node)),
            _ => None,
        }
    }

    /// Whether a member's defining location falls under a configured
    /// excluded path prefix. Excluded members produce no output from any
    /// visitor.
    pub fn member_excluded(&self, member: Member<'_>) -> bool {
        let location = match member {
            Member::Typedef(id) => match self.typedef(id) {
                Some((_, _, location)) => location,
                None => return false,
            },
            Member::Function(function) => &function.location,
        };
        location.matches(&self.config.excludes)
    }

    /// The entrypoint FQN with a leading backslash, as referenced from
    /// generated code.
    pub fn entrypoint_ref(&self) -> String {
        format!("\\{}", self.naming.entrypoint())
    }
}

/// A generator of one category of metadata statements.
///
/// Per-pass state lives in the explicit `State` accumulator, created fresh
/// by the coordinator for every run, so a single visitor value can serve
/// concurrent passes.
pub trait MetadataVisitor {
    type State: Default;

    fn before(
        &self,
        _cx: &VisitCx<'_>,
        _members: &[Member<'_>],
        _state: &mut Self::State,
        _out: &mut Vec<Stmt>,
    ) {
    }

    fn enter(
        &self,
        _cx: &VisitCx<'_>,
        _member: Member<'_>,
        _state: &mut Self::State,
        _out: &mut Vec<Stmt>,
    ) {
    }

    fn after(
        &self,
        _cx: &VisitCx<'_>,
        _members: &[Member<'_>],
        _state: &mut Self::State,
        _out: &mut Vec<Stmt>,
    ) {
    }
}
