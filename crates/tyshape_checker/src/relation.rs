//! Assignability.
//!
//! `source` is assignable to `target` when a value of the source type may be
//! used where the target type is expected. Object types relate structurally;
//! the excess-property check only runs when the source is a fresh object
//! literal, which the caller signals with `fresh`.

use crate::instantiate::{resolve, Inference};
use crate::types::{FunctionType, ObjectType, Parameter, TypeFlags, TypeId, TypeKind, TypeTable};
use rustc_hash::FxHashSet;
use tyshape_core::intern::Name;
use tyshape_core::text::SourceLocation;
use tyshape_diagnostics::{messages, Diagnostic, DiagnosticMessage};
use tyshape_options::CheckerOptions;

/// Comparisons nested under this many expanded instantiations are assumed
/// related. A generic like `interface Box<T> { inner: Box<Box<T>> }` yields a
/// new pair of bodies at every level.
const MAX_EXPANSION_DEPTH: usize = 5;

/// Why a source type is not assignable to a target type.
#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    Incompatible {
        source: TypeId,
        target: TypeId,
    },
    MissingProperty {
        name: Name,
        source: TypeId,
        target: TypeId,
    },
    Property {
        name: Name,
        source: TypeId,
        target: TypeId,
        cause: Box<Mismatch>,
    },
    /// Properties of a fresh literal that the target does not declare.
    ExcessProperty {
        names: Vec<Name>,
        source: TypeId,
        target: TypeId,
    },
    TooFewArguments {
        source: TypeId,
        target: TypeId,
        expected: usize,
        found: usize,
    },
    Parameter {
        index: usize,
        source: TypeId,
        target: TypeId,
        cause: Box<Mismatch>,
    },
    ReturnType {
        source: TypeId,
        target: TypeId,
        cause: Box<Mismatch>,
    },
}

impl Mismatch {
    pub fn source(&self) -> TypeId {
        match self {
            Mismatch::Incompatible { source, .. }
            | Mismatch::MissingProperty { source, .. }
            | Mismatch::Property { source, .. }
            | Mismatch::ExcessProperty { source, .. }
            | Mismatch::TooFewArguments { source, .. }
            | Mismatch::Parameter { source, .. }
            | Mismatch::ReturnType { source, .. } => *source,
        }
    }

    pub fn target(&self) -> TypeId {
        match self {
            Mismatch::Incompatible { target, .. }
            | Mismatch::MissingProperty { target, .. }
            | Mismatch::Property { target, .. }
            | Mismatch::ExcessProperty { target, .. }
            | Mismatch::TooFewArguments { target, .. }
            | Mismatch::Parameter { target, .. }
            | Mismatch::ReturnType { target, .. } => *target,
        }
    }

    /// Render as a diagnostic at `location`. `head` receives the source and
    /// target type strings; the causes are attached as related information.
    /// Excess properties are always reported with their own message.
    pub fn report(&self, table: &TypeTable, location: SourceLocation, head: &DiagnosticMessage) -> Diagnostic {
        if let Mismatch::ExcessProperty { names, target, .. } = self {
            let names = names
                .iter()
                .map(|n| table.names().resolve(*n))
                .collect::<Vec<_>>()
                .join("', '");
            return Diagnostic::at(
                location,
                &messages::OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES_AND_0_DOES_NOT_EXIST_IN_TYPE_1,
                &[&names, &table.type_to_string(*target)],
            );
        }
        let source = table.type_to_string(self.source());
        let target = table.type_to_string(self.target());
        let mut related = Vec::new();
        self.elaborate(table, &mut related);
        related.into_iter().fold(
            Diagnostic::at(location, head, &[&source, &target]),
            Diagnostic::with_related,
        )
    }

    fn elaborate(&self, table: &TypeTable, out: &mut Vec<Diagnostic>) {
        let names = table.names();
        match self {
            Mismatch::Incompatible { .. } => {}
            Mismatch::MissingProperty { name, source, target } => out.push(Diagnostic::new(
                &messages::PROPERTY_0_IS_MISSING_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2,
                &[
                    names.resolve(*name),
                    &table.type_to_string(*source),
                    &table.type_to_string(*target),
                ],
            )),
            Mismatch::Property { name, cause, .. } => {
                out.push(Diagnostic::new(
                    &messages::TYPES_OF_PROPERTY_0_ARE_INCOMPATIBLE,
                    &[names.resolve(*name)],
                ));
                cause.elaborate_nested(table, out);
            }
            Mismatch::ExcessProperty { .. } => {
                out.push(self.report(table, SourceLocation::default(), &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1));
            }
            Mismatch::TooFewArguments { expected, found, .. } => out.push(Diagnostic::new(
                &messages::TARGET_SIGNATURE_PROVIDES_TOO_FEW_ARGUMENTS_EXPECTED_0_OR_MORE_BUT_GOT_1,
                &[&expected.to_string(), &found.to_string()],
            )),
            Mismatch::Parameter {
                index,
                source,
                target,
                cause,
            } => {
                let parameter_name = |id: TypeId| {
                    table
                        .as_function(id)
                        .and_then(|f| f.parameters.get(*index))
                        .map_or("?", |p| names.resolve(p.name))
                };
                out.push(Diagnostic::new(
                    &messages::TYPES_OF_PARAMETERS_0_AND_1_ARE_INCOMPATIBLE,
                    &[parameter_name(*source), parameter_name(*target)],
                ));
                cause.elaborate_nested(table, out);
            }
            Mismatch::ReturnType { source, target, cause } => {
                out.push(Diagnostic::new(
                    &messages::CALL_SIGNATURE_RETURN_TYPES_0_AND_1_ARE_INCOMPATIBLE,
                    &[&table.type_to_string(*source), &table.type_to_string(*target)],
                ));
                cause.elaborate_nested(table, out);
            }
        }
    }

    /// A cause below the head: its own "not assignable" line, then its causes.
    fn elaborate_nested(&self, table: &TypeTable, out: &mut Vec<Diagnostic>) {
        if !matches!(self, Mismatch::ExcessProperty { .. } | Mismatch::MissingProperty { .. }) {
            out.push(Diagnostic::new(
                &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
                &[&table.type_to_string(self.source()), &table.type_to_string(self.target())],
            ));
        }
        self.elaborate(table, out);
    }
}

/// One assignability query session. The assumption set makes recursive types
/// terminate: a pair already being compared is assumed related.
pub struct Relation<'a> {
    table: &'a mut TypeTable,
    strict_function_types: bool,
    in_progress: FxHashSet<(TypeId, TypeId)>,
    expansion_depth: usize,
}

impl<'a> Relation<'a> {
    pub fn new(table: &'a mut TypeTable, options: &CheckerOptions) -> Self {
        Self {
            table,
            strict_function_types: options.strict_function_types,
            in_progress: FxHashSet::default(),
            expansion_depth: 0,
        }
    }

    /// Whether `source` may be used where `target` is expected. `fresh` marks
    /// a source produced directly by an object literal.
    pub fn is_assignable(&mut self, source: TypeId, target: TypeId, fresh: bool) -> Result<(), Mismatch> {
        if fresh {
            let names = self.excess_properties(source, target);
            if !names.is_empty() {
                return Err(Mismatch::ExcessProperty { names, source, target });
            }
        }
        self.is_related(source, target)
    }

    /// Source properties the target does not declare. Targets with no
    /// properties at all accept anything.
    pub fn excess_properties(&mut self, source: TypeId, target: TypeId) -> Vec<Name> {
        let source = resolve(self.table, source);
        let target = resolve(self.table, target);
        match (self.table.as_object(source), self.table.as_object(target)) {
            (Some(s), Some(t)) if !t.properties.is_empty() => s
                .properties
                .keys()
                .filter(|name| !t.properties.contains_key(*name))
                .copied()
                .collect(),
            _ => Vec::new(),
        }
    }

    fn is_related(&mut self, source: TypeId, target: TypeId) -> Result<(), Mismatch> {
        if source == target {
            return Ok(());
        }
        if self.type_arguments_related(source, target) {
            return Ok(());
        }
        let s = resolve(self.table, source);
        let t = resolve(self.table, target);
        if s == t {
            return Ok(());
        }
        if self.table.flags(s).intersects(TypeFlags::WILDCARD) || self.table.flags(t).intersects(TypeFlags::WILDCARD) {
            return Ok(());
        }
        if !self.in_progress.insert((s, t)) {
            tracing::trace!(source = s.0, target = t.0, "assumed related (cycle)");
            return Ok(());
        }
        let expanded = s != source || t != target;
        if expanded && self.expansion_depth >= MAX_EXPANSION_DEPTH {
            tracing::trace!(source = s.0, target = t.0, "assumed related (expansion depth)");
            self.in_progress.remove(&(s, t));
            return Ok(());
        }
        if expanded {
            self.expansion_depth += 1;
        }
        let result = self.structured_related(source, target, s, t);
        if expanded {
            self.expansion_depth -= 1;
        }
        self.in_progress.remove(&(s, t));
        result
    }

    /// `A<X>` relates to `A<Y>` without expanding `A` when every `X` relates
    /// to its `Y`. With strict function types a parameter may sit in a
    /// contravariant position, so the arguments must relate both ways.
    fn type_arguments_related(&mut self, source: TypeId, target: TypeId) -> bool {
        let (TypeKind::Instantiated(s), TypeKind::Instantiated(t)) =
            (&self.table.get(source).kind, &self.table.get(target).kind)
        else {
            return false;
        };
        if s.origin != t.origin {
            return false;
        }
        let pairs: Vec<(TypeId, TypeId)> = s
            .bindings
            .values()
            .copied()
            .zip(t.bindings.values().copied())
            .collect();
        pairs.into_iter().all(|(a, b)| {
            self.is_related(a, b).is_ok() && (!self.strict_function_types || self.is_related(b, a).is_ok())
        })
    }

    fn structured_related(&mut self, source: TypeId, target: TypeId, s: TypeId, t: TypeId) -> Result<(), Mismatch> {
        let incompatible = Mismatch::Incompatible { source, target };
        match (self.table.get(s).kind.clone(), self.table.get(t).kind.clone()) {
            (TypeKind::Primitive { name: a }, TypeKind::Primitive { name: b }) => {
                if a == b {
                    Ok(())
                } else {
                    Err(incompatible)
                }
            }
            (TypeKind::TypeParameter(p), _) => match p.constraint {
                Some(constraint) => self.is_related(constraint, target).map_err(|_| incompatible),
                None => Err(incompatible),
            },
            (TypeKind::Object(so), TypeKind::Object(to)) => self.object_related(source, target, &so, &to),
            (TypeKind::Function(sf), TypeKind::Function(tf)) => self.function_related(source, target, sf, &tf),
            _ => Err(incompatible),
        }
    }

    fn object_related(
        &mut self,
        source: TypeId,
        target: TypeId,
        so: &ObjectType,
        to: &ObjectType,
    ) -> Result<(), Mismatch> {
        for (&name, tp) in &to.properties {
            match so.properties.get(&name) {
                None if tp.optional => continue,
                Some(sp) if !sp.optional || tp.optional => {
                    self.is_related(sp.type_id, tp.type_id)
                        .map_err(|cause| Mismatch::Property {
                            name,
                            source,
                            target,
                            cause: Box::new(cause),
                        })?;
                }
                // Absent, or optional in the source but required in the target.
                _ => return Err(Mismatch::MissingProperty { name, source, target }),
            }
        }
        Ok(())
    }

    fn function_related(
        &mut self,
        source: TypeId,
        target: TypeId,
        mut sf: FunctionType,
        tf: &FunctionType,
    ) -> Result<(), Mismatch> {
        if sf.is_generic() {
            sf = self.instantiate_in_context(&sf, tf);
        }

        let expected = sf.min_argument_count();
        if expected > tf.parameters.len() {
            return Err(Mismatch::TooFewArguments {
                source,
                target,
                expected,
                found: tf.parameters.len(),
            });
        }

        for (index, (sp, tp)) in sf.parameters.iter().zip(&tf.parameters).enumerate() {
            let outcome = match self.is_related(tp.type_id, sp.type_id) {
                Err(contravariant) if !self.strict_function_types => {
                    self.is_related(sp.type_id, tp.type_id).map_err(|_| contravariant)
                }
                other => other,
            };
            outcome.map_err(|cause| Mismatch::Parameter {
                index,
                source,
                target,
                cause: Box::new(cause),
            })?;
        }

        if self.table.is_primitive(tf.return_type, "void") {
            return Ok(());
        }
        self.is_related(sf.return_type, tf.return_type)
            .map_err(|cause| Mismatch::ReturnType {
                source,
                target,
                cause: Box::new(cause),
            })
    }

    /// Instantiate a generic source signature by inferring its type
    /// parameters from the target's parameter types.
    fn instantiate_in_context(&mut self, sf: &FunctionType, tf: &FunctionType) -> FunctionType {
        let mut inference = Inference::new(&sf.type_parameters);
        for (sp, tp) in sf.parameters.iter().zip(&tf.parameters) {
            if inference.infer(self.table, sp.type_id, tp.type_id).is_err() {
                break;
            }
        }
        let signature = inference.finish(self.table).apply(self.table, sf);
        FunctionType {
            type_parameters: Vec::new(),
            parameters: sf
                .parameters
                .iter()
                .zip(signature.parameters)
                .map(|(p, type_id)| Parameter { type_id, ..*p })
                .collect(),
            return_type: signature.return_type,
        }
    }
}
