//! Checker driver.
//!
//! A run goes through three phases:
//!
//! - **Declaring**: every top-level interface and function of every
//!   registered file is entered into the type table. Interfaces are reserved
//!   and their type parameter constraints resolved before any body is built,
//!   so declarations may refer to each other in any order. Constraint checks
//!   met on the way wait until every body exists. Annotated top-level
//!   variables get their declared type here as well.
//! - **Checking**: statements are walked in source order. Variable
//!   initializers, call arguments and return values are checked against
//!   their declared types. Functions without a return annotation get their
//!   return type from their body the first time they are referenced.
//! - **Done**: diagnostics are available; the checker cannot be reused.

use crate::error::{CheckError, ConstructionError};
use crate::instantiate::{
    instantiate, resolve, substitute, Bindings, Inference, InferenceError, InstantiatedSignature, Instantiation,
};
use crate::relation::{Mismatch, Relation};
use crate::types::{FunctionType, ObjectType, Parameter, Property, TypeFlags, TypeId, TypeKind, TypeTable};
use rustc_hash::{FxHashMap, FxHashSet};
use tyshape_ast::*;
use tyshape_core::intern::{Name, NameTable};
use tyshape_core::text::SourceLocation;
use tyshape_diagnostics::{messages, Diagnostic, DiagnosticCollection, DiagnosticMessage};
use tyshape_options::CheckerOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Declaring,
    Checking,
    Done,
}

#[derive(Debug, Default)]
struct Scope {
    values: FxHashMap<Name, TypeId>,
    types: FxHashMap<Name, TypeId>,
}

#[derive(Debug, Clone, Copy)]
enum ValueSymbol {
    Variable(TypeId),
    Function(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyState {
    Unchecked,
    Checking,
    Checked,
}

/// A top-level function. Its signature is built while declaring; without a
/// return annotation the function type only exists once the body is checked.
#[derive(Debug)]
struct DeclaredFunction<'a> {
    decl: &'a FunctionDeclaration,
    file: Option<&'a str>,
    type_parameters: Vec<TypeId>,
    parameters: Vec<Parameter>,
    return_type: Option<TypeId>,
    type_id: Option<TypeId>,
    body: BodyState,
}

/// An interface whose name is entered but whose body is not built yet.
struct PendingInterface<'d> {
    decl: &'d InterfaceDeclaration,
    body: TypeId,
    type_parameters: Vec<TypeId>,
}

/// A constraint check met while declaring. The constraint or the argument
/// may name an interface whose body is not built yet.
struct DeferredConstraint<'a> {
    parameter: TypeId,
    argument: TypeId,
    bindings: Bindings,
    location: SourceLocation,
    file: Option<&'a str>,
}

/// Position in the top-level statements while checking.
#[derive(Debug, Default)]
struct TopLevelCursor {
    function: usize,
    variable: usize,
}

#[derive(Debug, Clone, Copy)]
struct ReturnContext {
    declared: Option<TypeId>,
    inferred: Option<TypeId>,
    has_value: bool,
}

pub struct Checker<'a> {
    pub type_table: TypeTable,
    options: CheckerOptions,
    diagnostics: DiagnosticCollection,
    phase: Phase,
    files: Vec<&'a SourceFile>,
    current_file: Option<&'a str>,
    /// Top-level interfaces.
    declared_types: FxHashMap<Name, TypeId>,
    /// Top-level functions and variables.
    globals: FxHashMap<Name, ValueSymbol>,
    functions: Vec<DeclaredFunction<'a>>,
    /// Resolved annotations of top-level variables, in statement order.
    variable_annotations: Vec<Option<TypeId>>,
    /// Top-level variables as seen from function bodies before their
    /// declaration is checked: the annotation, else `unknown`.
    hoisted: FxHashMap<Name, TypeId>,
    deferred_constraints: Vec<DeferredConstraint<'a>>,
    /// Block scopes inside function bodies, innermost last.
    scopes: Vec<Scope>,
    returns: Vec<ReturnContext>,
}

impl<'a> Checker<'a> {
    pub fn new(options: CheckerOptions) -> Self {
        Self {
            type_table: TypeTable::new(NameTable::new()),
            options,
            diagnostics: DiagnosticCollection::new(),
            phase: Phase::Declaring,
            files: Vec::new(),
            current_file: None,
            declared_types: FxHashMap::default(),
            globals: FxHashMap::default(),
            functions: Vec::new(),
            variable_annotations: Vec::new(),
            hoisted: FxHashMap::default(),
            deferred_constraints: Vec::new(),
            scopes: Vec::new(),
            returns: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn diagnostics(&self) -> &DiagnosticCollection {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> DiagnosticCollection {
        std::mem::take(&mut self.diagnostics)
    }

    /// Register a file for this run. All registered files share one global
    /// scope.
    pub fn declare_source_file(&mut self, file: &'a SourceFile) -> Result<(), CheckError> {
        if self.phase != Phase::Declaring {
            return Err(CheckError::DeclarationAfterDeclaring {
                name: file.file_name.clone(),
            });
        }
        self.files.push(file);
        Ok(())
    }

    /// Declare and check every registered file.
    pub fn check_declarations(&mut self) -> Result<(), CheckError> {
        if self.phase != Phase::Declaring {
            return Err(CheckError::AlreadyChecked);
        }
        self.declare_all()?;

        self.phase = Phase::Checking;
        let mut cursor = TopLevelCursor::default();
        for file in self.files.clone() {
            self.current_file = Some(file.file_name.as_str());
            let before = self.diagnostics.len();
            for statement in &file.statements {
                self.check_top_level_statement(statement, &mut cursor)?;
            }
            tracing::debug!(
                file = %file.file_name,
                diagnostics = self.diagnostics.len() - before,
                "checked source file"
            );
        }
        self.current_file = None;
        self.phase = Phase::Done;
        Ok(())
    }

    /// Check a single file.
    pub fn check_source_file(&mut self, file: &'a SourceFile) -> Result<(), CheckError> {
        if self.phase == Phase::Done {
            return Err(CheckError::AlreadyChecked);
        }
        self.declare_source_file(file)?;
        self.check_declarations()
    }

    /// The type of a top-level value, if one is declared under `name`.
    pub fn global_type(&mut self, name: &str) -> Result<Option<TypeId>, CheckError> {
        let name = self.type_table.intern(name);
        match self.globals.get(&name).copied() {
            Some(ValueSymbol::Variable(ty)) => Ok(Some(ty)),
            Some(ValueSymbol::Function(index)) => self.function_type(index).map(Some),
            None => Ok(None),
        }
    }

    /// The type declared under `name` at the top level.
    pub fn declared_type(&self, name: &str) -> Option<TypeId> {
        let name = self.type_table.names().get(name)?;
        self.declared_types.get(&name).copied()
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    fn report(&mut self, diagnostic: Diagnostic) {
        let diagnostic = match self.current_file {
            Some(file) if !file.is_empty() => diagnostic.with_file(file),
            _ => diagnostic,
        };
        self.diagnostics.add(diagnostic);
    }

    fn error(&mut self, location: SourceLocation, message: &DiagnosticMessage, args: &[&str]) {
        self.report(Diagnostic::at(location, message, args));
    }

    fn report_mismatch(&mut self, mismatch: &Mismatch, location: SourceLocation, head: &DiagnosticMessage) {
        let diagnostic = mismatch.report(&self.type_table, location, head);
        self.report(diagnostic);
    }

    fn display(&self, ty: TypeId) -> String {
        self.type_table.type_to_string(ty)
    }

    fn relation(&mut self) -> Relation<'_> {
        Relation::new(&mut self.type_table, &self.options)
    }

    fn intern(&self, name: &str) -> Name {
        self.type_table.intern(name)
    }

    fn unknown(&self) -> TypeId {
        self.type_table.unknown_type
    }

    // ========================================================================
    // Declaring
    // ========================================================================

    fn declare_all(&mut self) -> Result<(), CheckError> {
        let files = self.files.clone();

        let mut pending = Vec::new();
        for &file in &files {
            self.current_file = Some(file.file_name.as_str());
            for statement in &file.statements {
                if let Statement::InterfaceDeclaration(decl) = statement {
                    pending.extend(self.begin_interface(decl));
                }
            }
        }
        // Every constraint exists before any reference in a body is checked
        // against it.
        for interface in &pending {
            self.current_file = self.file_of_interface(interface.decl);
            self.constrain_interface(interface)?;
        }
        for interface in pending {
            self.current_file = self.file_of_interface(interface.decl);
            self.complete_interface(interface)?;
        }

        for &file in &files {
            self.current_file = Some(file.file_name.as_str());
            for statement in &file.statements {
                match statement {
                    Statement::FunctionDeclaration(decl) => self.declare_function(decl)?,
                    Statement::VariableDeclaration(decl) => self.declare_variable(decl)?,
                    _ => {}
                }
            }
        }

        let deferred = std::mem::take(&mut self.deferred_constraints);
        tracing::debug!(count = deferred.len(), "running deferred constraint checks");
        for check in deferred {
            self.current_file = check.file;
            self.report_unsatisfied_constraint(check.parameter, check.argument, &check.bindings, check.location);
        }
        self.current_file = None;
        Ok(())
    }

    /// Resolve a top-level variable's annotation so function bodies can see
    /// the variable before its declaration is checked.
    fn declare_variable(&mut self, decl: &VariableDeclaration) -> Result<(), CheckError> {
        let declared = match &decl.type_annotation {
            Some(node) => Some(self.resolve_type_node(node)?),
            None => None,
        };
        self.variable_annotations.push(declared);
        let name = self.intern(&decl.name);
        let unknown = self.unknown();
        self.hoisted.entry(name).or_insert(declared.unwrap_or(unknown));
        Ok(())
    }

    fn file_of_interface(&self, decl: &InterfaceDeclaration) -> Option<&'a str> {
        self.files
            .iter()
            .copied()
            .find(|file| {
                file.statements
                    .iter()
                    .any(|s| matches!(s, Statement::InterfaceDeclaration(d) if std::ptr::eq(d, decl)))
            })
            .map(|file| file.file_name.as_str())
    }

    /// Enter an interface name. Generic interfaces get their parameters and a
    /// `Generic` origin right away so references can be instantiated before
    /// the body exists.
    fn begin_interface<'d>(&mut self, decl: &'d InterfaceDeclaration) -> Option<PendingInterface<'d>> {
        let name = self.intern(&decl.name);
        let exists = match self.scopes.last() {
            Some(scope) => scope.types.contains_key(&name),
            None => self.declared_types.contains_key(&name),
        };
        if exists {
            self.error(decl.loc, &messages::DUPLICATE_IDENTIFIER_0, &[&decl.name]);
            return None;
        }

        let type_parameters: Vec<TypeId> = decl
            .type_parameters
            .iter()
            .map(|p| {
                let name = self.type_table.intern(&p.name);
                self.type_table.make_type_parameter(name)
            })
            .collect();
        let body = self.type_table.reserve();
        let declared = if type_parameters.is_empty() {
            body
        } else {
            self.type_table.make_generic(name, type_parameters.clone(), body)
        };
        match self.scopes.last_mut() {
            Some(scope) => scope.types.insert(name, declared),
            None => self.declared_types.insert(name, declared),
        };
        Some(PendingInterface {
            decl,
            body,
            type_parameters,
        })
    }

    fn constrain_interface(&mut self, interface: &PendingInterface<'_>) -> Result<(), CheckError> {
        self.scopes.push(Scope::default());
        self.bind_type_parameters(&interface.decl.type_parameters, &interface.type_parameters)?;
        self.scopes.pop();
        Ok(())
    }

    /// Build the body of an interface whose constraints are already set.
    fn complete_interface(&mut self, interface: PendingInterface<'_>) -> Result<(), CheckError> {
        let decl = interface.decl;
        self.scopes.push(Scope::default());
        self.bind_type_parameter_names(&decl.type_parameters, &interface.type_parameters, false);
        let name = self.intern(&decl.name);
        let object = self.build_object_type(Some(name), &decl.members)?;
        self.scopes.pop();
        self.type_table
            .define(interface.body, TypeKind::Object(object))
            .map_err(|e| CheckError::construction(e, decl.loc))
    }

    fn declare_function(&mut self, decl: &'a FunctionDeclaration) -> Result<(), CheckError> {
        self.scopes.push(Scope::default());
        let type_parameters = self.declare_type_parameters(&decl.type_parameters)?;
        let parameters = self.resolve_parameters(&decl.parameters, None)?;
        let return_type = match &decl.return_type {
            Some(node) => Some(self.resolve_type_node(node)?),
            None => None,
        };
        self.scopes.pop();

        let type_id = return_type.map(|return_type| {
            self.type_table.make_function_type(FunctionType {
                type_parameters: type_parameters.clone(),
                parameters: parameters.clone(),
                return_type,
            })
        });
        let index = self.functions.len();
        self.functions.push(DeclaredFunction {
            decl,
            file: self.current_file,
            type_parameters,
            parameters,
            return_type,
            type_id,
            body: BodyState::Unchecked,
        });

        let name = self.intern(&decl.name);
        if self.globals.contains_key(&name) {
            self.error(decl.loc, &messages::DUPLICATE_IDENTIFIER_0, &[&decl.name]);
        } else {
            self.globals.insert(name, ValueSymbol::Function(index));
        }
        Ok(())
    }

    /// Create fresh parameters for a declaration list and bind them in the
    /// current scope.
    fn declare_type_parameters(&mut self, decls: &[TypeParameterDeclaration]) -> Result<Vec<TypeId>, CheckError> {
        let ids: Vec<TypeId> = decls
            .iter()
            .map(|p| {
                let name = self.type_table.intern(&p.name);
                self.type_table.make_type_parameter(name)
            })
            .collect();
        self.bind_type_parameters(decls, &ids)?;
        Ok(ids)
    }

    /// Constraints are resolved after all names are bound, so they may refer
    /// to sibling parameters.
    fn bind_type_parameters(&mut self, decls: &[TypeParameterDeclaration], ids: &[TypeId]) -> Result<(), CheckError> {
        self.bind_type_parameter_names(decls, ids, true);
        for (decl, &id) in decls.iter().zip(ids) {
            if let Some(constraint) = &decl.constraint {
                let constraint = self.resolve_type_node(constraint)?;
                self.type_table.set_constraint(id, constraint);
            }
        }
        Ok(())
    }

    fn bind_type_parameter_names(&mut self, decls: &[TypeParameterDeclaration], ids: &[TypeId], report_duplicates: bool) {
        for (decl, &id) in decls.iter().zip(ids) {
            let name = self.intern(&decl.name);
            let Some(scope) = self.scopes.last_mut() else {
                break;
            };
            if scope.types.insert(name, id).is_some() && report_duplicates {
                self.error(decl.loc, &messages::DUPLICATE_IDENTIFIER_0, &[&decl.name]);
            }
        }
    }

    /// Parameter types: the annotation, else the matching parameter of the
    /// contextual signature, else `unknown`.
    fn resolve_parameters(
        &mut self,
        decls: &[tyshape_ast::Parameter],
        context: Option<&FunctionType>,
    ) -> Result<Vec<Parameter>, CheckError> {
        let mut parameters = Vec::with_capacity(decls.len());
        for (i, decl) in decls.iter().enumerate() {
            let type_id = match &decl.type_annotation {
                Some(node) => self.resolve_type_node(node)?,
                None => context
                    .and_then(|f| f.parameters.get(i))
                    .map_or(self.unknown(), |p| p.type_id),
            };
            parameters.push(Parameter {
                name: self.intern(&decl.name),
                type_id,
                optional: decl.optional,
            });
        }
        Ok(parameters)
    }

    fn build_object_type(&mut self, name: Option<Name>, members: &[PropertySignature]) -> Result<ObjectType, CheckError> {
        let mut seen = FxHashSet::default();
        let mut properties = Vec::with_capacity(members.len());
        for member in members {
            let prop_name = self.intern(&member.name);
            if !seen.insert(prop_name) {
                return Err(CheckError::construction(
                    ConstructionError::DuplicateProperty(member.name.clone()),
                    member.loc,
                ));
            }
            let type_id = self.resolve_type_node(&member.type_annotation)?;
            properties.push((
                prop_name,
                Property {
                    type_id,
                    optional: member.optional,
                },
            ));
        }
        ObjectType::new(name, properties, self.type_table.names()).map_err(|e| {
            let loc = members.first().map_or_else(SourceLocation::default, |m| m.loc);
            CheckError::construction(e, loc)
        })
    }

    // ========================================================================
    // Type nodes
    // ========================================================================

    fn lookup_type(&self, name: Name) -> Option<TypeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.types.get(&name).copied())
            .or_else(|| self.declared_types.get(&name).copied())
    }

    fn resolve_type_node(&mut self, node: &TypeNode) -> Result<TypeId, CheckError> {
        match node {
            TypeNode::Keyword(k) => Ok(self.type_table.primitive(k.keyword.as_str()).unwrap_or(self.unknown())),
            TypeNode::TypeReference(reference) => self.resolve_type_reference(reference),
            TypeNode::TypeLiteral(literal) => {
                let object = self.build_object_type(None, &literal.members)?;
                Ok(self.type_table.add_type(TypeKind::Object(object)))
            }
            TypeNode::FunctionType(function) => {
                self.scopes.push(Scope::default());
                let type_parameters = self.declare_type_parameters(&function.type_parameters)?;
                let parameters = self.resolve_parameters(&function.parameters, None)?;
                let return_type = self.resolve_type_node(&function.return_type)?;
                self.scopes.pop();
                Ok(self.type_table.make_function_type(FunctionType {
                    type_parameters,
                    parameters,
                    return_type,
                }))
            }
        }
    }

    fn resolve_type_reference(&mut self, reference: &TypeReferenceNode) -> Result<TypeId, CheckError> {
        let name = self.intern(&reference.name);
        let Some(declared) = self.lookup_type(name) else {
            self.error(reference.loc, &messages::CANNOT_FIND_NAME_0, &[&reference.name]);
            return Ok(self.unknown());
        };

        let TypeKind::Generic(generic) = &self.type_table.get(declared).kind else {
            if !reference.type_arguments.is_empty() {
                let shown = self.display(declared);
                self.error(reference.loc, &messages::TYPE_0_IS_NOT_GENERIC, &[&shown]);
            }
            return Ok(declared);
        };
        let type_parameters = generic.type_parameters.clone();

        if reference.type_arguments.len() != type_parameters.len() {
            self.error(
                reference.loc,
                &messages::GENERIC_TYPE_0_REQUIRES_1_TYPE_ARGUMENT_S,
                &[&reference.name, &type_parameters.len().to_string()],
            );
            return Ok(self.unknown());
        }

        let mut arguments = Vec::with_capacity(type_parameters.len());
        for node in &reference.type_arguments {
            arguments.push(self.resolve_type_node(node)?);
        }
        let bindings = Instantiation::explicit(&type_parameters, &arguments).bindings;
        for ((node, &argument), &parameter) in reference.type_arguments.iter().zip(&arguments).zip(&type_parameters) {
            self.check_constraint(parameter, argument, &bindings, node.loc());
        }

        let named: Vec<(Name, TypeId)> = type_parameters
            .iter()
            .zip(&arguments)
            .filter_map(|(&p, &a)| match &self.type_table.get(p).kind {
                TypeKind::TypeParameter(tp) => Some((tp.name, a)),
                _ => None,
            })
            .collect();
        self.type_table
            .make_instantiated(declared, named)
            .map_err(|e| CheckError::construction(e, reference.loc))
    }

    /// Report `argument` if it does not satisfy the constraint of `parameter`.
    /// While declaring, the check is queued until every interface is built.
    fn check_constraint(
        &mut self,
        parameter: TypeId,
        argument: TypeId,
        bindings: &Bindings,
        location: SourceLocation,
    ) {
        if self.phase == Phase::Declaring {
            self.deferred_constraints.push(DeferredConstraint {
                parameter,
                argument,
                bindings: bindings.clone(),
                location,
                file: self.current_file,
            });
            return;
        }
        self.report_unsatisfied_constraint(parameter, argument, bindings, location);
    }

    fn report_unsatisfied_constraint(
        &mut self,
        parameter: TypeId,
        argument: TypeId,
        bindings: &Bindings,
        location: SourceLocation,
    ) {
        let constraint = match &self.type_table.get(parameter).kind {
            TypeKind::TypeParameter(p) => p.constraint,
            _ => None,
        };
        let Some(constraint) = constraint else {
            return;
        };
        let constraint = substitute(&mut self.type_table, constraint, bindings);
        if self.relation().is_assignable(argument, constraint, false).is_err() {
            let (shown_argument, shown_constraint) = (self.display(argument), self.display(constraint));
            self.error(
                location,
                &messages::TYPE_0_DOES_NOT_SATISFY_THE_CONSTRAINT_1,
                &[&shown_argument, &shown_constraint],
            );
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn check_top_level_statement(&mut self, statement: &Statement, cursor: &mut TopLevelCursor) -> Result<(), CheckError> {
        match statement {
            Statement::InterfaceDeclaration(_) => Ok(()),
            Statement::FunctionDeclaration(_) => {
                let index = cursor.function;
                cursor.function += 1;
                self.check_function_body(index)
            }
            Statement::VariableDeclaration(decl) => {
                let declared = self.variable_annotations.get(cursor.variable).copied().flatten();
                cursor.variable += 1;
                self.check_variable_initializer(decl, declared)
            }
            other => self.check_statement(other),
        }
    }

    fn check_statement(&mut self, statement: &Statement) -> Result<(), CheckError> {
        match statement {
            Statement::InterfaceDeclaration(decl) => {
                if let Some(interface) = self.begin_interface(decl) {
                    self.constrain_interface(&interface)?;
                    self.complete_interface(interface)?;
                }
                Ok(())
            }
            Statement::FunctionDeclaration(decl) => self.check_nested_function(decl),
            Statement::VariableDeclaration(decl) => self.check_variable_declaration(decl),
            Statement::ExpressionStatement(stmt) => self.check_expression(&stmt.expression, None).map(|_| ()),
            Statement::ReturnStatement(stmt) => self.check_return_statement(stmt),
        }
    }

    /// Enter a value in the innermost scope, or the global scope at the top
    /// level.
    fn declare_value(&mut self, name: &str, type_id: TypeId, location: SourceLocation) {
        let key = self.intern(name);
        let duplicate = match self.scopes.last_mut() {
            Some(scope) => scope.values.insert(key, type_id).is_some(),
            None => self
                .globals
                .insert(key, ValueSymbol::Variable(type_id))
                .is_some(),
        };
        if duplicate {
            self.error(location, &messages::DUPLICATE_IDENTIFIER_0, &[name]);
        }
    }

    fn check_variable_declaration(&mut self, decl: &VariableDeclaration) -> Result<(), CheckError> {
        let declared = match &decl.type_annotation {
            Some(node) => Some(self.resolve_type_node(node)?),
            None => None,
        };
        self.check_variable_initializer(decl, declared)
    }

    fn check_variable_initializer(&mut self, decl: &VariableDeclaration, declared: Option<TypeId>) -> Result<(), CheckError> {
        let type_id = match (&decl.initializer, declared) {
            (Some(init), Some(target)) => {
                let source = self.check_expression(init, Some(target))?;
                self.check_assignment(init, source, target, decl.loc, &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1);
                target
            }
            (Some(init), None) => self.check_expression(init, None)?,
            (None, Some(target)) => target,
            (None, None) => self.unknown(),
        };
        // A redeclared global keeps its first binding.
        let key = self.intern(&decl.name);
        if self.scopes.is_empty() && self.globals.contains_key(&key) {
            self.error(decl.loc, &messages::DUPLICATE_IDENTIFIER_0, &[&decl.name]);
            return Ok(());
        }
        self.declare_value(&decl.name, type_id, decl.loc);
        Ok(())
    }

    fn check_return_statement(&mut self, stmt: &ReturnStatement) -> Result<(), CheckError> {
        let Some(context) = self.returns.last().copied() else {
            self.error(stmt.loc, &messages::A_RETURN_STATEMENT_CAN_ONLY_BE_USED_WITHIN_A_FUNCTION_BODY, &[]);
            if let Some(expr) = &stmt.expression {
                self.check_expression(expr, None)?;
            }
            return Ok(());
        };
        let Some(expr) = &stmt.expression else {
            return Ok(());
        };

        // Later returns of an unannotated function must agree with the first.
        let expected = context.declared.or(context.inferred);
        let type_id = self.check_expression(expr, expected)?;
        if let Some(target) = expected {
            self.check_assignment(expr, type_id, target, expr.loc(), &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1);
        }
        if let Some(context) = self.returns.last_mut() {
            context.has_value = true;
            if context.inferred.is_none() {
                context.inferred = Some(type_id);
            }
        }
        Ok(())
    }

    /// Check a function body and return its return type: the declared one,
    /// else the type of the first `return`, else `void`.
    fn check_body(
        &mut self,
        body: &[Statement],
        declared: Option<TypeId>,
        location: SourceLocation,
    ) -> Result<TypeId, CheckError> {
        self.returns.push(ReturnContext {
            declared,
            inferred: None,
            has_value: false,
        });
        for statement in body {
            self.check_statement(statement)?;
        }
        let context = self.returns.pop().unwrap_or(ReturnContext {
            declared,
            inferred: None,
            has_value: false,
        });

        match declared {
            Some(declared) => {
                let may_omit_value = self.type_table.flags(declared).intersects(TypeFlags::WILDCARD)
                    || self.type_table.is_primitive(declared, "void")
                    || self.type_table.is_primitive(declared, "undefined");
                if !context.has_value && !may_omit_value {
                    self.error(
                        location,
                        &messages::A_FUNCTION_WHOSE_DECLARED_TYPE_IS_NEITHER_UNDEFINED_VOID_NOR_ANY_MUST_RETURN_A_VALUE,
                        &[],
                    );
                }
                Ok(declared)
            }
            None => Ok(context.inferred.unwrap_or(self.type_table.void_type)),
        }
    }

    /// The type of a top-level function, checking its body first when the
    /// return type has to be inferred.
    fn function_type(&mut self, index: usize) -> Result<TypeId, CheckError> {
        if let Some(type_id) = self.functions[index].type_id {
            return Ok(type_id);
        }
        if self.functions[index].body == BodyState::Checking {
            // Referenced from its own body while its return type is unknown.
            return Ok(self.unknown());
        }
        self.check_function_body(index)?;
        Ok(self.functions[index].type_id.unwrap_or(self.type_table.unknown_type))
    }

    fn check_function_body(&mut self, index: usize) -> Result<(), CheckError> {
        if self.functions[index].body != BodyState::Unchecked {
            return Ok(());
        }
        self.functions[index].body = BodyState::Checking;
        let function = &self.functions[index];
        let decl = function.decl;
        let type_parameters = function.type_parameters.clone();
        let parameters = function.parameters.clone();
        let declared_return = function.return_type;

        // Top-level bodies only see globals, whoever triggers the check.
        let saved_scopes = std::mem::take(&mut self.scopes);
        let saved_returns = std::mem::take(&mut self.returns);
        let saved_file = std::mem::replace(&mut self.current_file, function.file);

        let mut scope = Scope::default();
        for (tp, &id) in decl.type_parameters.iter().zip(&type_parameters) {
            scope.types.insert(self.intern(&tp.name), id);
        }
        self.scopes.push(scope);
        for (decl_param, param) in decl.parameters.iter().zip(&parameters) {
            self.declare_value(&decl_param.name, param.type_id, decl_param.loc);
        }
        let return_type = self.check_body(&decl.body, declared_return, decl.loc)?;

        self.scopes = saved_scopes;
        self.returns = saved_returns;
        self.current_file = saved_file;

        if self.functions[index].type_id.is_none() {
            let type_id = self.type_table.make_function_type(FunctionType {
                type_parameters,
                parameters,
                return_type,
            });
            self.functions[index].type_id = Some(type_id);
        }
        self.functions[index].body = BodyState::Checked;
        Ok(())
    }

    fn check_nested_function(&mut self, decl: &FunctionDeclaration) -> Result<(), CheckError> {
        // Visible to its own body, untyped until the body is checked.
        self.declare_value(&decl.name, self.unknown(), decl.loc);
        let type_id = self.check_function_like(
            &decl.type_parameters,
            &decl.parameters,
            decl.return_type.as_ref(),
            &decl.body,
            None,
            decl.loc,
        )?;
        let key = self.intern(&decl.name);
        if let Some(scope) = self.scopes.last_mut() {
            scope.values.insert(key, type_id);
        }
        Ok(())
    }

    fn check_function_like(
        &mut self,
        type_parameters: &[TypeParameterDeclaration],
        parameters: &[tyshape_ast::Parameter],
        return_type: Option<&TypeNode>,
        body: &[Statement],
        context: Option<&FunctionType>,
        location: SourceLocation,
    ) -> Result<TypeId, CheckError> {
        self.scopes.push(Scope::default());
        let type_parameters = self.declare_type_parameters(type_parameters)?;
        let resolved = self.resolve_parameters(parameters, context)?;
        for (decl, param) in parameters.iter().zip(&resolved) {
            self.declare_value(&decl.name, param.type_id, decl.loc);
        }
        let declared_return = match return_type {
            Some(node) => Some(self.resolve_type_node(node)?),
            None => None,
        };
        let return_type = self.check_body(body, declared_return, location)?;
        self.scopes.pop();

        Ok(self.type_table.make_function_type(FunctionType {
            type_parameters,
            parameters: resolved,
            return_type,
        }))
    }

    // ========================================================================
    // Assignment
    // ========================================================================

    /// Check that `source`, the type of `expr`, may flow into `target`.
    /// Object literals are fresh and get per-property elaboration.
    fn check_assignment(
        &mut self,
        expr: &Expression,
        source: TypeId,
        target: TypeId,
        location: SourceLocation,
        head: &DiagnosticMessage,
    ) -> bool {
        if let Some(literal) = expr.as_object_literal() {
            return self.check_object_literal_assignment(literal, source, target, head);
        }
        match self.relation().is_assignable(source, target, false) {
            Ok(()) => true,
            Err(mismatch) => {
                self.report_mismatch(&mismatch, location, head);
                false
            }
        }
    }

    fn check_object_literal_assignment(
        &mut self,
        literal: &ObjectLiteralExpression,
        source: TypeId,
        target: TypeId,
        head: &DiagnosticMessage,
    ) -> bool {
        match self.relation().is_assignable(source, target, true) {
            Ok(()) => self.elaborate_literal(literal, source, target, true),
            Err(mismatch @ Mismatch::ExcessProperty { .. }) => {
                let location = match &mismatch {
                    Mismatch::ExcessProperty { names, .. } => literal
                        .properties
                        .iter()
                        .find(|p| names.first() == Some(&self.intern(&p.name)))
                        .map_or(literal.loc, |p| p.loc),
                    _ => literal.loc,
                };
                self.report_mismatch(&mismatch, location, head);
                false
            }
            Err(mismatch) => {
                if self.elaborate_literal(literal, source, target, false) {
                    self.report_mismatch(&mismatch, literal.loc, head);
                }
                false
            }
        }
    }

    /// Report problems at the literal's own properties. With `nested_only`,
    /// only nested literals are examined (for their excess properties).
    /// Returns `true` when nothing was reported.
    fn elaborate_literal(
        &mut self,
        literal: &ObjectLiteralExpression,
        source: TypeId,
        target: TypeId,
        nested_only: bool,
    ) -> bool {
        let s = resolve(&mut self.type_table, source);
        let t = resolve(&mut self.type_table, target);
        let (Some(so), Some(to)) = (self.type_table.as_object(s).cloned(), self.type_table.as_object(t).cloned()) else {
            return true;
        };

        let mut clean = true;
        for prop in &literal.properties {
            let name = self.intern(&prop.name);
            let (Some(sp), Some(tp)) = (so.properties.get(&name), to.properties.get(&name)) else {
                continue;
            };
            if let Some(nested) = prop.initializer.as_object_literal() {
                clean &= self.check_object_literal_assignment(
                    nested,
                    sp.type_id,
                    tp.type_id,
                    &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1,
                );
            } else if !nested_only {
                if let Err(mismatch) = self.relation().is_assignable(sp.type_id, tp.type_id, false) {
                    self.report_mismatch(&mismatch, prop.loc, &messages::TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1);
                    clean = false;
                }
            }
        }
        if nested_only {
            return clean;
        }

        for (&name, tp) in &to.properties {
            let present = so.properties.get(&name).is_some_and(|sp| !sp.optional || tp.optional);
            if !tp.optional && !present {
                let shown = [
                    self.type_table.names().resolve(name).to_string(),
                    self.display(source),
                    self.display(target),
                ];
                self.error(
                    literal.loc,
                    &messages::PROPERTY_0_IS_MISSING_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2,
                    &[&shown[0], &shown[1], &shown[2]],
                );
                clean = false;
            }
        }
        clean
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn check_expression(&mut self, expr: &Expression, contextual: Option<TypeId>) -> Result<TypeId, CheckError> {
        match expr {
            Expression::Identifier(id) => self.check_identifier(id),
            Expression::StringLiteral(_) => Ok(self.type_table.string_type),
            Expression::NumericLiteral(_) => Ok(self.type_table.number_type),
            Expression::BooleanLiteral(_) => Ok(self.type_table.boolean_type),
            Expression::ObjectLiteral(literal) => self.check_object_literal(literal, contextual),
            Expression::Call(call) => self.check_call_expression(call),
            Expression::PropertyAccess(access) => self.check_property_access(access),
            Expression::Function(function) => self.check_function_expression(function, contextual),
            Expression::Binary(binary) => self.check_binary_expression(binary),
        }
    }

    fn check_identifier(&mut self, id: &Identifier) -> Result<TypeId, CheckError> {
        let name = self.intern(&id.name);
        if let Some(type_id) = self.scopes.iter().rev().find_map(|s| s.values.get(&name).copied()) {
            return Ok(type_id);
        }
        match self.globals.get(&name).copied() {
            Some(ValueSymbol::Variable(type_id)) => Ok(type_id),
            Some(ValueSymbol::Function(index)) => self.function_type(index),
            // Function bodies may use globals declared further down.
            None if !self.returns.is_empty() && self.hoisted.contains_key(&name) => Ok(self.hoisted[&name]),
            None if id.name == "undefined" => Ok(self.type_table.undefined_type),
            None => {
                self.error(id.loc, &messages::CANNOT_FIND_NAME_0, &[&id.name]);
                Ok(self.unknown())
            }
        }
    }

    fn check_object_literal(
        &mut self,
        literal: &ObjectLiteralExpression,
        contextual: Option<TypeId>,
    ) -> Result<TypeId, CheckError> {
        let context = contextual
            .map(|c| resolve(&mut self.type_table, c))
            .and_then(|c| self.type_table.as_object(c).cloned());

        let mut seen = FxHashSet::default();
        let mut properties = Vec::with_capacity(literal.properties.len());
        for prop in &literal.properties {
            let name = self.intern(&prop.name);
            if !seen.insert(name) {
                return Err(CheckError::construction(
                    ConstructionError::DuplicateProperty(prop.name.clone()),
                    prop.loc,
                ));
            }
            let expected = context.as_ref().and_then(|c| c.properties.get(&name)).map(|p| p.type_id);
            let type_id = self.check_expression(&prop.initializer, expected)?;
            properties.push((name, Property::required(type_id)));
        }
        self.type_table
            .make_object_type(properties)
            .map_err(|e| CheckError::construction(e, literal.loc))
    }

    fn check_property_access(&mut self, access: &PropertyAccessExpression) -> Result<TypeId, CheckError> {
        let object = self.check_expression(&access.expression, None)?;
        let resolved = resolve(&mut self.type_table, object);
        if self.type_table.flags(resolved).intersects(TypeFlags::WILDCARD) {
            return Ok(self.unknown());
        }
        let name = self.intern(&access.name);
        if let Some(prop) = self.type_table.as_object(resolved).and_then(|o| o.properties.get(&name)) {
            return Ok(prop.type_id);
        }
        let shown = self.display(object);
        self.error(access.loc, &messages::PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1, &[&access.name, &shown]);
        Ok(self.unknown())
    }

    fn check_function_expression(
        &mut self,
        function: &FunctionExpression,
        contextual: Option<TypeId>,
    ) -> Result<TypeId, CheckError> {
        let context = contextual
            .map(|c| resolve(&mut self.type_table, c))
            .and_then(|c| self.type_table.as_function(c).cloned());
        self.check_function_like(
            &function.type_parameters,
            &function.parameters,
            function.return_type.as_ref(),
            &function.body,
            context.as_ref(),
            function.loc,
        )
    }

    fn check_binary_expression(&mut self, binary: &BinaryExpression) -> Result<TypeId, CheckError> {
        let left = self.check_expression(&binary.left, None)?;
        let right = self.check_expression(&binary.right, None)?;
        let table = &self.type_table;
        let is_string = |t: TypeId| table.is_primitive(t, "string");
        let is_wild = |t: TypeId| table.flags(t).intersects(TypeFlags::WILDCARD);
        let is_numeric = |t: TypeId| table.is_primitive(t, "number") || is_wild(t);

        let result = match binary.operator {
            BinaryOperator::Plus if is_string(left) || is_string(right) => Some(table.string_type),
            BinaryOperator::Plus if is_wild(left) && is_wild(right) => Some(table.unknown_type),
            _ if is_numeric(left) && is_numeric(right) => Some(table.number_type),
            _ => None,
        };
        match result {
            Some(type_id) => Ok(type_id),
            None => {
                let (l, r) = (self.display(left), self.display(right));
                self.error(
                    binary.loc,
                    &messages::OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_1_AND_2,
                    &[binary.operator.as_str(), &l, &r],
                );
                Ok(self.unknown())
            }
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn check_call_expression(&mut self, call: &CallExpression) -> Result<TypeId, CheckError> {
        let callee = self.check_expression(&call.callee, None)?;
        let resolved = resolve(&mut self.type_table, callee);
        if self.type_table.flags(resolved).intersects(TypeFlags::WILDCARD) {
            self.check_unchecked_arguments(&call.arguments, &[])?;
            return Ok(self.unknown());
        }
        let Some(signature) = self.type_table.as_function(resolved).cloned() else {
            let shown = self.display(callee);
            self.error(call.loc, &messages::THIS_EXPRESSION_IS_NOT_CALLABLE_TYPE_0_HAS_NO_CALL_SIGNATURES, &[&shown]);
            self.check_unchecked_arguments(&call.arguments, &[])?;
            return Ok(self.unknown());
        };

        let (min, max) = (signature.min_argument_count(), signature.parameters.len());
        if call.arguments.len() < min || call.arguments.len() > max {
            let expected = if min == max {
                max.to_string()
            } else {
                format!("{}-{}", min, max)
            };
            self.error(
                call.loc,
                &messages::EXPECTED_0_ARGUMENTS_BUT_GOT_1,
                &[&expected, &call.arguments.len().to_string()],
            );
        }

        if signature.is_generic() {
            return self.check_generic_call(call, resolved, &signature);
        }
        if !call.type_arguments.is_empty() {
            self.error(
                call.loc,
                &messages::EXPECTED_0_TYPE_ARGUMENTS_BUT_GOT_1,
                &["0", &call.type_arguments.len().to_string()],
            );
        }
        let parameters: Vec<TypeId> = signature.parameters.iter().map(|p| p.type_id).collect();
        self.check_arguments(&call.arguments, &parameters, &mut vec![None; call.arguments.len()])?;
        Ok(signature.return_type)
    }

    /// Check each argument against its parameter. Arguments whose type is
    /// already known are not re-checked as expressions.
    fn check_arguments(
        &mut self,
        arguments: &[Expression],
        parameters: &[TypeId],
        known: &mut [Option<TypeId>],
    ) -> Result<(), CheckError> {
        for (i, argument) in arguments.iter().enumerate() {
            let parameter = parameters.get(i).copied();
            let type_id = match known[i] {
                Some(type_id) => type_id,
                None => self.check_expression(argument, parameter)?,
            };
            known[i] = Some(type_id);
            if let Some(parameter) = parameter {
                self.check_assignment(
                    argument,
                    type_id,
                    parameter,
                    argument.loc(),
                    &messages::ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1,
                );
            }
        }
        Ok(())
    }

    /// Arguments of a call that could not be resolved are still checked as
    /// expressions, without a parameter to check against.
    fn check_unchecked_arguments(&mut self, arguments: &[Expression], known: &[Option<TypeId>]) -> Result<(), CheckError> {
        for (i, argument) in arguments.iter().enumerate() {
            if known.get(i).copied().flatten().is_none() {
                self.check_expression(argument, None)?;
            }
        }
        Ok(())
    }

    fn check_generic_call(
        &mut self,
        call: &CallExpression,
        callee: TypeId,
        signature: &FunctionType,
    ) -> Result<TypeId, CheckError> {
        let mut known: Vec<Option<TypeId>> = vec![None; call.arguments.len()];

        let instantiated = if call.type_arguments.is_empty() {
            match self.infer_type_arguments(call, signature, &mut known)? {
                Some(instantiation) => instantiation.apply(&mut self.type_table, signature),
                None => {
                    self.check_unchecked_arguments(&call.arguments, &known)?;
                    return Ok(self.unknown());
                }
            }
        } else {
            let mut explicit = Vec::with_capacity(call.type_arguments.len());
            for node in &call.type_arguments {
                explicit.push(self.resolve_type_node(node)?);
            }
            match instantiate(&mut self.type_table, callee, &[], Some(explicit.as_slice())) {
                Ok(instantiated) => instantiated,
                Err(err) => {
                    self.report_inference_error(&err, call.loc);
                    self.check_unchecked_arguments(&call.arguments, &known)?;
                    return Ok(self.unknown());
                }
            }
        };
        self.check_instantiated_call(call, signature, &instantiated, &mut known)?;
        Ok(instantiated.return_type)
    }

    fn check_instantiated_call(
        &mut self,
        call: &CallExpression,
        signature: &FunctionType,
        instantiated: &InstantiatedSignature,
        known: &mut [Option<TypeId>],
    ) -> Result<(), CheckError> {
        if let Some(category) = self.options.unresolved_type_parameters.category() {
            for &parameter in &instantiated.unresolved {
                let shown = self.display(parameter);
                self.report(
                    Diagnostic::at(
                        call.loc,
                        &messages::TYPE_PARAMETER_0_COULD_NOT_BE_INFERRED_AND_DEFAULTS_TO_UNKNOWN,
                        &[&shown],
                    )
                    .with_category(category),
                );
            }
        }
        for (i, &parameter) in signature.type_parameters.iter().enumerate() {
            let location = call.type_arguments.get(i).map_or(call.loc, |node| node.loc());
            if let Some(&argument) = instantiated.bindings.get(&parameter) {
                self.check_constraint(parameter, argument, &instantiated.bindings, location);
            }
        }

        tracing::debug!(
            return_type = %self.display(instantiated.return_type),
            unresolved = instantiated.unresolved.len(),
            "instantiated call"
        );
        self.check_arguments(&call.arguments, &instantiated.parameters, known)
    }

    /// Infer type arguments in two passes: arguments that do not need a
    /// contextual type first, then unannotated function expressions, typed
    /// from what the first pass inferred. Returns `None` after reporting an
    /// inconsistent inference.
    fn infer_type_arguments(
        &mut self,
        call: &CallExpression,
        signature: &FunctionType,
        known: &mut [Option<TypeId>],
    ) -> Result<Option<Instantiation>, CheckError> {
        let mut inference = Inference::new(&signature.type_parameters);
        for context_sensitive_pass in [false, true] {
            for (i, (argument, parameter)) in call.arguments.iter().zip(&signature.parameters).enumerate() {
                let is_context_sensitive = matches!(argument, Expression::Function(f) if f.is_context_sensitive());
                if is_context_sensitive != context_sensitive_pass {
                    continue;
                }
                let context = inference.contextual_type(&mut self.type_table, parameter.type_id);
                let type_id = self.check_expression(argument, Some(context))?;
                known[i] = Some(type_id);
                if let Err(err) = inference.infer(&mut self.type_table, parameter.type_id, type_id) {
                    self.report_inference_error(&err, argument.loc());
                    return Ok(None);
                }
            }
        }
        Ok(Some(inference.finish(&self.type_table)))
    }

    fn report_inference_error(&mut self, err: &InferenceError, location: SourceLocation) {
        match *err {
            InferenceError::Inconsistent {
                parameter,
                first,
                second,
            } => {
                let shown = [self.display(parameter), self.display(first), self.display(second)];
                self.error(
                    location,
                    &messages::THE_TYPE_ARGUMENT_FOR_TYPE_PARAMETER_0_CANNOT_BE_INFERRED_FROM_THE_USAGE,
                    &[&shown[0], &shown[1], &shown[2]],
                );
            }
            InferenceError::TypeArgumentCount { expected, found } => self.error(
                location,
                &messages::EXPECTED_0_TYPE_ARGUMENTS_BUT_GOT_1,
                &[&expected.to_string(), &found.to_string()],
            ),
            InferenceError::NotAFunction(callee) => {
                let shown = self.display(callee);
                self.error(
                    location,
                    &messages::THIS_EXPRESSION_IS_NOT_CALLABLE_TYPE_0_HAS_NO_CALL_SIGNATURES,
                    &[&shown],
                );
            }
        }
    }
}

/// Check one source file with a fresh checker.
pub fn check(file: &SourceFile, options: &CheckerOptions) -> Result<Vec<Diagnostic>, CheckError> {
    let mut checker = Checker::new(options.clone());
    checker.check_source_file(file)?;
    Ok(checker.take_diagnostics().into_diagnostics())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tyshape_ast::factory::*;

    fn run(statements: Vec<Statement>) -> Vec<Diagnostic> {
        check(&SourceFile::new("test.ts", statements), &CheckerOptions::default()).unwrap()
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
        diagnostics.iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_phases() {
        let file = SourceFile::new("a.ts", vec![]);
        let mut checker = Checker::new(CheckerOptions::default());
        assert_eq!(checker.phase(), Phase::Declaring);
        checker.check_source_file(&file).unwrap();
        assert_eq!(checker.phase(), Phase::Done);
        assert_eq!(checker.check_source_file(&file), Err(CheckError::AlreadyChecked));
        assert!(matches!(
            checker.declare_source_file(&file),
            Err(CheckError::DeclarationAfterDeclaring { name }) if name == "a.ts"
        ));
    }

    #[test]
    fn test_undeclared_name() {
        let diagnostics = run(vec![expression_statement(identifier("nope").at(2, 1))]);
        assert_eq!(codes(&diagnostics), vec![2304]);
        assert_eq!(diagnostics[0].location, Some(SourceLocation::new(2, 1)));
        assert_eq!(diagnostics[0].file.as_deref(), Some("test.ts"));
    }

    #[test]
    fn test_return_outside_function() {
        let diagnostics = run(vec![return_statement(Some(number(1.0)))]);
        assert_eq!(codes(&diagnostics), vec![1108]);
    }

    #[test]
    fn test_missing_return_value() {
        let diagnostics = run(vec![function("f", vec![], vec![], Some(number_type()), vec![])]);
        assert_eq!(codes(&diagnostics), vec![2355]);
        let diagnostics = run(vec![function("g", vec![], vec![], Some(void_type()), vec![])]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_binary_operators() {
        let diagnostics = run(vec![
            variable("a", Some(string_type()), Some(binary(BinaryOperator::Plus, string("x"), number(1.0)))),
            variable("b", Some(number_type()), Some(binary(BinaryOperator::Asterisk, number(2.0), number(3.0)))),
            expression_statement(binary(BinaryOperator::Minus, string("x"), number(1.0))),
        ]);
        assert_eq!(codes(&diagnostics), vec![2365]);
    }

    #[test]
    fn test_duplicate_property_is_fatal() {
        let file = SourceFile::new(
            "dup.ts",
            vec![interface(
                "A",
                vec![],
                vec![
                    property_signature("x", number_type()),
                    property_signature("x", string_type()).at(3, 5),
                ],
            )],
        );
        let err = check(&file, &CheckerOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            CheckError::Construction {
                source: ConstructionError::DuplicateProperty(ref name),
                location,
            } if name == "x" && location == SourceLocation::new(3, 5)
        ));
    }

    #[test]
    fn test_lazy_return_type_inference() {
        // `later` is used before its declaration; its return type comes from its body.
        let file = SourceFile::new(
            "lazy.ts",
            vec![
                variable("n", Some(number_type()), Some(call(identifier("later"), vec![]))),
                function("later", vec![], vec![], None, vec![return_statement(Some(number(1.0)))]),
            ],
        );
        let mut checker = Checker::new(CheckerOptions::default());
        checker.check_source_file(&file).unwrap();
        assert!(checker.diagnostics().is_empty());
        let later = checker.global_type("later").unwrap().unwrap();
        assert_eq!(checker.type_table.type_to_string(later), "() => number");
    }

    #[test]
    fn test_recursive_function_without_annotation() {
        let diagnostics = run(vec![function(
            "loop_",
            vec![],
            vec![parameter("x", Some(number_type()))],
            None,
            vec![return_statement(Some(call(identifier("loop_"), vec![identifier("x")])))],
        )]);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_not_callable() {
        let diagnostics = run(vec![
            variable("x", Some(number_type()), Some(number(1.0))),
            expression_statement(call(identifier("x"), vec![])),
        ]);
        assert_eq!(codes(&diagnostics), vec![2349]);
    }

    #[test]
    fn test_unknown_property() {
        let diagnostics = run(vec![
            interface("P", vec![], vec![property_signature("a", number_type())]),
            variable("p", Some(type_ref("P", vec![])), None),
            expression_statement(property_access(identifier("p"), "b").at(3, 1)),
        ]);
        assert_eq!(codes(&diagnostics), vec![2339]);
        assert_eq!(diagnostics[0].message_text, "Property 'b' does not exist on type 'P'.");
    }
}
