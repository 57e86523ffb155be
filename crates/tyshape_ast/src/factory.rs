//! Node factory.
//!
//! Terse constructors for building trees by hand. Nodes are created at the
//! unknown location; [`Located::at`] stamps a location on the outermost node.

use crate::node::*;
use tyshape_core::text::SourceLocation;

/// Nodes that carry a location.
pub trait Located: Sized {
    fn set_loc(&mut self, loc: SourceLocation);

    fn at(mut self, line: u32, column: u32) -> Self {
        self.set_loc(SourceLocation::new(line, column));
        self
    }
}

impl Located for Statement {
    fn set_loc(&mut self, loc: SourceLocation) {
        *self.loc_mut() = loc;
    }
}

impl Located for Expression {
    fn set_loc(&mut self, loc: SourceLocation) {
        *self.loc_mut() = loc;
    }
}

impl Located for PropertyAssignment {
    fn set_loc(&mut self, loc: SourceLocation) {
        self.loc = loc;
    }
}

impl Located for Parameter {
    fn set_loc(&mut self, loc: SourceLocation) {
        self.loc = loc;
    }
}

impl Located for PropertySignature {
    fn set_loc(&mut self, loc: SourceLocation) {
        self.loc = loc;
    }
}

const NOWHERE: SourceLocation = SourceLocation::new(0, 0);

// ============================================================================
// Type nodes
// ============================================================================

pub fn keyword(keyword: Keyword) -> TypeNode {
    TypeNode::Keyword(KeywordTypeNode { keyword, loc: NOWHERE })
}

pub fn string_type() -> TypeNode {
    keyword(Keyword::String)
}

pub fn number_type() -> TypeNode {
    keyword(Keyword::Number)
}

pub fn boolean_type() -> TypeNode {
    keyword(Keyword::Boolean)
}

pub fn void_type() -> TypeNode {
    keyword(Keyword::Void)
}

pub fn unknown_type() -> TypeNode {
    keyword(Keyword::Unknown)
}

/// `Name<Args>`; also used for references to type parameters.
pub fn type_ref(name: &str, type_arguments: Vec<TypeNode>) -> TypeNode {
    TypeNode::TypeReference(TypeReferenceNode {
        name: name.to_string(),
        type_arguments,
        loc: NOWHERE,
    })
}

pub fn type_literal(members: Vec<PropertySignature>) -> TypeNode {
    TypeNode::TypeLiteral(TypeLiteralNode { members, loc: NOWHERE })
}

pub fn function_type(
    type_parameters: Vec<TypeParameterDeclaration>,
    parameters: Vec<Parameter>,
    return_type: TypeNode,
) -> TypeNode {
    TypeNode::FunctionType(FunctionTypeNode {
        type_parameters,
        parameters,
        return_type: Box::new(return_type),
        loc: NOWHERE,
    })
}

pub fn property_signature(name: &str, type_annotation: TypeNode) -> PropertySignature {
    PropertySignature {
        name: name.to_string(),
        optional: false,
        type_annotation,
        loc: NOWHERE,
    }
}

pub fn optional_property_signature(name: &str, type_annotation: TypeNode) -> PropertySignature {
    PropertySignature {
        optional: true,
        ..property_signature(name, type_annotation)
    }
}

pub fn type_parameter(name: &str) -> TypeParameterDeclaration {
    TypeParameterDeclaration {
        name: name.to_string(),
        constraint: None,
        loc: NOWHERE,
    }
}

pub fn constrained_type_parameter(name: &str, constraint: TypeNode) -> TypeParameterDeclaration {
    TypeParameterDeclaration {
        constraint: Some(constraint),
        ..type_parameter(name)
    }
}

pub fn parameter(name: &str, type_annotation: Option<TypeNode>) -> Parameter {
    Parameter {
        name: name.to_string(),
        optional: false,
        type_annotation,
        loc: NOWHERE,
    }
}

pub fn optional_parameter(name: &str, type_annotation: Option<TypeNode>) -> Parameter {
    Parameter {
        optional: true,
        ..parameter(name, type_annotation)
    }
}

// ============================================================================
// Statements
// ============================================================================

pub fn interface(
    name: &str,
    type_parameters: Vec<TypeParameterDeclaration>,
    members: Vec<PropertySignature>,
) -> Statement {
    Statement::InterfaceDeclaration(InterfaceDeclaration {
        name: name.to_string(),
        type_parameters,
        members,
        loc: NOWHERE,
    })
}

pub fn function(
    name: &str,
    type_parameters: Vec<TypeParameterDeclaration>,
    parameters: Vec<Parameter>,
    return_type: Option<TypeNode>,
    body: Vec<Statement>,
) -> Statement {
    Statement::FunctionDeclaration(FunctionDeclaration {
        name: name.to_string(),
        type_parameters,
        parameters,
        return_type,
        body,
        loc: NOWHERE,
    })
}

pub fn variable(name: &str, type_annotation: Option<TypeNode>, initializer: Option<Expression>) -> Statement {
    Statement::VariableDeclaration(VariableDeclaration {
        name: name.to_string(),
        type_annotation,
        initializer,
        loc: NOWHERE,
    })
}

pub fn expression_statement(expression: Expression) -> Statement {
    Statement::ExpressionStatement(ExpressionStatement { expression, loc: NOWHERE })
}

pub fn return_statement(expression: Option<Expression>) -> Statement {
    Statement::ReturnStatement(ReturnStatement { expression, loc: NOWHERE })
}

// ============================================================================
// Expressions
// ============================================================================

pub fn identifier(name: &str) -> Expression {
    Expression::Identifier(Identifier {
        name: name.to_string(),
        loc: NOWHERE,
    })
}

pub fn string(value: &str) -> Expression {
    Expression::StringLiteral(StringLiteral {
        value: value.to_string(),
        loc: NOWHERE,
    })
}

pub fn number(value: f64) -> Expression {
    Expression::NumericLiteral(NumericLiteral { value, loc: NOWHERE })
}

pub fn boolean(value: bool) -> Expression {
    Expression::BooleanLiteral(BooleanLiteral { value, loc: NOWHERE })
}

pub fn property(name: &str, initializer: Expression) -> PropertyAssignment {
    PropertyAssignment {
        name: name.to_string(),
        initializer,
        loc: NOWHERE,
    }
}

pub fn object(properties: Vec<PropertyAssignment>) -> Expression {
    Expression::ObjectLiteral(ObjectLiteralExpression { properties, loc: NOWHERE })
}

pub fn call(callee: Expression, arguments: Vec<Expression>) -> Expression {
    call_with_type_arguments(callee, vec![], arguments)
}

pub fn call_with_type_arguments(
    callee: Expression,
    type_arguments: Vec<TypeNode>,
    arguments: Vec<Expression>,
) -> Expression {
    Expression::Call(CallExpression {
        callee: Box::new(callee),
        type_arguments,
        arguments,
        loc: NOWHERE,
    })
}

pub fn property_access(expression: Expression, name: &str) -> Expression {
    Expression::PropertyAccess(PropertyAccessExpression {
        expression: Box::new(expression),
        name: name.to_string(),
        loc: NOWHERE,
    })
}

pub fn function_expression(
    type_parameters: Vec<TypeParameterDeclaration>,
    parameters: Vec<Parameter>,
    return_type: Option<TypeNode>,
    body: Vec<Statement>,
) -> Expression {
    Expression::Function(FunctionExpression {
        type_parameters,
        parameters,
        return_type,
        body,
        loc: NOWHERE,
    })
}

/// `(params) => body`, desugared to a single `return body`.
pub fn arrow(parameters: Vec<Parameter>, body: Expression) -> Expression {
    let loc = body.loc();
    let ret = return_statement(Some(body)).at(loc.line, loc.column);
    function_expression(vec![], parameters, None, vec![ret])
}

pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        loc: NOWHERE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_sets_outer_location_only() {
        let expr = object(vec![property("tag", number(42.0)).at(14, 3)]).at(13, 25);
        assert_eq!(expr.loc(), SourceLocation::new(13, 25));
        let literal = expr.as_object_literal().unwrap();
        assert_eq!(literal.properties[0].loc, SourceLocation::new(14, 3));
        assert!(literal.properties[0].initializer.loc().is_unknown());
    }

    #[test]
    fn test_arrow_desugars_to_return() {
        let expr = arrow(
            vec![parameter("x", None)],
            binary(BinaryOperator::Asterisk, identifier("x"), identifier("x")),
        );
        let Expression::Function(f) = expr else {
            panic!("arrow should build a function expression");
        };
        assert!(f.is_context_sensitive());
        assert!(matches!(f.body.as_slice(), [Statement::ReturnStatement(_)]));
    }
}
