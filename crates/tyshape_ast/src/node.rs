//! AST node definitions.
//!
//! Node names follow TypeScript's AST. Every node carries the location of its
//! first token. On the wire each enum is internally tagged by `"kind"` and
//! struct fields are camelCase, e.g.
//!
//! ```json
//! { "kind": "VariableDeclaration", "name": "x",
//!   "typeAnnotation": { "kind": "TypeReference", "name": "Tagged",
//!                       "typeArguments": [{ "kind": "Keyword", "keyword": "string" }] },
//!   "initializer": { "kind": "ObjectLiteral", "properties": [] },
//!   "loc": { "line": 6, "column": 5 } }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tyshape_core::text::SourceLocation;

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFile {
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            file_name: file_name.into(),
            statements,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Statement {
    InterfaceDeclaration(InterfaceDeclaration),
    FunctionDeclaration(FunctionDeclaration),
    VariableDeclaration(VariableDeclaration),
    ExpressionStatement(ExpressionStatement),
    ReturnStatement(ReturnStatement),
}

impl Statement {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Statement::InterfaceDeclaration(n) => n.loc,
            Statement::FunctionDeclaration(n) => n.loc,
            Statement::VariableDeclaration(n) => n.loc,
            Statement::ExpressionStatement(n) => n.loc,
            Statement::ReturnStatement(n) => n.loc,
        }
    }

    pub(crate) fn loc_mut(&mut self) -> &mut SourceLocation {
        match self {
            Statement::InterfaceDeclaration(n) => &mut n.loc,
            Statement::FunctionDeclaration(n) => &mut n.loc,
            Statement::VariableDeclaration(n) => &mut n.loc,
            Statement::ExpressionStatement(n) => &mut n.loc,
            Statement::ReturnStatement(n) => &mut n.loc,
        }
    }
}

/// `interface Name<T> { a: T; b?: string }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDeclaration {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDeclaration>,
    #[serde(default)]
    pub members: Vec<PropertySignature>,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// A property member of an interface or type literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySignature {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    pub type_annotation: TypeNode,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `T` or `T extends Constraint` in a type parameter list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParameterDeclaration {
    pub name: String,
    pub constraint: Option<TypeNode>,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `function name<T>(x: T): R { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    pub name: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDeclaration>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
    pub type_annotation: Option<TypeNode>,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `let name: T = init;` (one declarator per statement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    pub name: String,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionStatement {
    pub expression: Expression,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnStatement {
    pub expression: Option<Expression>,
    #[serde(default)]
    pub loc: SourceLocation,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Expression {
    Identifier(Identifier),
    StringLiteral(StringLiteral),
    NumericLiteral(NumericLiteral),
    BooleanLiteral(BooleanLiteral),
    ObjectLiteral(ObjectLiteralExpression),
    Call(CallExpression),
    PropertyAccess(PropertyAccessExpression),
    Function(FunctionExpression),
    Binary(BinaryExpression),
}

impl Expression {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Expression::Identifier(n) => n.loc,
            Expression::StringLiteral(n) => n.loc,
            Expression::NumericLiteral(n) => n.loc,
            Expression::BooleanLiteral(n) => n.loc,
            Expression::ObjectLiteral(n) => n.loc,
            Expression::Call(n) => n.loc,
            Expression::PropertyAccess(n) => n.loc,
            Expression::Function(n) => n.loc,
            Expression::Binary(n) => n.loc,
        }
    }

    pub(crate) fn loc_mut(&mut self) -> &mut SourceLocation {
        match self {
            Expression::Identifier(n) => &mut n.loc,
            Expression::StringLiteral(n) => &mut n.loc,
            Expression::NumericLiteral(n) => &mut n.loc,
            Expression::BooleanLiteral(n) => &mut n.loc,
            Expression::ObjectLiteral(n) => &mut n.loc,
            Expression::Call(n) => &mut n.loc,
            Expression::PropertyAccess(n) => &mut n.loc,
            Expression::Function(n) => &mut n.loc,
            Expression::Binary(n) => &mut n.loc,
        }
    }

    /// Whether this expression creates a fresh object literal value.
    pub fn as_object_literal(&self) -> Option<&ObjectLiteralExpression> {
        match self {
            Expression::ObjectLiteral(n) => Some(n),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericLiteral {
    pub value: f64,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `{ a: 1, b: "x" }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectLiteralExpression {
    #[serde(default)]
    pub properties: Vec<PropertyAssignment>,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAssignment {
    pub name: String,
    pub initializer: Expression,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `callee<TypeArgs>(args)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallExpression {
    pub callee: Box<Expression>,
    #[serde(default)]
    pub type_arguments: Vec<TypeNode>,
    #[serde(default)]
    pub arguments: Vec<Expression>,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `expression.name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccessExpression {
    pub expression: Box<Expression>,
    pub name: String,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// Function expressions and arrow functions.
///
/// Arrow functions with an expression body are represented with a body of a
/// single `return` statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionExpression {
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDeclaration>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    #[serde(default)]
    pub body: Vec<Statement>,
    #[serde(default)]
    pub loc: SourceLocation,
}

impl FunctionExpression {
    /// A function expression is context sensitive when some parameter relies
    /// on the contextual type for its own type.
    pub fn is_context_sensitive(&self) -> bool {
        self.type_parameters.is_empty()
            && self.parameters.iter().any(|p| p.type_annotation.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
    #[serde(rename = "*")]
    Asterisk,
    #[serde(rename = "/")]
    Slash,
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Asterisk => "*",
            BinaryOperator::Slash => "/",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Type Nodes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TypeNode {
    Keyword(KeywordTypeNode),
    TypeReference(TypeReferenceNode),
    TypeLiteral(TypeLiteralNode),
    FunctionType(FunctionTypeNode),
}

impl TypeNode {
    pub fn loc(&self) -> SourceLocation {
        match self {
            TypeNode::Keyword(n) => n.loc,
            TypeNode::TypeReference(n) => n.loc,
            TypeNode::TypeLiteral(n) => n.loc,
            TypeNode::FunctionType(n) => n.loc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTypeNode {
    pub keyword: Keyword,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// Primitive type keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Void,
    Null,
    Undefined,
    Unknown,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::String => "string",
            Keyword::Number => "number",
            Keyword::Boolean => "boolean",
            Keyword::Void => "void",
            Keyword::Null => "null",
            Keyword::Undefined => "undefined",
            Keyword::Unknown => "unknown",
        }
    }
}

/// `Name` or `Name<Args>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeReferenceNode {
    pub name: String,
    #[serde(default)]
    pub type_arguments: Vec<TypeNode>,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `{ a: string; b?: number }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeLiteralNode {
    #[serde(default)]
    pub members: Vec<PropertySignature>,
    #[serde(default)]
    pub loc: SourceLocation,
}

/// `<T>(x: T) => T`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionTypeNode {
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterDeclaration>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub return_type: Box<TypeNode>,
    #[serde(default)]
    pub loc: SourceLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_variable_declaration() {
        let json = r#"{
            "kind": "VariableDeclaration",
            "name": "x",
            "typeAnnotation": {
                "kind": "TypeReference",
                "name": "Tagged",
                "typeArguments": [{ "kind": "Keyword", "keyword": "string" }]
            },
            "initializer": {
                "kind": "ObjectLiteral",
                "properties": [
                    { "name": "tag", "initializer": { "kind": "StringLiteral", "value": "hello" } }
                ]
            },
            "loc": { "line": 6, "column": 5 }
        }"#;
        let stmt: Statement = serde_json::from_str(json).unwrap();
        let Statement::VariableDeclaration(decl) = &stmt else {
            panic!("expected a variable declaration, got {:?}", stmt);
        };
        assert_eq!(decl.name, "x");
        assert_eq!(stmt.loc(), SourceLocation::new(6, 5));
        match &decl.type_annotation {
            Some(TypeNode::TypeReference(r)) => {
                assert_eq!(r.name, "Tagged");
                assert_eq!(
                    r.type_arguments,
                    vec![TypeNode::Keyword(KeywordTypeNode {
                        keyword: Keyword::String,
                        loc: SourceLocation::default(),
                    })]
                );
            }
            other => panic!("unexpected annotation {:?}", other),
        }
        let literal = decl.initializer.as_ref().and_then(Expression::as_object_literal).unwrap();
        assert_eq!(literal.properties.len(), 1);
    }

    #[test]
    fn test_deserialize_binary_operator() {
        let json = r#"{
            "kind": "Binary",
            "operator": "*",
            "left": { "kind": "Identifier", "name": "x" },
            "right": { "kind": "Identifier", "name": "x" }
        }"#;
        let expr: Expression = serde_json::from_str(json).unwrap();
        match expr {
            Expression::Binary(b) => assert_eq!(b.operator, BinaryOperator::Asterisk),
            other => panic!("unexpected expression {:?}", other),
        }
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{ "kind": "FunctionDeclaration", "name": "f" }"#;
        let stmt: Statement = serde_json::from_str(json).unwrap();
        let Statement::FunctionDeclaration(f) = stmt else {
            panic!("expected a function declaration");
        };
        assert!(f.type_parameters.is_empty());
        assert!(f.parameters.is_empty());
        assert!(f.return_type.is_none());
        assert!(f.loc.is_unknown());
    }

    #[test]
    fn test_context_sensitive_function_expression() {
        let untyped = FunctionExpression {
            type_parameters: vec![],
            parameters: vec![Parameter {
                name: "x".into(),
                optional: false,
                type_annotation: None,
                loc: SourceLocation::default(),
            }],
            return_type: None,
            body: vec![],
            loc: SourceLocation::default(),
        };
        assert!(untyped.is_context_sensitive());

        let no_params = FunctionExpression { parameters: vec![], ..untyped };
        assert!(!no_params.is_context_sensitive());
    }
}
