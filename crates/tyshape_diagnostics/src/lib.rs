//! tyshape_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Message templates carry TypeScript-compatible codes so that output lines up
//! with what `tsc` reports for the same program. Diagnostics are plain data:
//! the checker appends them, consumers read them, nothing mutates them.

use serde::Serialize;
use std::fmt;
use tyshape_core::text::SourceLocation;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and default category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g. 2322).
    pub code: u32,
    pub category: DiagnosticCategory,
    /// The template. May contain `{0}`, `{1}`, ... placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with location and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// The file this diagnostic belongs to, when it came from a named file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    #[serde(rename = "message")]
    pub message_text: String,
    pub code: u32,
    #[serde(rename = "severity")]
    pub category: DiagnosticCategory,
    /// Elaboration chain, outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<Diagnostic>,
}

impl Diagnostic {
    /// Create a diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            location: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
            related_information: Vec::new(),
        }
    }

    /// Create a diagnostic attached to a source location.
    pub fn at(location: SourceLocation, message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            location: Some(location),
            ..Self::new(message, args)
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        let file = file.into();
        for related in &mut self.related_information {
            related.file = Some(file.clone());
        }
        self.file = Some(file);
        self
    }

    /// Override the template's default category (used for configurable checks).
    pub fn with_category(mut self, category: DiagnosticCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_related(mut self, related: Diagnostic) -> Self {
        self.related_information.push(related);
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(location) = self.location {
                write!(f, "({})", location)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} TS{}: {}", self.category, self.code, self.message_text)
    }
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// An append-only list of diagnostics in detection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

}

impl Extend<Diagnostic> for DiagnosticCollection {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}

// ============================================================================
// Diagnostic Messages - codes follow TypeScript's diagnosticMessages.json
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Statement errors
    // ========================================================================
    pub const A_RETURN_STATEMENT_CAN_ONLY_BE_USED_WITHIN_A_FUNCTION_BODY: DiagnosticMessage = diag!(1108, Error, "A 'return' statement can only be used within a function body.");

    // ========================================================================
    // Semantic errors (2000-2999)
    // ========================================================================
    pub const CALL_SIGNATURE_RETURN_TYPES_0_AND_1_ARE_INCOMPATIBLE: DiagnosticMessage = diag!(2202, Error, "Call signature return types '{0}' and '{1}' are incompatible.");
    pub const DUPLICATE_IDENTIFIER_0: DiagnosticMessage = diag!(2300, Error, "Duplicate identifier '{0}'.");
    pub const CANNOT_FIND_NAME_0: DiagnosticMessage = diag!(2304, Error, "Cannot find name '{0}'.");
    pub const GENERIC_TYPE_0_REQUIRES_1_TYPE_ARGUMENT_S: DiagnosticMessage = diag!(2314, Error, "Generic type '{0}' requires {1} type argument(s).");
    pub const TYPE_0_IS_NOT_GENERIC: DiagnosticMessage = diag!(2315, Error, "Type '{0}' is not generic.");
    pub const TYPE_0_IS_NOT_ASSIGNABLE_TO_TYPE_1: DiagnosticMessage = diag!(2322, Error, "Type '{0}' is not assignable to type '{1}'.");
    pub const TYPES_OF_PROPERTY_0_ARE_INCOMPATIBLE: DiagnosticMessage = diag!(2326, Error, "Types of property '{0}' are incompatible.");
    pub const TYPES_OF_PARAMETERS_0_AND_1_ARE_INCOMPATIBLE: DiagnosticMessage = diag!(2328, Error, "Types of parameters '{0}' and '{1}' are incompatible.");
    pub const PROPERTY_0_DOES_NOT_EXIST_ON_TYPE_1: DiagnosticMessage = diag!(2339, Error, "Property '{0}' does not exist on type '{1}'.");
    pub const TYPE_0_DOES_NOT_SATISFY_THE_CONSTRAINT_1: DiagnosticMessage = diag!(2344, Error, "Type '{0}' does not satisfy the constraint '{1}'.");
    pub const ARGUMENT_OF_TYPE_0_IS_NOT_ASSIGNABLE_TO_PARAMETER_OF_TYPE_1: DiagnosticMessage = diag!(2345, Error, "Argument of type '{0}' is not assignable to parameter of type '{1}'.");
    pub const THIS_EXPRESSION_IS_NOT_CALLABLE_TYPE_0_HAS_NO_CALL_SIGNATURES: DiagnosticMessage = diag!(2349, Error, "This expression is not callable. Type '{0}' has no call signatures.");
    pub const OBJECT_LITERAL_MAY_ONLY_SPECIFY_KNOWN_PROPERTIES_AND_0_DOES_NOT_EXIST_IN_TYPE_1: DiagnosticMessage = diag!(2353, Error, "Object literal may only specify known properties, and '{0}' does not exist in type '{1}'.");
    pub const A_FUNCTION_WHOSE_DECLARED_TYPE_IS_NEITHER_UNDEFINED_VOID_NOR_ANY_MUST_RETURN_A_VALUE: DiagnosticMessage = diag!(2355, Error, "A function whose declared type is neither 'undefined', 'void', nor 'any' must return a value.");
    pub const OPERATOR_0_CANNOT_BE_APPLIED_TO_TYPES_1_AND_2: DiagnosticMessage = diag!(2365, Error, "Operator '{0}' cannot be applied to types '{1}' and '{2}'.");
    pub const THE_TYPE_ARGUMENT_FOR_TYPE_PARAMETER_0_CANNOT_BE_INFERRED_FROM_THE_USAGE: DiagnosticMessage = diag!(2453, Error, "The type argument for type parameter '{0}' cannot be inferred from the usage. Consider specifying the type arguments explicitly. Candidate '{1}' is not a valid type argument because it is not a supertype of candidate '{2}'.");
    pub const EXPECTED_0_ARGUMENTS_BUT_GOT_1: DiagnosticMessage = diag!(2554, Error, "Expected {0} arguments, but got {1}.");
    pub const EXPECTED_0_TYPE_ARGUMENTS_BUT_GOT_1: DiagnosticMessage = diag!(2558, Error, "Expected {0} type arguments, but got {1}.");
    pub const PROPERTY_0_IS_MISSING_IN_TYPE_1_BUT_REQUIRED_IN_TYPE_2: DiagnosticMessage = diag!(2741, Error, "Property '{0}' is missing in type '{1}' but required in type '{2}'.");
    pub const TARGET_SIGNATURE_PROVIDES_TOO_FEW_ARGUMENTS_EXPECTED_0_OR_MORE_BUT_GOT_1: DiagnosticMessage = diag!(2849, Error, "Target signature provides too few arguments. Expected {0} or more, but got {1}.");

    // ========================================================================
    // Configurable checks
    // ========================================================================
    pub const TYPE_PARAMETER_0_COULD_NOT_BE_INFERRED_AND_DEFAULTS_TO_UNKNOWN: DiagnosticMessage = diag!(7062, Warning, "Type parameter '{0}' could not be inferred and defaults to 'unknown'.");
}
