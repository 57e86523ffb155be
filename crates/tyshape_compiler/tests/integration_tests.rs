//! Compiler integration tests.
//!
//! End-to-end tests for the program pipeline: load -> check -> merge.

use std::path::PathBuf;
use tyshape_ast::factory::*;
use tyshape_ast::{SourceFile, Statement};
use tyshape_compiler::{Program, ProgramError};
use tyshape_diagnostics::DiagnosticCategory;
use tyshape_options::{CheckerOptions, DiagnosticLevel};

fn fixture_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../tyshape_checker/tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

/// `let <name>: number = "text";`
fn mismatch(name: &str, line: u32) -> Statement {
    variable(name, Some(number_type()), Some(string("text"))).at(line, 5)
}

fn program_with(files: Vec<SourceFile>, options: CheckerOptions) -> Program {
    let mut program = Program::new(vec![], options);
    for file in files {
        program.add_source(file);
    }
    program
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_load_fixtures_from_disk() {
    let mut program = Program::new(
        vec![fixture_path("interface.json"), fixture_path("linear.json")],
        CheckerOptions::default(),
    );
    program.load_root_files().unwrap();
    assert_eq!(program.source_files().len(), 2);

    let diagnostics = program.compile().unwrap();
    let codes: Vec<u32> = diagnostics.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![2353, 2322]);
    assert!(diagnostics
        .diagnostics()
        .iter()
        .all(|d| d.file.as_deref() == Some("001-interface.ts")));
    assert_eq!(diagnostics.error_count(), 2);
}

#[test]
fn test_load_stops_at_first_missing_file() {
    let mut program = Program::new(
        vec![fixture_path("linear.json"), fixture_path("missing.json")],
        CheckerOptions::default(),
    );
    let err = program.load_root_files().unwrap_err();
    assert!(matches!(err, ProgramError::Io { ref path, .. } if path.ends_with("missing.json")));
}

// ============================================================================
// Checking
// ============================================================================

#[test]
fn test_results_keep_input_order() {
    let files: Vec<SourceFile> = (0..32)
        .map(|i| SourceFile::new(format!("file{i}.ts"), vec![mismatch("x", i + 1)]))
        .collect();
    let program = program_with(files, CheckerOptions::default());

    let results = program.check();
    assert_eq!(results.len(), 32);
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result.file_name, format!("file{i}.ts"));
        let diagnostics = result.outcome.as_ref().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.map(|l| l.line), Some(i as u32 + 1));
    }

    let merged = program.compile().unwrap();
    let files: Vec<&str> = merged.diagnostics().iter().filter_map(|d| d.file.as_deref()).collect();
    let expected: Vec<String> = (0..32).map(|i| format!("file{i}.ts")).collect();
    assert_eq!(files, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn test_files_do_not_share_globals() {
    let program = program_with(
        vec![
            SourceFile::new("a.ts", vec![variable("shared", Some(number_type()), Some(number(1.0)))]),
            SourceFile::new("b.ts", vec![expression_statement(identifier("shared").at(1, 1))]),
        ],
        CheckerOptions::default(),
    );
    let diagnostics = program.compile().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.diagnostics()[0].code, 2304);
    assert_eq!(diagnostics.diagnostics()[0].file.as_deref(), Some("b.ts"));
}

#[test]
fn test_fatal_error_names_the_file() {
    let program = program_with(
        vec![
            SourceFile::new("ok.ts", vec![mismatch("x", 1)]),
            SourceFile::new(
                "dup.ts",
                vec![expression_statement(object(vec![
                    property("a", number(1.0)),
                    property("a", number(2.0)).at(1, 12),
                ]))],
            ),
        ],
        CheckerOptions::default(),
    );

    let results = program.check();
    assert!(results[0].outcome.is_ok());
    assert!(results[1].outcome.is_err());

    let err = program.compile().unwrap_err();
    assert!(matches!(err, ProgramError::Check { ref file, .. } if file == "dup.ts"));
    assert_eq!(
        err.to_string(),
        "dup.ts: malformed declaration at 1,12: duplicate property 'a'"
    );
}

#[test]
fn test_options_reach_every_file() {
    let make = |name: &str| {
        SourceFile::new(
            name,
            vec![
                function(
                    "make",
                    vec![type_parameter("T")],
                    vec![optional_parameter("x", Some(type_ref("T", vec![])))],
                    Some(type_ref("T", vec![])),
                    vec![return_statement(Some(identifier("x")))],
                ),
                expression_statement(call(identifier("make"), vec![])),
            ],
        )
    };
    let options = CheckerOptions {
        unresolved_type_parameters: DiagnosticLevel::Warning,
        ..CheckerOptions::default()
    };
    let program = program_with(vec![make("a.ts"), make("b.ts")], options);

    let diagnostics = program.compile().unwrap();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics.warning_count(), 2);
    assert!(!diagnostics.has_errors());
    assert!(diagnostics
        .diagnostics()
        .iter()
        .all(|d| d.code == 7062 && d.category == DiagnosticCategory::Warning));
}
