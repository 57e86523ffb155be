//! tyshape_compiler: Program orchestration.
//!
//! Loads AST files written by the front-end, checks every file with its own
//! checker and gathers the diagnostics in input order.

use rayon::prelude::*;
use thiserror::Error;
use tyshape_ast::SourceFile;
use tyshape_checker::CheckError;
use tyshape_diagnostics::{Diagnostic, DiagnosticCollection};
use tyshape_options::CheckerOptions;

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is not a valid AST file: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{file}: {source}")]
    Check {
        file: String,
        #[source]
        source: CheckError,
    },
}

/// The outcome of checking one file.
#[derive(Debug)]
pub struct FileResult {
    pub file_name: String,
    pub outcome: Result<Vec<Diagnostic>, CheckError>,
}

/// The program represents the entire set of files to check.
pub struct Program {
    /// Checker options shared by every file.
    pub options: CheckerOptions,
    /// The root file paths.
    pub root_files: Vec<String>,
    source_files: Vec<SourceFile>,
}

impl Program {
    pub fn new(root_files: Vec<String>, options: CheckerOptions) -> Self {
        Self {
            options,
            root_files,
            source_files: Vec::new(),
        }
    }

    /// Add an already built source file to the program.
    pub fn add_source(&mut self, source_file: SourceFile) {
        self.source_files.push(source_file);
    }

    /// Add a source file from its JSON text. A file without a `fileName`
    /// takes the name it was loaded under.
    pub fn add_source_text(&mut self, file_name: &str, json: &str) -> Result<(), ProgramError> {
        let mut source_file: SourceFile =
            serde_json::from_str(json).map_err(|source| ProgramError::Json {
                path: file_name.to_string(),
                source,
            })?;
        if source_file.file_name.is_empty() {
            source_file.file_name = file_name.to_string();
        }
        self.add_source(source_file);
        Ok(())
    }

    /// Load all root files from disk.
    pub fn load_root_files(&mut self) -> Result<(), ProgramError> {
        for path in &self.root_files.clone() {
            let content = std::fs::read_to_string(path).map_err(|source| ProgramError::Io {
                path: path.clone(),
                source,
            })?;
            self.add_source_text(path, &content)?;
            tracing::debug!(file = %path, "loaded source file");
        }
        Ok(())
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    /// Check every source file. Files are independent, so they are checked
    /// in parallel; results keep the order the files were added in.
    pub fn check(&self) -> Vec<FileResult> {
        self.source_files
            .par_iter()
            .map(|file| {
                let outcome = tyshape_checker::check(file, &self.options);
                match &outcome {
                    Ok(diagnostics) => tracing::debug!(
                        file = %file.file_name,
                        diagnostics = diagnostics.len(),
                        "checked file"
                    ),
                    Err(error) => tracing::debug!(file = %file.file_name, %error, "check aborted"),
                }
                FileResult {
                    file_name: file.file_name.clone(),
                    outcome,
                }
            })
            .collect()
    }

    /// Check every file and merge the diagnostics. The first file that
    /// failed with a fatal error fails the whole run.
    pub fn compile(&self) -> Result<DiagnosticCollection, ProgramError> {
        let mut all_diagnostics = DiagnosticCollection::new();
        for result in self.check() {
            let diagnostics = result.outcome.map_err(|source| ProgramError::Check {
                file: result.file_name,
                source,
            })?;
            all_diagnostics.extend(diagnostics);
        }
        Ok(all_diagnostics)
    }
}
