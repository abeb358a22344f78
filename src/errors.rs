/*!
 * Error types for the scriptcut application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while acquiring screenplay text from a document
#[derive(Error, Debug)]
pub enum ImportError {
    /// The source file could not be read
    #[error("Failed to read {path}: {message}")]
    Unreadable {
        /// Path of the file
        path: String,
        /// Underlying I/O error message
        message: String,
    },

    /// The PDF could not be parsed or its text could not be extracted
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    /// Extraction succeeded but produced no text (scanned images, empty file)
    #[error("Document contains no extractable text: {0}")]
    EmptyDocument(String),
}

/// Errors raised by scene editing operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditError {
    /// No scene matches the given key
    #[error("Scene not found: {0}")]
    SceneNotFound(String),

    /// The scene has no earlier content to restore
    #[error("Nothing to undo for scene {0}")]
    NothingToUndo(String),

    /// The session has no action plan attached
    #[error("No action plan in the session")]
    NoActionPlan,

    /// The action plan lists no subtask for this scene
    #[error("No plan task for scene {0}")]
    TaskNotFound(String),
}

/// Errors from session and project storage
#[derive(Error, Debug)]
pub enum StorageError {
    /// Project id does not exist in the database
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// No saved editing session is available
    #[error("No active session at {0}; import a screenplay first")]
    NoSession(String),

    /// Session file exists but cannot be decoded
    #[error("Corrupt session file {path}: {message}")]
    CorruptSession {
        /// Path of the session file
        path: String,
        /// Decoder error message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error while importing a screenplay
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Error while editing scenes
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Error from session or project storage
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
