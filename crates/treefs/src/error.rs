// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::kind::NodeKind;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of [`Error`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidArgument,
    TypeMismatch,
    Config,
}

/// Represents errors that can occur in storage operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Conflict at {path}: {reason}")]
    Conflict { path: String, reason: String },

    #[error("Invalid argument '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },

    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("Invalid settings: {0}")]
    Config(String),
}

impl Error {
    pub fn not_found<S: AsRef<str>>(path: S) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn conflict<S: AsRef<str>, R: Into<String>>(path: S, reason: R) -> Self {
        Error::Conflict {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn already_exists<S: AsRef<str>>(path: S) -> Self {
        Self::conflict(path, "entry already exists")
    }

    pub fn invalid_argument<S: AsRef<str>, R: Into<String>>(value: S, reason: R) -> Self {
        Error::InvalidArgument {
            value: value.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch<S, E, F>(path: S, expected: E, found: F) -> Self
    where
        S: AsRef<str>,
        E: std::fmt::Display,
        F: std::fmt::Display,
    {
        Error::TypeMismatch {
            path: path.as_ref().to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    /// A walk tried to descend through something that is not a directory.
    pub fn not_a_directory<S: AsRef<str>>(path: S, found: NodeKind) -> Self {
        Self::type_mismatch(path, NodeKind::Directory, found)
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Conflict { .. } => ErrorKind::Conflict,
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<serde_yaml_ng::Error> for Error {
    fn from(err: serde_yaml_ng::Error) -> Error {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::not_found("/a").kind(), ErrorKind::NotFound);
        assert_eq!(Error::already_exists("/a").kind(), ErrorKind::Conflict);
        assert_eq!(
            Error::not_a_directory("/a/b", NodeKind::Item).kind(),
            ErrorKind::TypeMismatch
        );
        assert_eq!(
            Error::invalid_argument("", "empty").kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(Error::not_found("/x").to_string(), "Path not found: /x");
        assert_eq!(
            Error::not_a_directory("/f", NodeKind::Item).to_string(),
            "Type mismatch at /f: expected directory, found item"
        );
    }
}
