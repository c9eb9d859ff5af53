use thiserror::Error;

/// Errors raised by path evaluation, construction and serialization.
///
/// All of them are raised at the point of detection; absence of data is never an error.
#[derive(Debug, Error)]
pub enum JmlError {
    #[error("{path:?} is not a valid path: {reason}")]
    InvalidPathSyntax { path: String, reason: String },
    #[error("no prefix declared for namespace URI '{uri}' while matching '{name}'")]
    UnresolvedNamespacePrefix { uri: String, name: String },
    #[error("options not valid: {0}")]
    InvalidNamespaceDeclaration(String),
    #[error("invalid element name {0:?}: the name must not be empty")]
    InvalidElementName(String),
    #[error("malformed JML document: {0}")]
    Json(#[from] serde_json::Error),
}

impl JmlError {
    pub(crate) fn syntax(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPathSyntax { path: path.to_string(), reason: reason.into() }
    }
}

pub type Result<T, E = JmlError> = std::result::Result<T, E>;
