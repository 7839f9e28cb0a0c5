//! Failures raised while importing a workbook

use crate::api::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum ImportError {
    /// The sheet's A1 cell holds no subject name
    MissingSubject { sheet: String },
    /// The sheet has no populated range at all
    EmptySheet { sheet: String },
    /// A header-keyed sheet has no header labels in its second row
    MissingHeader { sheet: String },
    /// A record failed a precondition before reaching the store
    Validation { subject: String, message: String },
    /// The store call itself failed
    Persistence { context: String, source: StoreError },
    /// The bytes could not be opened as a workbook
    Workbook(String),
}

impl ImportError {
    pub fn validation(subject: impl Into<String>, message: impl Into<String>) -> Self {
        ImportError::Validation {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn persistence(context: impl Into<String>, source: StoreError) -> Self {
        ImportError::Persistence {
            context: context.into(),
            source,
        }
    }
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::MissingSubject { sheet } => {
                write!(f, "Sheet '{}' has no employee name in A1", sheet)
            }
            ImportError::EmptySheet { sheet } => write!(f, "Sheet '{}' is empty", sheet),
            ImportError::MissingHeader { sheet } => {
                write!(f, "Sheet '{}' has no header labels in row 2", sheet)
            }
            ImportError::Validation { subject, message } => {
                write!(f, "Invalid record for '{}': {}", subject, message)
            }
            ImportError::Persistence { context, source } => {
                write!(f, "Failed to {}: {}", context, source)
            }
            ImportError::Workbook(msg) => write!(f, "Failed to read workbook: {}", msg),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}
