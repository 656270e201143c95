use std::fmt;

use crate::model::ParseTaskIdError;
use crate::storage::StorageError;

/// Machine-readable error codes for scripts and the JSON output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    EmptyName,
    DuplicateProject,
    NoProjectSelected,
    InvalidTaskId,
    SequenceExhausted,
    ProjectNotFound,
    TaskNotFound,
    StoreReadFailed,
    StoreWriteFailed,
    MalformedStore,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::EmptyName => "E2001",
            Self::DuplicateProject => "E2002",
            Self::NoProjectSelected => "E2003",
            Self::InvalidTaskId => "E2004",
            Self::SequenceExhausted => "E2005",
            Self::ProjectNotFound => "E3001",
            Self::TaskNotFound => "E3002",
            Self::StoreReadFailed => "E5001",
            Self::StoreWriteFailed => "E5002",
            Self::MalformedStore => "E5003",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::EmptyName => "Name must not be empty",
            Self::DuplicateProject => "Project name already exists",
            Self::NoProjectSelected => "No project selected",
            Self::InvalidTaskId => "Malformed task ID",
            Self::SequenceExhausted => "No task IDs left at this level",
            Self::ProjectNotFound => "Project not found",
            Self::TaskNotFound => "Task not found",
            Self::StoreReadFailed => "Store file read failed",
            Self::StoreWriteFailed => "Store file write failed",
            Self::MalformedStore => "Store file is not valid JSON",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to users and scripts.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .twig/config.toml and retry."),
            Self::EmptyName => Some("Provide a non-blank name."),
            Self::DuplicateProject => Some("Choose a different project name."),
            Self::NoProjectSelected => Some("Create or select a project first."),
            Self::InvalidTaskId => Some("Task IDs look like root.1 or root.1.2."),
            Self::SequenceExhausted => {
                Some("Renumber the sibling keys in the store file, then run `tw check`.")
            }
            Self::ProjectNotFound => Some("Run `tw project list` to see existing projects."),
            Self::TaskNotFound => Some("Run `tw tree <PROJECT>` to see task IDs."),
            Self::StoreReadFailed => Some("Check that the store path is readable."),
            Self::StoreWriteFailed => Some("Check disk space and write permissions."),
            Self::MalformedStore => {
                Some("Repair the JSON by hand or point --store at another file.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Rejected input. The store is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{what} name must not be empty")]
    EmptyName { what: &'static str },

    #[error("project '{name}' already exists")]
    DuplicateProject { name: String },

    #[error("no project selected")]
    NoProjectSelected,

    #[error(transparent)]
    InvalidTaskId(#[from] ParseTaskIdError),

    #[error("no task ids left under '{parent}'")]
    SequenceExhausted { parent: String },
}

/// A referenced project or task does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFoundError {
    #[error("project not found: '{name}'")]
    Project { name: String },

    #[error("task not found: '{id}' in project '{project}'")]
    Task { project: String, id: String },
}

/// Every failure a store operation can report.
#[derive(Debug, thiserror::Error)]
pub enum TwigError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ParseTaskIdError> for TwigError {
    fn from(err: ParseTaskIdError) -> Self {
        Self::Validation(ValidationError::InvalidTaskId(err))
    }
}

impl TwigError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(ValidationError::EmptyName { .. }) => ErrorCode::EmptyName,
            Self::Validation(ValidationError::DuplicateProject { .. }) => {
                ErrorCode::DuplicateProject
            }
            Self::Validation(ValidationError::NoProjectSelected) => ErrorCode::NoProjectSelected,
            Self::Validation(ValidationError::InvalidTaskId(_)) => ErrorCode::InvalidTaskId,
            Self::Validation(ValidationError::SequenceExhausted { .. }) => {
                ErrorCode::SequenceExhausted
            }
            Self::NotFound(NotFoundError::Project { .. }) => ErrorCode::ProjectNotFound,
            Self::NotFound(NotFoundError::Task { .. }) => ErrorCode::TaskNotFound,
            Self::Storage(StorageError::Read { .. }) => ErrorCode::StoreReadFailed,
            Self::Storage(StorageError::Write { .. }) => ErrorCode::StoreWriteFailed,
            Self::Storage(StorageError::Malformed { .. }) => ErrorCode::MalformedStore,
            Self::Storage(StorageError::Encode(_)) => ErrorCode::InternalUnexpected,
        }
    }

    /// Remediation text, falling back to the code's summary.
    #[must_use]
    pub fn suggestion(&self) -> String {
        let code = self.error_code();
        code.hint().unwrap_or_else(|| code.message()).to_string()
    }

    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
