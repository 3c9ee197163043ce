use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use cmdtree_reader::Reader;

use crate::tree::NodeId;

/// Error type argument types may return; anything that is not a
/// [`CommandError`] is wrapped into an "incorrect argument" syntax error.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A shareable error cause.
pub type Cause = Arc<dyn Error + Send + Sync>;

/// Failure while parsing or executing a command.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    /// Malformed token, wrong literal or a value that failed to convert.
    /// Recoverable per branch during parsing.
    #[error("{message}")]
    Syntax {
        message: String,
        cursor: usize,
        input: String,
        #[source]
        cause: Option<Cause>,
    },

    /// The input parsed, but no handler was resolved or none ran.
    #[error("{message}")]
    NotFound { message: String, input: String },

    /// A handler or redirect modifier reported a failure while executing.
    #[error("{message}")]
    Failed {
        message: String,
        #[source]
        cause: Option<Cause>,
    },
}

impl CommandError {
    pub fn syntax(message: impl Into<String>, reader: &Reader) -> Self {
        CommandError::Syntax {
            message: message.into(),
            cursor: reader.cursor(),
            input: reader.input(),
            cause: None,
        }
    }

    pub fn syntax_with_cause(message: impl Into<String>, reader: &Reader, cause: BoxError) -> Self {
        CommandError::Syntax {
            message: message.into(),
            cursor: reader.cursor(),
            input: reader.input(),
            cause: Some(Arc::from(cause)),
        }
    }

    pub fn incorrect_argument(reader: &Reader, cause: Option<BoxError>) -> Self {
        let message = format!(
            "Incorrect argument at position {}: {}",
            reader.cursor(),
            reader.remaining()
        );
        match cause {
            Some(cause) => CommandError::syntax_with_cause(message, reader, cause),
            None => CommandError::syntax(message, reader),
        }
    }

    pub fn unknown_command(reader: &Reader) -> Self {
        CommandError::syntax(format!("Unknown command: {}", reader.input()), reader)
    }

    pub fn not_found(reader: &Reader) -> Self {
        let input = reader.input();
        CommandError::NotFound {
            message: format!("Unknown or incomplete command: {input}"),
            input,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        CommandError::Failed {
            message: message.into(),
            cause: None,
        }
    }

    pub fn failed_with(message: impl Into<String>, cause: BoxError) -> Self {
        CommandError::Failed {
            message: message.into(),
            cause: Some(Arc::from(cause)),
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, CommandError::Syntax { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::NotFound { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CommandError::Syntax { message, .. }
            | CommandError::NotFound { message, .. }
            | CommandError::Failed { message, .. } => message,
        }
    }

    /// Absolute failing cursor, for syntax errors.
    pub fn cursor(&self) -> Option<usize> {
        match self {
            CommandError::Syntax { cursor, .. } => Some(*cursor),
            _ => None,
        }
    }

    pub fn input(&self) -> Option<&str> {
        match self {
            CommandError::Syntax { input, .. } | CommandError::NotFound { input, .. } => Some(input),
            CommandError::Failed { .. } => None,
        }
    }

    /// The input with a `^` under the failing position.
    pub fn caret(&self) -> Option<String> {
        match self {
            CommandError::Syntax { cursor, input, .. } => {
                Some(format!("{input}\n{}^", " ".repeat(*cursor)))
            }
            _ => None,
        }
    }

    /// Wrap anything that is not already a syntax error into one at the
    /// reader's position.
    pub(crate) fn into_syntax(self, reader: &Reader) -> Self {
        if self.is_syntax() {
            return self;
        }
        let message = self.message().to_owned();
        CommandError::syntax_with_cause(message, reader, Box::new(self))
    }

    /// Serialize for machine-readable output. Absent fields are null.
    pub fn to_json_value(&self) -> serde_json::Value {
        let kind = match self {
            CommandError::Syntax { .. } => "syntax",
            CommandError::NotFound { .. } => "not_found",
            CommandError::Failed { .. } => "failed",
        };
        serde_json::json!({
            "kind":    kind,
            "message": self.message(),
            "cursor":  self.cursor(),
            "input":   self.input(),
        })
    }
}

/// The tree rejected a registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Composed arguments hold only argument members.
    #[error("composed argument member '{0}' is not an argument node")]
    ComposedMember(String),

    /// Composed arguments end their branch and take no children.
    #[error("node {0} is a composed argument and cannot take children")]
    ComposedParent(NodeId),
}

/// A dispatcher config file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_cursor() {
        let mut reader = Reader::new("say hi");
        reader.set_cursor(4);
        let err = CommandError::syntax("bad", &reader);
        assert_eq!(err.caret().as_deref(), Some("say hi\n    ^"));
        assert_eq!(err.cursor(), Some(4));
    }

    #[test]
    fn into_syntax_wraps_other_kinds() {
        let reader = Reader::new("x");
        let wrapped = CommandError::failed("boom").into_syntax(&reader);
        assert!(wrapped.is_syntax());
        assert_eq!(wrapped.message(), "boom");
        assert!(std::error::Error::source(&wrapped).is_some());
    }

    #[test]
    fn json_shape() {
        let reader = Reader::new("nope");
        let value = CommandError::not_found(&reader).to_json_value();
        assert_eq!(value["kind"], "not_found");
        assert_eq!(value["input"], "nope");
        assert!(value["cursor"].is_null());
    }
}
