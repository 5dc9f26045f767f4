use std::fmt;
use thiserror::Error;

/// What the container does with a failure is decided by its kind alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NoSuchCommand,
    IllegalSyntax,
    CommandRuntime,
    FatalModus,
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoSuchCommand => "no such command",
            Self::IllegalSyntax => "illegal syntax",
            Self::CommandRuntime => "command runtime failure",
            Self::FatalModus => "fatal modus failure",
            Self::Configuration => "configuration failure",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("no such command: {0}")]
    NoSuchCommand(String),
    #[error("{0}")]
    IllegalSyntax(String),
    #[error("{0}")]
    Runtime(String),
    #[error("fatal: {0}")]
    Fatal(String),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoSuchCommand(_) => ErrorKind::NoSuchCommand,
            Self::IllegalSyntax(_) => ErrorKind::IllegalSyntax,
            Self::Runtime(_) => ErrorKind::CommandRuntime,
            Self::Fatal(_) => ErrorKind::FatalModus,
        }
    }

    pub fn arg_count(count: usize) -> Self {
        Self::IllegalSyntax(format!("{count} is an invalid number of arguments"))
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal(message.into())
    }
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("command `{new}` collides with existing command `{existing}`")]
    DuplicateCommand { existing: String, new: String },
    #[error("unknown modus: {0}")]
    UnknownModus(String),
    #[error("modus {0} is not flagged runnable")]
    NotRunnable(String),
    #[error("modus {0} is already registered")]
    DuplicateModus(String),
    #[error("descriptor name `{declared}` does not match type `{actual}`")]
    NameMismatch { declared: String, actual: String },
    #[error("modus {0} has an invalid command map")]
    InvalidCommandMap(String),
    #[error("failed to construct modus {name}: {reason}")]
    Construction { name: String, reason: String },
    #[error("no runnable modi were discovered")]
    NoRunnableModi,
    #[error("namespace error: {0}")]
    Namespace(String),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Configuration
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    #[error("No modus selected")]
    NoModusSelected,
}

impl From<RequestError> for CommandError {
    fn from(err: RequestError) -> Self {
        CommandError::Runtime(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! kind_case {
        ($name:ident, $err:expr, $kind:expr) => {
            #[test]
            fn $name() {
                assert_eq!($err.kind(), $kind);
            }
        };
    }

    kind_case!(kind_no_such, CommandError::NoSuchCommand("x".into()), ErrorKind::NoSuchCommand);
    kind_case!(kind_syntax, CommandError::arg_count(3), ErrorKind::IllegalSyntax);
    kind_case!(kind_runtime, CommandError::runtime("boom"), ErrorKind::CommandRuntime);
    kind_case!(kind_fatal, CommandError::fatal("broken"), ErrorKind::FatalModus);
    kind_case!(kind_config, ConfigError::NoRunnableModi, ErrorKind::Configuration);

    #[test]
    fn arg_count_message_names_the_count() {
        assert_eq!(
            CommandError::arg_count(0).to_string(),
            "0 is an invalid number of arguments"
        );
    }
}
