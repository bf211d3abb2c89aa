//! Errors raised by argument handling rather than by a repository operation.

/// Usage errors that clap cannot express on its own.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Operands that match no form of the command.
    #[error("Incorrect operands.")]
    IncorrectOperands,

    /// A subcommand that does not exist.
    #[error("No command with that name exists.")]
    UnknownCommand(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(CliError::IncorrectOperands.to_string(), "Incorrect operands.");
        assert_eq!(
            CliError::UnknownCommand("glorp".into()).to_string(),
            "No command with that name exists."
        );
    }
}
