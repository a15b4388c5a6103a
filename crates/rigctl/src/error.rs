//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No miners configured")]
    #[diagnostic(
        code(rigctl::no_inventory),
        help("Provide --miners, --miners-file, or a `miners` list in the config file.")
    )]
    NoInventory,

    #[error("No control API endpoint configured")]
    #[diagnostic(
        code(rigctl::no_base_url),
        help("Provide --base-url, RIGCTL_BASE_URL, or `base_url` in the config file.")
    )]
    NoBaseUrl,

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rigctl::validation))]
    Validation { field: String, reason: String },

    #[error("Could not read config: {message}")]
    #[diagnostic(code(rigctl::config))]
    Config { message: String },

    #[error("Could not read miners file {path}")]
    #[diagnostic(code(rigctl::miners_file))]
    MinersFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(rigctl::core))]
    Core(#[from] rigctl_core::CoreError),
}

impl CliError {
    /// Map errors to process exit codes: configuration/usage problems
    /// exit 2, everything else 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoInventory
            | Self::NoBaseUrl
            | Self::Validation { .. }
            | Self::Config { .. }
            | Self::MinersFile { .. } => exit_code::USAGE,
            Self::Core(_) => exit_code::GENERAL,
        }
    }
}
