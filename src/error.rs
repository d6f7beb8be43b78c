use colored::Colorize;
use thiserror::Error;

/// A raw string could not be converted to the requested type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {} to {target}: {reason}", format!("'{}'", .value).red())]
pub struct ConversionError {
    /// The raw string that failed to convert
    pub value: String,
    /// Name of the target type
    pub target: &'static str,
    pub reason: String,
}

impl ConversionError {
    pub fn new(value: impl Into<String>, target: &'static str, reason: impl ToString) -> Self {
        Self {
            value: value.into(),
            target,
            reason: reason.to_string(),
        }
    }
}

/// Why a single property could not be bound
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldFailure {
    #[error("key is missing")]
    Missing,
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Errors raised while binding values to or from a document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// A required property was missing or could not be converted
    #[error(
        "{}: required field could not be bound{}: {cause}",
        .key.magenta().bold(),
        in_section(.section)
    )]
    RequiredField {
        key: String,
        section: Option<String>,
        #[source]
        cause: FieldFailure,
    },

    /// Raised by the `get_value` lookup helpers only
    #[error("{} not found", key_path(.section, .key).magenta().bold())]
    KeyNotFound {
        section: Option<String>,
        key: String,
    },

    /// The section name could not be assigned to the key property
    #[error("section name {} does not fit the key property", format!("'{}'", .section).red())]
    SectionName {
        section: String,
        #[source]
        source: ConversionError,
    },

    /// A section was requested for a type bound to the global collection
    #[error("{} binds to the global section and has no section name", .type_name.bold())]
    GlobalSection { type_name: &'static str },
}

/// Invalid binding declarations, reported when a type binding is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("{second}: a key property is already declared by {first}")]
    DuplicateKeyProperty {
        first: &'static str,
        second: &'static str,
    },

    #[error("{property}: a required property cannot declare a default value")]
    RequiredWithDefault { property: &'static str },

    #[error("{property}: key name must not be empty")]
    EmptyKeyName { property: &'static str },

    #[error("section name must not be empty")]
    EmptySectionName,
}

fn in_section(section: &Option<String>) -> String {
    match section {
        Some(name) => format!(" in section [{name}]"),
        None => String::new(),
    }
}

fn key_path(section: &Option<String>, key: &str) -> String {
    match section {
        Some(name) => format!("Section/Key {name}/{key}"),
        None => format!("Key {key}"),
    }
}

/// Helper to format several binding errors into one report
pub fn format_bind_errors(errors: &[BindError]) -> String {
    let error_summary = errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Binding failed with {} error(s):\n{}",
        errors.len().to_string().yellow().bold(),
        error_summary
    )
}
