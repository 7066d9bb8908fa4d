//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The punch action text matched neither clock action.
    #[error("unknown punch action: {value}")]
    UnknownAction { value: String },
}

/// Label used in the source tables for an entry punch.
pub const ENTRY_LABEL: &str = "Pointer entrée";

/// Label used in the source tables for an exit punch.
pub const EXIT_LABEL: &str = "Pointer sortie";

/// Label used in the source tables for a successful punch.
pub const SUCCESS_LABEL: &str = "Succès";

/// The clock action recorded by a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchAction {
    /// Clocking in.
    EntryPunch,
    /// Clocking out.
    ExitPunch,
}

impl PunchAction {
    /// The label used in source tables.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EntryPunch => ENTRY_LABEL,
            Self::ExitPunch => EXIT_LABEL,
        }
    }
}

impl fmt::Display for PunchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PunchAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ENTRY_LABEL => Ok(Self::EntryPunch),
            EXIT_LABEL => Ok(Self::ExitPunch),
            other => Err(ValidationError::UnknownAction {
                value: other.to_string(),
            }),
        }
    }
}

/// Whether the terminal accepted the punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunchStatus {
    Success,
    Failure,
}

impl PunchStatus {
    /// Maps a status label to a status. Anything other than the success label is a failure.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        if label.trim() == SUCCESS_LABEL {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

/// Generates a validated string newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new value after trimming and validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                let trimmed = id.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated person name ("Prénom et nom").
    ///
    /// Names are trimmed and must be non-empty. They are the grouping key for
    /// both leave records and punch streams.
    PersonName, "person name"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn person_name_rejects_empty() {
        assert!(PersonName::new("").is_err());
        assert!(PersonName::new("   ").is_err());
        assert!(PersonName::new("Alice Martin").is_ok());
    }

    #[test]
    fn person_name_is_trimmed() {
        let name = PersonName::new("  Alice Martin ").unwrap();
        assert_eq!(name.as_str(), "Alice Martin");
    }

    #[test]
    fn person_name_serde_rejects_empty() {
        let result: Result<PersonName, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn punch_action_from_label() {
        assert_eq!(
            "Pointer entrée".parse::<PunchAction>().unwrap(),
            PunchAction::EntryPunch
        );
        assert_eq!(
            " Pointer sortie ".parse::<PunchAction>().unwrap(),
            PunchAction::ExitPunch
        );
        let err = "Pause".parse::<PunchAction>().unwrap_err();
        assert_eq!(err.to_string(), "unknown punch action: Pause");
    }

    #[test]
    fn punch_action_label_roundtrip() {
        for action in [PunchAction::EntryPunch, PunchAction::ExitPunch] {
            assert_eq!(action.as_str().parse::<PunchAction>().unwrap(), action);
        }
    }

    #[test]
    fn punch_status_any_other_label_is_failure() {
        assert_eq!(PunchStatus::from_label("Succès"), PunchStatus::Success);
        assert_eq!(PunchStatus::from_label("Échec"), PunchStatus::Failure);
        assert_eq!(PunchStatus::from_label(""), PunchStatus::Failure);
    }
}
