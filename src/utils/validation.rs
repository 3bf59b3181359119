use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// How a declared file name is accepted into a storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileNamePolicy {
    /// Interpolate the name as given. The object store is the only gate.
    #[default]
    Verbatim,
    /// Reject path separators, dot segments and control characters.
    Strict,
}

impl FromStr for FileNamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verbatim" => Ok(Self::Verbatim),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown file name policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileNameError {
    #[error("File name must not contain path separators")]
    PathSeparator,

    #[error("File name must not contain '.' or '..' segments")]
    DotSegment,

    #[error("File name must not contain control characters")]
    ControlCharacter,
}

impl FileNamePolicy {
    /// Checks a declared file name against the policy.
    pub fn check(&self, file_name: &str) -> Result<(), FileNameError> {
        match self {
            FileNamePolicy::Verbatim => Ok(()),
            FileNamePolicy::Strict => {
                if file_name.contains('/') || file_name.contains('\\') {
                    return Err(FileNameError::PathSeparator);
                }
                if file_name == "." || file_name == ".." {
                    return Err(FileNameError::DotSegment);
                }
                if file_name.chars().any(char::is_control) {
                    return Err(FileNameError::ControlCharacter);
                }
                Ok(())
            }
        }
    }
}
