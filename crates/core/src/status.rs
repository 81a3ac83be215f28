use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadType {
    BankStatement,
    Receipt,
    Other,
}

impl fmt::Display for UploadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadType::BankStatement => write!(f, "bank_statement"),
            UploadType::Receipt => write!(f, "receipt"),
            UploadType::Other => write!(f, "other"),
        }
    }
}

impl FromStr for UploadType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_statement" => Ok(UploadType::BankStatement),
            "receipt" => Ok(UploadType::Receipt),
            "other" => Ok(UploadType::Other),
            other => Err(format!("Unknown upload type: '{other}'")),
        }
    }
}

/// Upload lifecycle: `uploaded → processing → processed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    Processing,
    Processed,
    Failed,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadStatus::Uploaded => write!(f, "uploaded"),
            UploadStatus::Processing => write!(f, "processing"),
            UploadStatus::Processed => write!(f, "processed"),
            UploadStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for UploadStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(UploadStatus::Uploaded),
            "processing" => Ok(UploadStatus::Processing),
            "processed" => Ok(UploadStatus::Processed),
            "failed" => Ok(UploadStatus::Failed),
            other => Err(format!("Unknown upload status: '{other}'")),
        }
    }
}

/// A reconciliation run is created `running` and always transitions to
/// exactly one terminal state before the pipeline call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for RunStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(format!("Unknown run status: '{other}'")),
        }
    }
}

/// `Matched` is reserved; the current heuristic only produces `Unmatched`
/// and `Partial`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Unmatched,
    Partial,
    Matched,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStatus::Unmatched => write!(f, "unmatched"),
            MatchStatus::Partial => write!(f, "partial"),
            MatchStatus::Matched => write!(f, "matched"),
        }
    }
}

impl FromStr for MatchStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unmatched" => Ok(MatchStatus::Unmatched),
            "partial" => Ok(MatchStatus::Partial),
            "matched" => Ok(MatchStatus::Matched),
            other => Err(format!("Unknown match status: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Rule,
    Ai,
}

impl fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationSource::Rule => write!(f, "rule"),
            ClassificationSource::Ai => write!(f, "ai"),
        }
    }
}

impl FromStr for ClassificationSource {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rule" => Ok(ClassificationSource::Rule),
            "ai" => Ok(ClassificationSource::Ai),
            other => Err(format!("Unknown classification source: '{other}'")),
        }
    }
}
