use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Requested output type for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Text,
    Pdf,
}

impl OutputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Pdf => "pdf",
        }
    }
}

impl Default for OutputType {
    fn default() -> Self {
        Self::Text
    }
}

impl FromStr for OutputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which rule produced the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Filename,
    Entity,
    None,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Entity => "entity",
            Self::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub filename: String,
    pub label: Option<String>,
    pub entity_key: Option<String>,
    pub matched_by: MatchSource,
    pub output: OutputType,
    pub extension: String,
}

impl ClassificationResponse {
    pub fn unmatched(filename: impl Into<String>, output: OutputType) -> Self {
        Self {
            filename: filename.into(),
            label: None,
            entity_key: None,
            matched_by: MatchSource::None,
            output,
            extension: output.extension().to_string(),
        }
    }
}
