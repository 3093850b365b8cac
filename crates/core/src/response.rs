use serde::{Deserialize, Serialize};

/// Per-file metadata returned alongside the extracted context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub name: String,
    /// The file's lowercased extension.
    #[serde(rename = "type")]
    pub file_type: String,
    /// Size in bytes.
    pub size: usize,
    /// Characters extracted before any context truncation.
    pub text_length: usize,
    pub error: Option<String>,
}

/// Body of a successful ask-with-files call.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AskResponse {
    /// Context blob assembled from every file that yielded text.
    pub extracted: String,
    /// Generated answer, or a diagnostic when nothing could be extracted.
    /// `None` when no text-generation backend is configured.
    pub answer: Option<String>,
    pub files: Vec<FileSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
