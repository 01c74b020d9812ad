use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub url: String,
}

/// Heading texts keyed `h1`..`h6`. All six keys are always present.
pub type Headings = BTreeMap<String, Vec<String>>;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FetchResponse {
    pub url: String,
    pub title: Option<String>,
    pub headings: Headings,
    pub author: Option<String>,
    pub images: Vec<String>,
    pub content: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}
