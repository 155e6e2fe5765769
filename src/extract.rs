use std::collections::BTreeMap;

use base64::prelude::*;
use tracing::warn;

use crate::error::Error;
use crate::invoker::InvocationResponse;
use crate::task::{ExtractionStrategy, TaskKind};

/// PNG is what the image models in scope emit.
const IMAGE_MIME_HINT: &str = "image/png";

/// The task-relevant result located in a response body.
///
/// Transient: constructed and consumed within a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedResult {
    /// The response body (or its meaningful part) as text.
    Text(String),
    /// Decoded binary output with a mime hint.
    Binary { data: Vec<u8>, mime_hint: String },
    /// Named result fields, for callers that post-process model output into
    /// structure. The built-in strategies never construct this variant.
    Structured(BTreeMap<String, String>),
    /// The response was well-formed but carried no recognizable result.
    /// A legitimate terminal outcome, not an error.
    NotFound,
}

impl ExtractedResult {
    pub fn into_text(self) -> Option<String> {
        match self {
            ExtractedResult::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_binary(self) -> Option<Vec<u8>> {
        match self {
            ExtractedResult::Binary { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ExtractedResult::NotFound)
    }
}

impl std::fmt::Display for ExtractedResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractedResult::Text(s) => f.write_str(s),
            ExtractedResult::Binary { data, mime_hint } => {
                write!(f, "<{} bytes, {}>", data.len(), mime_hint)
            }
            ExtractedResult::Structured(fields) => {
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                Ok(())
            }
            ExtractedResult::NotFound => f.write_str("<no result found>"),
        }
    }
}

/// Locates the task-relevant result inside a heterogeneous response body.
///
/// Response schemas are not uniform across model families, so the only
/// hard-guaranteed behavior is: never fail on an unexpected shape; degrade
/// to the raw text or [`ExtractedResult::NotFound`] instead. The single
/// structured path is image extraction, where malformed base64 is reported
/// as [`Error::Decode`].
pub struct ResponseExtractor;

impl ResponseExtractor {
    pub fn extract(
        task: TaskKind,
        response: &InvocationResponse,
    ) -> Result<ExtractedResult, Error> {
        match task.extraction_strategy() {
            ExtractionStrategy::Base64Image => extract_image(&response.body),
            ExtractionStrategy::RawText => Ok(ExtractedResult::Text(
                String::from_utf8_lossy(&response.body).into_owned(),
            )),
        }
    }
}

/// Image extraction: `artifacts[0].base64`, falling back to a top-level
/// `image` field. Malformed JSON degrades to `NotFound` with a warning.
fn extract_image(body: &[u8]) -> Result<ExtractedResult, Error> {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(err) => {
            warn!(%err, "image response body is not valid JSON");
            return Ok(ExtractedResult::NotFound);
        }
    };

    let encoded = value
        .get("artifacts")
        .and_then(|a| a.as_array())
        .and_then(|a| a.first())
        .and_then(|a| a.get("base64"))
        .and_then(|v| v.as_str())
        .or_else(|| value.get("image").and_then(|v| v.as_str()));

    match encoded {
        Some(encoded) => {
            let data = BASE64_STANDARD.decode(encoded)?;
            Ok(ExtractedResult::Binary {
                data,
                mime_hint: IMAGE_MIME_HINT.to_string(),
            })
        }
        None => Ok(ExtractedResult::NotFound),
    }
}
