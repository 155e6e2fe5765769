use std::path::PathBuf;

use base64::prelude::*;
use bytes::Bytes;
use serde_json::json;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::inputs::Inputs;
use crate::task::TaskKind;

const APPLICATION_JSON: &str = "application/json";

/// A fully-built request for the inference boundary.
///
/// Created by [`RequestBuilder`], consumed once by an
/// [`InferenceInvoker`](crate::invoker::InferenceInvoker); never mutated.
/// Payloads are deterministic: building twice from the same inputs yields
/// byte-identical bytes.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    pub model_id: String,
    pub content_type: String,
    pub accept_type: String,
    pub payload: Bytes,
}

/// Parameters for one task invocation.
///
/// ```ignore
/// let params = TaskParams::builder()
///     .task(TaskKind::Translation)
///     .inputs(Inputs::new().text("text", "Good morning").text("target_language", "French"))
///     .build();
/// ```
#[derive(Debug, Clone, bon::Builder)]
pub struct TaskParams {
    pub task: TaskKind,
    #[builder(default)]
    pub inputs: Inputs,
    /// Per-call override of the configured model identifier.
    pub model_id: Option<String>,
    /// Per-call override of the task's generation-length hint.
    pub max_tokens: Option<u32>,
}

impl TaskParams {
    pub fn new(task: TaskKind, inputs: Inputs) -> Self {
        TaskParams::builder().task(task).inputs(inputs).build()
    }
}

/// Builds model-specific request payloads from a task kind and named inputs.
///
/// One JSON object per task family: the Claude text-completions shape for
/// the nine text tasks, the Stability `text_prompts` shape for image
/// generation, and a base64 `image` object for the vision tasks. No network
/// access happens here; the only side effect is reading image bytes from a
/// caller-supplied path.
pub struct RequestBuilder<'a> {
    config: &'a ClientConfig,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(config: &'a ClientConfig) -> Self {
        Self { config }
    }

    /// Build the request for `params.task`.
    ///
    /// Fails with [`Error::MissingInput`] when a required input is absent
    /// and no documented default applies, and with
    /// [`Error::ResourceNotFound`] when an `image_path` input does not
    /// point at a readable file.
    pub fn build(&self, params: &TaskParams) -> Result<InvocationRequest, Error> {
        let task = params.task;
        let inputs = &params.inputs;
        let max_tokens = params.max_tokens.unwrap_or_else(|| task.max_tokens());

        let body = match task {
            TaskKind::ImageGeneration => {
                let prompt = resolve_text(task, inputs, "prompt")?;
                json!({
                    "text_prompts": [{ "text": prompt }],
                    "cfg_scale": 10,
                    "steps": 30,
                    "seed": 0,
                })
            }
            TaskKind::ImageCaptioning => {
                let image = resolve_image(task, inputs)?;
                json!({
                    "image": BASE64_STANDARD.encode(&image),
                    "prompt": "Provide a short caption for this image.",
                    "max_tokens": max_tokens,
                })
            }
            TaskKind::VisualQuestionAnswering => {
                let image = resolve_image(task, inputs)?;
                let question = resolve_text(task, inputs, "question")?;
                json!({
                    "image": BASE64_STANDARD.encode(&image),
                    "question": question,
                    "max_tokens": max_tokens,
                })
            }
            _ => {
                let instruction = shape_prompt(task, inputs)?;
                json!({
                    "prompt": format!("\n\nHuman: {instruction}\n\nAssistant:"),
                    "max_tokens_to_sample": max_tokens,
                    "temperature": 0.5,
                    "stop_sequences": ["\n\nHuman:"],
                })
            }
        };

        let model_id = params
            .model_id
            .clone()
            .unwrap_or_else(|| self.config.model_for(task).to_string());

        Ok(InvocationRequest {
            model_id,
            content_type: APPLICATION_JSON.to_string(),
            accept_type: APPLICATION_JSON.to_string(),
            payload: Bytes::from(serde_json::to_vec(&body)?),
        })
    }

    /// Build from a bare task kind and inputs, with no per-call overrides.
    pub fn build_task(&self, task: TaskKind, inputs: &Inputs) -> Result<InvocationRequest, Error> {
        self.build(&TaskParams::new(task, inputs.clone()))
    }
}

/// Resolve a text input, falling back to the task's documented default.
fn resolve_text<'i>(
    task: TaskKind,
    inputs: &'i Inputs,
    key: &'static str,
) -> Result<&'i str, Error> {
    inputs
        .get_text(key)
        .or_else(|| task.default_input(key))
        .ok_or(Error::MissingInput { task, key })
}

/// Resolve image bytes: inline `image` bytes first, then an `image_path`
/// input read from disk. The path must exist; there is no default.
fn resolve_image(task: TaskKind, inputs: &Inputs) -> Result<Vec<u8>, Error> {
    if let Some(bytes) = inputs.get_bytes("image") {
        return Ok(bytes.to_vec());
    }
    if let Some(path) = inputs.get_text("image_path") {
        let path = PathBuf::from(path);
        return std::fs::read(&path).map_err(|source| Error::ResourceNotFound { path, source });
    }
    Err(Error::MissingInput { task, key: "image" })
}

/// Per-task prompt shaping for the nine text tasks.
///
/// QuestionAnswering concatenates context and question with a trailing
/// `Answer:` marker; Translation embeds the target language; the analysis
/// tasks wrap their input text in a short fixed instruction.
fn shape_prompt(task: TaskKind, inputs: &Inputs) -> Result<String, Error> {
    let prompt = match task {
        TaskKind::TextGeneration | TaskKind::CodeGeneration => {
            resolve_text(task, inputs, "prompt")?.to_string()
        }
        TaskKind::Chatbot => resolve_text(task, inputs, "message")?.to_string(),
        TaskKind::Sentiment => format!(
            "Analyze the sentiment of the following text as positive, negative, or \
             neutral.\n\nText: {}\n\nSentiment:",
            resolve_text(task, inputs, "text")?
        ),
        TaskKind::Translation => format!(
            "Translate the following text to {}.\n\nText: {}\n\nTranslation:",
            resolve_text(task, inputs, "target_language")?,
            resolve_text(task, inputs, "text")?
        ),
        TaskKind::Classification => format!(
            "Classify the following text into one of these categories: {}.\n\nText: \
             {}\n\nCategory:",
            resolve_text(task, inputs, "categories")?,
            resolve_text(task, inputs, "text")?
        ),
        TaskKind::QuestionAnswering => format!(
            "{}\n\nQuestion: {}\nAnswer:",
            resolve_text(task, inputs, "context")?,
            resolve_text(task, inputs, "question")?
        ),
        TaskKind::NamedEntityRecognition => format!(
            "List the named entities (people, organizations, locations, dates) in the \
             following text.\n\nText: {}\n\nEntities:",
            resolve_text(task, inputs, "text")?
        ),
        TaskKind::DocumentUnderstanding => format!(
            "Answer the question using only the document below.\n\nDocument:\n{}\n\n\
             Question: {}\nAnswer:",
            resolve_text(task, inputs, "document_text")?,
            resolve_text(task, inputs, "question")?
        ),
        TaskKind::Summarization => format!(
            "Summarize the following text in a few sentences.\n\nText: {}\n\nSummary:",
            resolve_text(task, inputs, "text")?
        ),
        TaskKind::ImageGeneration
        | TaskKind::ImageCaptioning
        | TaskKind::VisualQuestionAnswering => {
            unreachable!("image tasks are serialized separately")
        }
    };
    Ok(prompt)
}
