use std::path::Path;

use crate::client::Client;
use crate::config::ClientConfig;
use crate::error::Error;
use crate::extract::{ExtractedResult, ResponseExtractor};
use crate::inputs::Inputs;
use crate::invoker::InferenceInvoker;
use crate::request::{RequestBuilder, TaskParams};
use crate::task::TaskKind;

/// Run one task end to end: build the request, invoke the boundary,
/// extract the result.
///
/// Build failures (missing input, unreadable image path) short-circuit
/// before the invoker is called.
pub async fn run_task(
    invoker: &dyn InferenceInvoker,
    config: &ClientConfig,
    params: &TaskParams,
) -> Result<ExtractedResult, Error> {
    let request = RequestBuilder::new(config).build(params)?;
    let response = invoker.invoke(&request).await?;
    ResponseExtractor::extract(params.task, &response)
}

/// Service for running tasks against a [`Client`].
///
/// The per-task methods mirror the thirteen original demo programs; `run`
/// is the generic entry point behind all of them.
pub struct TaskService<'a> {
    client: &'a Client,
}

impl<'a> TaskService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Run a task with explicit inputs.
    pub async fn run(&self, task: TaskKind, inputs: Inputs) -> Result<ExtractedResult, Error> {
        self.run_params(&TaskParams::new(task, inputs)).await
    }

    /// Run a task with full per-call parameters.
    pub async fn run_params(&self, params: &TaskParams) -> Result<ExtractedResult, Error> {
        run_task(self.client, self.client.config(), params).await
    }

    async fn run_text(&self, task: TaskKind, inputs: Inputs) -> Result<String, Error> {
        let result = self.run(task, inputs).await?;
        Ok(result.into_text().unwrap_or_default())
    }

    pub async fn generate_text(&self, prompt: impl Into<String>) -> Result<String, Error> {
        self.run_text(
            TaskKind::TextGeneration,
            Inputs::new().text("prompt", prompt),
        )
        .await
    }

    pub async fn generate_code(&self, prompt: impl Into<String>) -> Result<String, Error> {
        self.run_text(
            TaskKind::CodeGeneration,
            Inputs::new().text("prompt", prompt),
        )
        .await
    }

    pub async fn chat(&self, message: impl Into<String>) -> Result<String, Error> {
        self.run_text(TaskKind::Chatbot, Inputs::new().text("message", message))
            .await
    }

    pub async fn sentiment(&self, text: impl Into<String>) -> Result<String, Error> {
        self.run_text(TaskKind::Sentiment, Inputs::new().text("text", text))
            .await
    }

    pub async fn translate(
        &self,
        text: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Result<String, Error> {
        self.run_text(
            TaskKind::Translation,
            Inputs::new()
                .text("text", text)
                .text("target_language", target_language),
        )
        .await
    }

    pub async fn classify(&self, text: impl Into<String>) -> Result<String, Error> {
        self.run_text(TaskKind::Classification, Inputs::new().text("text", text))
            .await
    }

    pub async fn answer(
        &self,
        context: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<String, Error> {
        self.run_text(
            TaskKind::QuestionAnswering,
            Inputs::new()
                .text("context", context)
                .text("question", question),
        )
        .await
    }

    pub async fn named_entities(&self, text: impl Into<String>) -> Result<String, Error> {
        self.run_text(
            TaskKind::NamedEntityRecognition,
            Inputs::new().text("text", text),
        )
        .await
    }

    pub async fn summarize(&self, text: impl Into<String>) -> Result<String, Error> {
        self.run_text(TaskKind::Summarization, Inputs::new().text("text", text))
            .await
    }

    pub async fn understand_document(
        &self,
        document_text: impl Into<String>,
        question: impl Into<String>,
    ) -> Result<String, Error> {
        self.run_text(
            TaskKind::DocumentUnderstanding,
            Inputs::new()
                .text("document_text", document_text)
                .text("question", question),
        )
        .await
    }

    pub async fn caption_image(&self, image_path: impl AsRef<Path>) -> Result<String, Error> {
        self.run_text(
            TaskKind::ImageCaptioning,
            Inputs::new().text("image_path", image_path.as_ref().display().to_string()),
        )
        .await
    }

    pub async fn visual_answer(
        &self,
        image_path: impl AsRef<Path>,
        question: impl Into<String>,
    ) -> Result<String, Error> {
        self.run_text(
            TaskKind::VisualQuestionAnswering,
            Inputs::new()
                .text("image_path", image_path.as_ref().display().to_string())
                .text("question", question),
        )
        .await
    }

    /// Generate an image; `Ok(None)` means the response carried no
    /// recognizable image data.
    pub async fn generate_image(
        &self,
        prompt: impl Into<String>,
    ) -> Result<Option<Vec<u8>>, Error> {
        let result = self
            .run(
                TaskKind::ImageGeneration,
                Inputs::new().text("prompt", prompt),
            )
            .await?;
        Ok(result.into_binary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::{BoxFuture, InvocationResponse};
    use crate::request::InvocationRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Stub boundary: counts calls and replays a canned body.
    struct StubInvoker {
        body: &'static str,
        calls: AtomicUsize,
    }

    impl StubInvoker {
        fn new(body: &'static str) -> Self {
            Self {
                body,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InferenceInvoker for StubInvoker {
        fn invoke<'a>(
            &'a self,
            _request: &'a InvocationRequest,
        ) -> BoxFuture<'a, Result<InvocationResponse, Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(InvocationResponse::new(self.body.as_bytes().to_vec())) })
        }
    }

    #[tokio::test]
    async fn test_pipeline_text_task() {
        let invoker = StubInvoker::new(r#"{"completion":" positive"}"#);
        let config = ClientConfig::default();
        let params = TaskParams::new(
            TaskKind::Sentiment,
            Inputs::new().text("text", "what a great day"),
        );

        let result = run_task(&invoker, &config, &params).await.unwrap();
        assert_eq!(
            result,
            ExtractedResult::Text(r#"{"completion":" positive"}"#.to_string())
        );
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pipeline_image_task() {
        let invoker = StubInvoker::new(r#"{"artifacts":[{"base64":"aGVsbG8="}]}"#);
        let config = ClientConfig::default();
        let params = TaskParams::new(TaskKind::ImageGeneration, Inputs::new());

        let result = run_task(&invoker, &config, &params).await.unwrap();
        assert_eq!(result.into_binary().unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_missing_image_short_circuits_before_invoke() {
        let invoker = StubInvoker::new("{}");
        let config = ClientConfig::default();
        let params = TaskParams::new(
            TaskKind::VisualQuestionAnswering,
            Inputs::new().text("image_path", "/nonexistent/cat.png"),
        );

        let err = run_task(&invoker, &config, &params).await.unwrap_err();
        assert!(matches!(err, Error::ResourceNotFound { .. }));
        assert_eq!(invoker.calls.load(Ordering::SeqCst), 0);
    }
}
