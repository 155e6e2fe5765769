use serde::{Deserialize, Serialize};

/// The thirteen fixed natural-language/vision operations supported.
///
/// The kind is immutable once chosen; it determines both the request payload
/// shape and the response-extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    ImageGeneration,
    TextGeneration,
    Chatbot,
    Sentiment,
    Translation,
    Classification,
    QuestionAnswering,
    NamedEntityRecognition,
    ImageCaptioning,
    VisualQuestionAnswering,
    DocumentUnderstanding,
    CodeGeneration,
    Summarization,
}

/// How the meaningful result is located in the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// Parse JSON and pull base64 image data out of `artifacts[0].base64`,
    /// falling back to a top-level `image` field.
    Base64Image,
    /// Return the raw body verbatim as text.
    RawText,
}

impl TaskKind {
    pub const ALL: [TaskKind; 13] = [
        TaskKind::ImageGeneration,
        TaskKind::TextGeneration,
        TaskKind::Chatbot,
        TaskKind::Sentiment,
        TaskKind::Translation,
        TaskKind::Classification,
        TaskKind::QuestionAnswering,
        TaskKind::NamedEntityRecognition,
        TaskKind::ImageCaptioning,
        TaskKind::VisualQuestionAnswering,
        TaskKind::DocumentUnderstanding,
        TaskKind::CodeGeneration,
        TaskKind::Summarization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::ImageGeneration => "image-generation",
            TaskKind::TextGeneration => "text-generation",
            TaskKind::Chatbot => "chatbot",
            TaskKind::Sentiment => "sentiment",
            TaskKind::Translation => "translation",
            TaskKind::Classification => "classification",
            TaskKind::QuestionAnswering => "question-answering",
            TaskKind::NamedEntityRecognition => "named-entity-recognition",
            TaskKind::ImageCaptioning => "image-captioning",
            TaskKind::VisualQuestionAnswering => "visual-question-answering",
            TaskKind::DocumentUnderstanding => "document-understanding",
            TaskKind::CodeGeneration => "code-generation",
            TaskKind::Summarization => "summarization",
        }
    }

    /// The input keys that must resolve (from caller-provided inputs or the
    /// documented defaults) before a request can be built.
    ///
    /// The `image` key resolves from inline bytes or from an `image_path`
    /// input pointing at an existing file; it has no default.
    pub fn required_inputs(&self) -> &'static [&'static str] {
        match self {
            TaskKind::ImageGeneration => &["prompt"],
            TaskKind::TextGeneration => &["prompt"],
            TaskKind::Chatbot => &["message"],
            TaskKind::Sentiment => &["text"],
            TaskKind::Translation => &["text", "target_language"],
            TaskKind::Classification => &["text"],
            TaskKind::QuestionAnswering => &["context", "question"],
            TaskKind::NamedEntityRecognition => &["text"],
            TaskKind::ImageCaptioning => &["image"],
            TaskKind::VisualQuestionAnswering => &["image", "question"],
            TaskKind::DocumentUnderstanding => &["document_text"],
            TaskKind::CodeGeneration => &["prompt"],
            TaskKind::Summarization => &["text"],
        }
    }

    /// The documented default value for a text input key, if one exists.
    pub fn default_input(&self, key: &str) -> Option<&'static str> {
        match (self, key) {
            (TaskKind::ImageGeneration, "prompt") => {
                Some("A sunlit mountain lake with pine trees, photorealistic")
            }
            (TaskKind::TextGeneration, "prompt") => {
                Some("Write a short story about a robot who discovers music.")
            }
            (TaskKind::Chatbot, "message") => Some("Hello! How are you today?"),
            (TaskKind::Sentiment, "text") => {
                Some("I absolutely love this product, it exceeded my expectations.")
            }
            (TaskKind::Translation, "text") => Some("Hello, how are you?"),
            (TaskKind::Translation, "target_language") => Some("Spanish"),
            (TaskKind::Classification, "text") => {
                Some("The home team won the championship game last night.")
            }
            (TaskKind::Classification, "categories") => {
                Some("news, sports, technology, entertainment")
            }
            (TaskKind::QuestionAnswering, "context") => Some(
                "Amazon Bedrock is a fully managed service that offers a choice of \
                 foundation models through a single API.",
            ),
            (TaskKind::QuestionAnswering, "question") => Some("What is Amazon Bedrock?"),
            (TaskKind::NamedEntityRecognition, "text") => {
                Some("Jeff Bezos founded Amazon in Seattle in 1994.")
            }
            (TaskKind::VisualQuestionAnswering, "question") => {
                Some("What is shown in this image?")
            }
            (TaskKind::DocumentUnderstanding, "document_text") => Some(
                "Invoice #1042. Date: 2024-03-01. Total due: $250.00. \
                 Payment terms: net 30 days.",
            ),
            (TaskKind::DocumentUnderstanding, "question") => {
                Some("What is this document about?")
            }
            (TaskKind::CodeGeneration, "prompt") => {
                Some("Write a function that reverses a string.")
            }
            (TaskKind::Summarization, "text") => Some(
                "Foundation models are large machine learning models trained on broad \
                 data at scale. They can be adapted to a wide range of downstream \
                 tasks, from text generation to classification, and are typically \
                 accessed through managed inference endpoints.",
            ),
            _ => None,
        }
    }

    /// The generation-length hint serialized into text payloads
    /// (`max_tokens_to_sample` for the text-completions family).
    pub fn max_tokens(&self) -> u32 {
        match self {
            TaskKind::Sentiment => 20,
            TaskKind::Classification | TaskKind::ImageCaptioning => 50,
            TaskKind::TextGeneration | TaskKind::CodeGeneration => 200,
            _ => 100,
        }
    }

    /// The model identifier used when no override is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            TaskKind::ImageGeneration => "stability.stable-diffusion-xl-v1",
            TaskKind::ImageCaptioning | TaskKind::VisualQuestionAnswering => {
                "anthropic.claude-3-haiku-20240307-v1:0"
            }
            _ => "anthropic.claude-v2",
        }
    }

    pub fn extraction_strategy(&self) -> ExtractionStrategy {
        match self {
            TaskKind::ImageGeneration => ExtractionStrategy::Base64Image,
            _ => ExtractionStrategy::RawText,
        }
    }

    /// Whether the task consumes image bytes (read from a path or inline).
    pub fn needs_image(&self) -> bool {
        matches!(
            self,
            TaskKind::ImageCaptioning | TaskKind::VisualQuestionAnswering
        )
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskKind::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| crate::error::Error::Config(format!("unknown task kind `{s}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_as_str_from_str_roundtrip() {
        for task in TaskKind::ALL {
            assert_eq!(TaskKind::from_str(task.as_str()).unwrap(), task);
        }
    }

    #[test]
    fn test_from_str_unknown() {
        assert!(TaskKind::from_str("speech-to-text").is_err());
    }

    #[test]
    fn test_serde_matches_as_str() {
        for task in TaskKind::ALL {
            let json = serde_json::to_string(&task).unwrap();
            assert_eq!(json, format!("\"{}\"", task.as_str()));
            let back: TaskKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, task);
        }
    }

    #[test]
    fn test_every_task_has_required_inputs() {
        for task in TaskKind::ALL {
            assert!(
                !task.required_inputs().is_empty(),
                "{task} lists no required inputs"
            );
        }
    }

    #[test]
    fn test_text_inputs_have_defaults() {
        // Every required input except raw image bytes carries a documented
        // default value.
        for task in TaskKind::ALL {
            for key in task.required_inputs() {
                if *key == "image" {
                    assert!(task.default_input(key).is_none());
                } else {
                    assert!(
                        task.default_input(key).is_some(),
                        "{task} input `{key}` has no default"
                    );
                }
            }
        }
    }

    #[test]
    fn test_max_tokens_hints() {
        assert_eq!(TaskKind::Sentiment.max_tokens(), 20);
        assert_eq!(TaskKind::Classification.max_tokens(), 50);
        assert_eq!(TaskKind::Summarization.max_tokens(), 100);
        assert_eq!(TaskKind::TextGeneration.max_tokens(), 200);
        assert_eq!(TaskKind::CodeGeneration.max_tokens(), 200);
    }

    #[test]
    fn test_extraction_strategy() {
        assert_eq!(
            TaskKind::ImageGeneration.extraction_strategy(),
            ExtractionStrategy::Base64Image
        );
        for task in TaskKind::ALL {
            if task != TaskKind::ImageGeneration {
                assert_eq!(task.extraction_strategy(), ExtractionStrategy::RawText);
            }
        }
    }
}
