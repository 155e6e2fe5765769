//! bedrock-tasks
//!
//! A small task-oriented client for Amazon Bedrock model invocation. One
//! data-driven core replaces the usual pile of near-identical demo
//! programs: a [`TaskKind`] picks the request payload shape and the
//! response-extraction strategy, a [`RequestBuilder`](request::RequestBuilder)
//! serializes the per-family JSON body, the [`InferenceInvoker`] boundary
//! carries it to the service, and a tolerant
//! [`ResponseExtractor`](extract::ResponseExtractor) locates the result in
//! whatever shape comes back.
//!
//! # Quick Start
//!
//! ```ignore
//! use bedrock_tasks::{Client, Inputs, TaskKind};
//!
//! let client = Client::from_env().await?; // settings.json + AWS credential chain
//! let summary = client.tasks().summarize("long article text ...").await?;
//!
//! let result = client
//!     .tasks()
//!     .run(TaskKind::Translation, Inputs::new()
//!         .text("text", "Good morning")
//!         .text("target_language", "French"))
//!     .await?;
//! println!("{result}");
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod inputs;
pub mod invoker;
pub mod output;
pub mod request;
pub mod task;
pub mod tasks;

// Re-export key types at crate root for ergonomic imports.
pub use client::{Client, ClientBuilder};
pub use config::ClientConfig;
pub use error::Error;
pub use extract::ExtractedResult;
pub use inputs::{InputValue, Inputs};
pub use invoker::{InferenceInvoker, InvocationResponse};
pub use request::{InvocationRequest, TaskParams};
pub use task::TaskKind;
pub use tasks::run_task;
