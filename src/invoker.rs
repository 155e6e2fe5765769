use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::Error;
use crate::request::InvocationRequest;

/// A boxed future that is Send, used for trait-object return types.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The raw response produced by the inference endpoint.
///
/// Consumed once by the response extractor; never mutated.
#[derive(Debug, Clone)]
pub struct InvocationResponse {
    pub body: Bytes,
}

impl InvocationResponse {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }
}

/// The boundary to the remote foundation-model service.
///
/// Implementations may be slow (seconds) and may fail with transport,
/// throttling or model-side errors; semantics are at-most-once and failures
/// pass through to the caller unmodified. The crate never retries through
/// this seam. [`Client`](crate::client::Client) is the built-in
/// implementation; tests and callers can substitute their own.
pub trait InferenceInvoker: Send + Sync {
    fn invoke<'a>(
        &'a self,
        request: &'a InvocationRequest,
    ) -> BoxFuture<'a, Result<InvocationResponse, Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedInvoker(&'static str);

    impl InferenceInvoker for CannedInvoker {
        fn invoke<'a>(
            &'a self,
            _request: &'a InvocationRequest,
        ) -> BoxFuture<'a, Result<InvocationResponse, Error>> {
            Box::pin(async move { Ok(InvocationResponse::new(self.0.as_bytes().to_vec())) })
        }
    }

    #[tokio::test]
    async fn test_trait_object_invocation() {
        let invoker: &dyn InferenceInvoker = &CannedInvoker("{\"completion\": \"ok\"}");
        let request = InvocationRequest {
            model_id: "anthropic.claude-v2".to_string(),
            content_type: "application/json".to_string(),
            accept_type: "application/json".to_string(),
            payload: Bytes::from_static(b"{}"),
        };
        let response = invoker.invoke(&request).await.unwrap();
        assert_eq!(&response.body[..], b"{\"completion\": \"ok\"}");
    }
}
