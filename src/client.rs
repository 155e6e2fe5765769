use std::sync::Arc;
use std::time::{Duration, SystemTime};

use aws_credential_types::provider::ProvideCredentials;
use aws_sigv4::http_request::{
    PayloadChecksumKind, SignableBody, SignableRequest, SignatureLocation, SigningSettings,
    sign as sigv4_sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{Error, ServiceErrorBody};
use crate::invoker::{BoxFuture, InferenceInvoker, InvocationResponse};
use crate::request::InvocationRequest;
use crate::tasks::TaskService;

const SIGNING_SERVICE: &str = "bedrock";

/// Shared inner state for the client.
pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
    pub(crate) credentials_provider: Box<dyn ProvideCredentials>,
}

/// The Bedrock task-invocation client.
///
/// Holds an `Arc<ClientInner>` for cheap cloning; one reqwest client per
/// process run. Exactly one request is in flight per call, and the client
/// never retries; callers wanting fan-out or retry layer it on top.
#[derive(Clone)]
pub struct Client {
    pub(crate) inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("region", &self.inner.config.region)
            .field("endpoint", &self.inner.config.endpoint())
            .finish()
    }
}

impl Client {
    /// Create a client from the settings file, environment and the default
    /// AWS credential chain (env vars, config files, IMDS, etc.).
    pub async fn from_env() -> Result<Self, Error> {
        let config = ClientConfig::from_env()?;
        Self::from_config(config).await
    }

    /// Create a client from an explicit configuration, resolving
    /// credentials through the default AWS chain for its region.
    pub async fn from_config(config: ClientConfig) -> Result<Self, Error> {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        let provider = aws_config
            .credentials_provider()
            .ok_or_else(|| Error::Config("no AWS credentials provider found".to_string()))?;

        Ok(Client::builder()
            .config(config)
            .credentials_provider(provider)
            .build())
    }

    /// Create a new `ClientBuilder` for customizing client configuration.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Access the task service.
    pub fn tasks(&self) -> TaskService<'_> {
        TaskService::new(self)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Send one SigV4-signed invocation to
    /// `POST {endpoint}/model/{model_id}/invoke`.
    ///
    /// At-most-once: a failed call is returned as-is, never replayed.
    /// HTTP statuses >= 400 become [`Error::Invocation`] with a tolerant
    /// parse of the service error body.
    pub async fn invoke_model(
        &self,
        request: &InvocationRequest,
    ) -> Result<InvocationResponse, Error> {
        let inner = &self.inner;
        let url = format!(
            "{}/model/{}/invoke",
            inner.config.endpoint(),
            request.model_id
        );

        let mut headers = inner.config.build_headers();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            header_value(&request.content_type)?,
        );
        headers.insert(reqwest::header::ACCEPT, header_value(&request.accept_type)?);

        self.sign_request(&url, &mut headers, &request.payload)
            .await?;

        debug!(model_id = %request.model_id, url = %url, "invoking model");

        let response = inner
            .http
            .post(&url)
            .headers(headers)
            .body(request.payload.clone())
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Error::Http)?;

        if status >= 400 {
            return Err(Error::Invocation {
                status,
                body: ServiceErrorBody::from_bytes(&body),
            });
        }

        Ok(InvocationResponse { body })
    }

    /// Apply SigV4 signing headers for the Bedrock runtime service.
    async fn sign_request(
        &self,
        url: &str,
        headers: &mut HeaderMap,
        payload: &[u8],
    ) -> Result<(), Error> {
        let credentials = self
            .inner
            .credentials_provider
            .provide_credentials()
            .await
            .map_err(|e| Error::Signing(format!("failed to get AWS credentials: {e}")))?;
        let identity: Identity = credentials.into();

        let mut signing_settings = SigningSettings::default();
        signing_settings.payload_checksum_kind = PayloadChecksumKind::XAmzSha256;
        signing_settings.signature_location = SignatureLocation::Headers;

        let signing_params = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.inner.config.region)
            .name(SIGNING_SERVICE)
            .time(SystemTime::now())
            .settings(signing_settings)
            .build()
            .map_err(|e| Error::Signing(format!("failed to build signing params: {e}")))?;

        let signable_request = SignableRequest::new(
            "POST",
            url,
            headers
                .iter()
                .map(|(k, v)| (k.as_str(), v.to_str().unwrap_or(""))),
            SignableBody::Bytes(payload),
        )
        .map_err(|e| Error::Signing(format!("failed to create signable request: {e}")))?;

        let (signing_instructions, _signature) =
            sigv4_sign(signable_request, &signing_params.into())
                .map_err(|e| Error::Signing(format!("SigV4 signing failed: {e}")))?
                .into_parts();

        for (name, value) in signing_instructions.headers() {
            let name: reqwest::header::HeaderName = name
                .parse()
                .map_err(|e| Error::Signing(format!("invalid signing header name: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Signing(format!("invalid signing header value: {e}")))?;
            headers.insert(name, value);
        }

        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::Config(format!("invalid header value: {e}")))
}

impl InferenceInvoker for Client {
    fn invoke<'a>(
        &'a self,
        request: &'a InvocationRequest,
    ) -> BoxFuture<'a, Result<InvocationResponse, Error>> {
        Box::pin(self.invoke_model(request))
    }
}

/// Builder for constructing a `Client` with custom configuration.
pub struct ClientBuilder {
    config: ClientConfig,
    http_client: Option<reqwest::Client>,
    credentials_provider: Option<Box<dyn ProvideCredentials>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            http_client: None,
            credentials_provider: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    /// Override the inference endpoint (e.g. to point at a local mock).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Override the model used for one task kind.
    pub fn model_override(
        mut self,
        task: crate::task::TaskKind,
        model_id: impl Into<String>,
    ) -> Self {
        self.config.models.insert(task, model_id.into());
        self
    }

    /// Set the AWS credentials provider used for request signing.
    pub fn credentials_provider(
        mut self,
        provider: impl ProvideCredentials + 'static,
    ) -> Self {
        self.credentials_provider = Some(Box::new(provider));
        self
    }

    /// Set a custom reqwest HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the `Client`.
    ///
    /// Panics if no credentials provider was set; use [`Client::from_env`]
    /// to resolve credentials through the default AWS chain.
    pub fn build(self) -> Client {
        let http = self.http_client.unwrap_or_else(|| {
            reqwest::Client::builder()
                .timeout(self.config.timeout)
                .build()
                .expect("failed to build reqwest client")
        });
        let credentials_provider = self
            .credentials_provider
            .expect("credentials provider is required; see Client::from_env");

        Client {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                credentials_provider,
            }),
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;
    use aws_credential_types::Credentials;

    fn test_credentials() -> Credentials {
        Credentials::new("AKIDEXAMPLE", "secret", None, None, "test")
    }

    #[test]
    fn test_builder_defaults() {
        let client = Client::builder()
            .credentials_provider(test_credentials())
            .build();
        assert_eq!(client.inner.config.region, "us-east-1");
        assert_eq!(
            client.inner.config.endpoint(),
            "https://bedrock-runtime.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_builder_custom() {
        let client = Client::builder()
            .region("eu-central-1")
            .base_url("http://127.0.0.1:9999")
            .timeout(Duration::from_secs(30))
            .model_override(TaskKind::Chatbot, "anthropic.claude-instant-v1")
            .credentials_provider(test_credentials())
            .build();

        assert_eq!(client.inner.config.region, "eu-central-1");
        assert_eq!(client.inner.config.endpoint(), "http://127.0.0.1:9999");
        assert_eq!(client.inner.config.timeout, Duration::from_secs(30));
        assert_eq!(
            client.inner.config.model_for(TaskKind::Chatbot),
            "anthropic.claude-instant-v1"
        );
    }

    #[test]
    fn test_client_clone_is_cheap() {
        let client = Client::builder()
            .credentials_provider(test_credentials())
            .build();
        let cloned = client.clone();
        assert!(Arc::ptr_eq(&client.inner, &cloned.inner));
    }

    #[test]
    fn test_client_debug() {
        let client = Client::builder()
            .region("us-west-2")
            .credentials_provider(test_credentials())
            .build();
        let debug = format!("{client:?}");
        assert!(debug.contains("us-west-2"));
    }
}
