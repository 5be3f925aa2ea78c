use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{
    COMPLETION_DURATION, COMPLETION_ERRORS, COMPLETION_REQUESTS, MODERATION_DURATION,
    MODERATION_ERRORS, MODERATION_REQUESTS,
};
use crate::service::ChatService;
use crate::types::{ChatCompletion, ChatCompletionParams, ModerationParams, ModerationResponse};

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/";
const API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the OpenAI chat completion and moderation endpoints.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAi")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish_non_exhaustive()
    }
}

impl OpenAi {
    /// Create a new client.
    ///
    /// The API key can be provided directly or read from the OPENAI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// `base_url` must be an absolute http(s) URL; a trailing slash is added
    /// when missing so endpoint paths join beneath it.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = match api_key {
            Some(key) => key,
            None => env::var(API_KEY_VAR).map_err(|_| {
                Error::authentication(
                    "API key not provided and OPENAI_API_KEY environment variable not set",
                )
            })?,
        };
        if HeaderValue::from_str(&format!("Bearer {api_key}")).is_err() {
            return Err(Error::authentication(
                "API key contains characters that cannot be sent in a header",
            ));
        }

        let base_url = match base_url {
            Some(url) => normalize_base_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request and response.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|_| Error::authentication("API key is not a valid header value"))?;
        headers.insert(header::AUTHORIZATION, bearer);
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let error_type = detail.as_ref().and_then(|e| e.error_type.clone());
        let error_message = detail
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| error_body.clone());
        let error_param = detail.as_ref().and_then(|e| e.param.clone());

        match status_code {
            400 => Error::bad_request(error_message, error_param),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message, request_id),
        }
    }

    async fn post_json<P, R>(&self, endpoint: &str, params: &P) -> Result<R>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers()?)
            .json(params)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        // A body that stops arriving is a transport failure, not a parse failure.
        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        serde_json::from_slice::<R>(&body).map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Send a chat completion request and return the full response.
    pub async fn create_chat_completion(
        &self,
        params: &ChatCompletionParams,
    ) -> Result<ChatCompletion> {
        if let Some(logger) = &self.logger {
            logger.log_completion_request(params);
        }
        COMPLETION_REQUESTS.click();
        let start = Instant::now();
        let result = self
            .post_json::<_, ChatCompletion>("chat/completions", params)
            .await;
        COMPLETION_DURATION.add(start.elapsed().as_secs_f64());
        match result {
            Ok(completion) => {
                if let Some(logger) = &self.logger {
                    logger.log_completion(&completion);
                }
                Ok(completion)
            }
            Err(err) => {
                COMPLETION_ERRORS.click();
                Err(err)
            }
        }
    }

    /// Classify text with the moderation endpoint.
    pub async fn create_moderation(&self, params: &ModerationParams) -> Result<ModerationResponse> {
        MODERATION_REQUESTS.click();
        let start = Instant::now();
        let result = self
            .post_json::<_, ModerationResponse>("moderations", params)
            .await;
        MODERATION_DURATION.add(start.elapsed().as_secs_f64());
        match result {
            Ok(response) => {
                if let Some(logger) = &self.logger {
                    logger.log_moderation(params, &response);
                }
                Ok(response)
            }
            Err(err) => {
                MODERATION_ERRORS.click();
                Err(err)
            }
        }
    }
}

#[async_trait::async_trait]
impl ChatService for OpenAi {
    async fn moderate(&self, params: ModerationParams) -> Result<ModerationResponse> {
        self.create_moderation(&params).await
    }

    async fn complete(&self, params: ChatCompletionParams) -> Result<ChatCompletion> {
        self.create_chat_completion(&params).await
    }
}

fn normalize_base_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::validation(
            format!("base URL must use http or https, got {}", parsed.scheme()),
            Some("base_url".to_string()),
        ));
    }
    let mut normalized = parsed.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = OpenAi::new(Some("test-key".to_string())).unwrap();
        assert_eq!(client.api_key, "test-key");
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = OpenAi::with_options(
            Some("test-key".to_string()),
            Some("https://gateway.example.com/openai/v1".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://gateway.example.com/openai/v1/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_bad_base_url() {
        let err = OpenAi::with_options(
            Some("test-key".to_string()),
            Some("not a url".to_string()),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Url { .. }));

        let err = OpenAi::with_options(
            Some("test-key".to_string()),
            Some("ftp://example.com/".to_string()),
            None,
        )
        .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn rejects_unsendable_api_key() {
        let err = OpenAi::new(Some("bad\nkey".to_string())).unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn debug_hides_api_key() {
        let client = OpenAi::new(Some("sk-secret".to_string())).unwrap();
        assert!(!format!("{client:?}").contains("sk-secret"));
    }
}
