//! Storage REST client implementation
//!
//! Talks to the project's storage (`/storage/v1`) and auth (`/auth/v1`)
//! endpoints with the API key sent both as `apikey` and as a bearer token.
//! Implements the StorageApi trait from sdiag-core.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use sdiag_core::{
    AuthSession, Bucket, Download, Error, ListOptions, ObjectPath, Result, SessionConfig,
    StorageApi, StorageEntry, UploadOptions, UploadReceipt,
};
use serde::{Deserialize, Serialize};
use url::Url;

/// Storage REST client
pub struct StorageClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl StorageClient {
    /// Create a new client from a validated session configuration
    ///
    /// No network call is made here.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        let http_client = Client::builder()
            .user_agent(concat!("sdiag/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.base_url().to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build a storage API URL
    fn storage_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.base_url, path)
    }

    /// Build an object endpoint URL, percent-encoding every key segment
    ///
    /// `scope` holds the fixed segments after `/object` (bucket, or
    /// `public` and bucket). Keys may contain `?`, `#` or spaces.
    fn object_url(&self, scope: &[&str], key: Option<&str>) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)?;
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                Error::Config(format!("Base URL cannot carry a path: {}", self.base_url))
            })?;
            segments
                .pop_if_empty()
                .extend(["storage", "v1", "object"])
                .extend(scope);
            if let Some(key) = key {
                segments.extend(key.split('/'));
            }
        }
        Ok(url)
    }

    /// Build an auth API URL
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.base_url, path)
    }

    /// Start a request carrying the API key
    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send a request, returning the response only if it succeeded
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.send_raw(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(map_error(status, &body))
    }

    /// Send a request without interpreting the status
    async fn send_raw(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build().map_err(map_transport_error)?;
        let method = request.method().clone();
        let url = request.url().to_string();

        let started = Instant::now();
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(map_transport_error)?;

        tracing::debug!(
            %method,
            %url,
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "storage request"
        );
        Ok(response)
    }

    /// Decode a JSON response body
    async fn json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?;
        serde_json::from_str(&text).map_err(Error::Json)
    }
}

/// Error body shapes used by the storage and auth services
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "statusCode")]
    status_code: Option<serde_json::Value>,
    message: Option<String>,
    msg: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl ApiErrorBody {
    /// Status carried in the body; the storage service reports e.g. 404s as HTTP 400
    fn status(&self) -> Option<u16> {
        match self.status_code.as_ref()? {
            serde_json::Value::String(s) => s.parse().ok(),
            serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            _ => None,
        }
    }

    fn message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

/// Map an unsuccessful response to an error
fn map_error(status: StatusCode, body: &str) -> Error {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let status = parsed.status().unwrap_or(status.as_u16());
    let message = parsed
        .message()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("HTTP {status}")
            } else {
                body.to_string()
            }
        });

    match status {
        404 => Error::NotFound(message),
        401 | 403 => Error::Auth(message),
        409 => Error::Conflict(message),
        408 | 504 => Error::Timeout(message),
        _ => Error::Api { status, message },
    }
}

/// Map a transport failure (no HTTP response) to an error
fn map_transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Network(e.to_string())
    }
}

/// Whether an auth rejection only means "no user session for this key"
fn is_missing_session(error: &Error) -> bool {
    match error {
        Error::Auth(message) => {
            let message = message.to_lowercase();
            message.contains("sub claim") || message.contains("session")
        }
        _ => false,
    }
}

/// Request body for object listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
    sort_by: SortBy,
}

#[derive(Debug, Serialize)]
struct SortBy {
    column: &'static str,
    order: &'static str,
}

/// Response for uploads
#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(rename = "Key")]
    key: Option<String>,
    #[serde(rename = "Id")]
    id: Option<String>,
}

/// Request body for removals
#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: &'a [String],
}

#[derive(Debug, Deserialize)]
struct RemovedObject {
    name: String,
}

/// Response for the current auth user
#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
    role: Option<String>,
}

#[async_trait]
impl StorageApi for StorageClient {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        let url = self.storage_url("/bucket");
        let response = self.send(self.request(Method::GET, &url)).await?;
        Self::json(response).await
    }

    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<Vec<StorageEntry>> {
        let url = self.object_url(&["list", bucket], None)?;
        let prefix = sdiag_core::normalize_key(&options.prefix);
        let body = ListRequest {
            prefix: &prefix,
            limit: options.limit,
            offset: options.offset,
            sort_by: SortBy {
                column: "name",
                order: "asc",
            },
        };

        let response = self
            .send(self.request(Method::POST, url.as_str()).json(&body))
            .await?;
        Self::json(response).await
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        body: Vec<u8>,
        options: UploadOptions,
    ) -> Result<UploadReceipt> {
        let url = self.object_url(&[path.bucket.as_str()], Some(path.key.as_str()))?;
        let request = self
            .request(Method::POST, url.as_str())
            .header(CONTENT_TYPE, &options.content_type)
            .header("cache-control", format!("max-age={}", options.cache_control))
            .header("x-upsert", if options.upsert { "true" } else { "false" })
            .body(body);

        let response = self.send(request).await?;
        let stored: UploadResponse = Self::json(response).await?;

        Ok(UploadReceipt {
            path: path.key.clone(),
            full_path: stored.key.unwrap_or_else(|| path.to_string()),
            id: stored.id,
        })
    }

    async fn download(&self, path: &ObjectPath) -> Result<Download> {
        let url = self.object_url(&[path.bucket.as_str()], Some(path.key.as_str()))?;
        let response = self.send(self.request(Method::GET, url.as_str())).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {e}")))?
            .to_vec();

        Ok(Download {
            bytes,
            content_type,
        })
    }

    async fn remove(&self, bucket: &str, keys: &[String]) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let url = self.object_url(&[bucket], None)?;
        let response = self
            .send(
                self.request(Method::DELETE, url.as_str())
                    .json(&RemoveRequest { prefixes: keys }),
            )
            .await?;

        let removed: Vec<RemovedObject> = Self::json(response).await?;
        Ok(removed.into_iter().map(|o| o.name).collect())
    }

    fn public_url(&self, path: &ObjectPath) -> Result<String> {
        Ok(self
            .object_url(&["public", path.bucket.as_str()], Some(path.key.as_str()))?
            .to_string())
    }

    fn public_base_url(&self) -> String {
        self.storage_url("/object/public/")
    }

    async fn current_session(&self) -> Result<AuthSession> {
        let url = self.auth_url("/user");
        let user: UserResponse = match self.send(self.request(Method::GET, &url)).await {
            Ok(response) => Self::json(response).await?,
            Err(e) if is_missing_session(&e) => return Err(Error::SessionMissing),
            Err(e) => return Err(e),
        };

        Ok(AuthSession {
            user_id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}
