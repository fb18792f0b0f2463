use std::sync::Arc;

use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::cache::{CacheTag, QueryCache};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionContext;

/// HTTP data layer: bearer auth, error tagging, read-through cache.
///
/// Any 401, from any endpoint, signs the user out before the error is
/// returned to the caller.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
    session: SessionContext,
    cache: Arc<QueryCache>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: SessionContext) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: Arc::from(config.api_base_url.trim_end_matches('/')),
            session,
            cache: Arc::new(QueryCache::new()),
        })
    }

    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    #[must_use]
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(
        &self,
        method: &Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<Value, ApiError> {
        let response = builder.send().await.map_err(|err| {
            warn!(%method, path, error = %err, "request failed");
            ApiError::from_transport(&err)
        })?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "api response");
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::from_transport(&err))?;

        if status.is_success() {
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes).map_err(|err| ApiError::Unknown {
                status: status.as_u16(),
                detail: err.to_string(),
            });
        }

        let (code, detail) = error_body(&bytes, status);
        let err = ApiError::from_status(status.as_u16(), code.as_deref(), detail);
        if err == ApiError::Unauthorized {
            self.force_logout(path).await;
        }
        Err(err)
    }

    async fn force_logout(&self, path: &str) {
        warn!(path, "credential rejected, signing out");
        self.cache.clear();
        if let Err(err) = self.session.clear().await {
            warn!(error = %err, "failed to clear stored credential");
        }
    }

    /// Cached GET.
    pub(crate) async fn query<T: DeserializeOwned>(
        &self,
        path: &str,
        tag: CacheTag,
    ) -> Result<T, ApiError> {
        let body = if let Some(body) = self.cache.get(path) {
            debug!(path, "cache hit");
            body
        } else {
            let stamp = self.cache.stamp(tag);
            let body = self
                .execute(&Method::GET, path, self.request(Method::GET, path))
                .await?;
            let cached = stamp.is_some_and(|stamp| {
                self.cache.insert_fresh(path, tag, stamp, body.clone())
            });
            if !cached {
                debug!(path, ?tag, "invalidated while in flight, not cached");
            }
            body
        };
        decode(body)
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        invalidates: &[CacheTag],
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.request(method.clone(), path).json(body);
        self.mutate(&method, path, builder, invalidates).await
    }

    pub(crate) async fn send_empty<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        invalidates: &[CacheTag],
    ) -> Result<T, ApiError> {
        let builder = self.request(method.clone(), path);
        self.mutate(&method, path, builder, invalidates).await
    }

    pub(crate) async fn send_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        invalidates: &[CacheTag],
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path).form(fields);
        self.mutate(&Method::POST, path, builder, invalidates).await
    }

    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
        invalidates: &[CacheTag],
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path).multipart(form);
        self.mutate(&Method::POST, path, builder, invalidates).await
    }

    async fn mutate<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        builder: RequestBuilder,
        invalidates: &[CacheTag],
    ) -> Result<T, ApiError> {
        let body = self.execute(method, path, builder).await?;
        if !invalidates.is_empty() {
            let dropped = self.cache.invalidate(invalidates);
            debug!(path, dropped, ?invalidates, "invalidated cached queries");
        }
        decode(body)
    }
}

// Bodies only reach here after a 2xx, so a shape mismatch is reported as such.
fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|err| ApiError::Unknown {
        status: StatusCode::OK.as_u16(),
        detail: format!("unexpected response body: {err}"),
    })
}

/// `(code, detail)` from an error response. Understands `{"detail": "..."}`,
/// `{"detail": [{"msg": ..}]}`, `{"detail": {"code", "message"}}` and a
/// top-level `code`.
fn error_body(bytes: &[u8], status: StatusCode) -> (Option<String>, String) {
    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    };

    let Ok(body) = serde_json::from_slice::<Value>(bytes) else {
        let text = String::from_utf8_lossy(bytes).trim().to_string();
        return (None, if text.is_empty() { fallback() } else { text });
    };

    let mut code = body.get("code").and_then(Value::as_str).map(str::to_string);
    let detail = match body.get("detail") {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Some(Value::Object(fields)) => {
            if code.is_none() {
                code = fields.get("code").and_then(Value::as_str).map(str::to_string);
            }
            fields
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        }
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    (code, detail.unwrap_or_else(fallback))
}
