use crate::error::ApiError;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// Thin handle on the REST backend. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

// error bodies look like {"message": "..."}
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ApiClient {
        ApiClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> ApiClient {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let rb = self.http.request(method, self.url(path));
        match &self.token {
            Some(t) => rb.bearer_auth(t),
            None => rb,
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let res = self.request(Method::GET, path).send().await?;
        let res = check(res).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let res = self.request(method, path).json(body).send().await?;
        check(res).await?;
        Ok(())
    }

    pub async fn post_json_for<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let res = self.request(Method::POST, path).json(body).send().await?;
        let res = check(res).await?;
        Ok(res.json::<T>().await?)
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let res = self.request(Method::DELETE, path).send().await?;
        check(res).await?;
        Ok(())
    }

    pub async fn get_bytes(&self, path: &str, timeout: Duration) -> Result<Vec<u8>, ApiError> {
        let res = self
            .request(Method::GET, path)
            .timeout(timeout)
            .send()
            .await?;
        let res = check(res).await?;
        Ok(res.bytes().await.map_err(ApiError::Network)?.to_vec())
    }
}

async fn check(res: Response) -> Result<Response, ApiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    // a body that is not the usual {"message"} shape just means no message
    let message = res
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());
    tracing::debug!(%status, message = message.as_deref().unwrap_or(""), "backend rejected request");
    Err(classify(status, message))
}

fn classify(status: StatusCode, message: Option<String>) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth { status, message },
        StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
            ApiError::Validation { status, message }
        }
        _ => ApiError::Status { status, message },
    }
}
