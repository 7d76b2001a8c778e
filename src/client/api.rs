// src/client/api.rs

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    client::{
        config::ClientConfig,
        error::{ClientError, ClientResult},
    },
    middleware::auth::SESSION_COOKIE,
};

/// Thin JSON wrapper over `reqwest` that knows how the market API authenticates
/// and reports errors.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    // Bearer token if configured, session cookie otherwise.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.config.token {
            request.bearer_auth(token)
        } else if let Some(session) = &self.config.session_cookie {
            request.header(header::COOKIE, format!("{SESSION_COOKIE}={session}"))
        } else {
            request
        }
    }

    /// Sends one request and decodes the JSON answer.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> ClientResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut request = self.authorize(self.client.request(method.clone(), self.url(path)));
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(%method, path, "api request");
        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let status = response.status();

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) && !self.config.is_dev_host() {
            return Err(ClientError::LoginRequired { redirect: self.config.login_url() });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        let bytes = response.bytes().await?;
        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(Value::Object(Default::default()))?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ClientResult<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// POST with an empty `{}` body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        self.post(path, &Value::Object(Default::default())).await
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        ["error", "message"]
            .iter()
            .find_map(|field| json.get(field).and_then(Value::as_str).map(str::to_owned))
    });

    from_json
        .or_else(|| Some(body.trim().to_string()).filter(|text| !text.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string())
}
