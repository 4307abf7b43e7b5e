//! HTTP implementation of the backend contract.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ApiError, ChatApi, Message, ThreadSnapshot, UserId};

/// JSON client for the dashboard API.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
struct SendBody {
    text: String,
}

#[derive(Deserialize)]
struct MessagesEnvelope {
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str, api_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Turn a non-2xx response into a verbatim rejection where the backend
    /// supplied an `{"error": ...}` body.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rejection = response
            .json::<ErrorEnvelope>()
            .await
            .ok()
            .and_then(|envelope| envelope.error)
            .unwrap_or_else(|| default_error_text(status));
        Err(ApiError::Rejected(rejection))
    }

    async fn post_action(&self, path: &str) -> Result<(), ApiError> {
        let response = self.authorized(self.client.post(self.url(path))).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

fn default_error_text(status: StatusCode) -> String {
    format!("Request failed with status {}", status)
}

impl ChatApi for HttpApi {
    async fn fetch_threads(&self) -> Result<ThreadSnapshot, ApiError> {
        let response = self
            .authorized(self.client.get(self.url("/api/dashboard/chats/threads/")))
            .send()
            .await?;
        let response = Self::check(response).await?;
        response
            .json::<ThreadSnapshot>()
            .await
            .map_err(|_| ApiError::InvalidResponse)
    }

    async fn fetch_messages(&self, user_id: UserId) -> Result<Vec<Message>, ApiError> {
        let path = format!("/api/dashboard/chats/{}/messages/", user_id);
        let response = self.authorized(self.client.get(self.url(&path))).send().await?;
        let response = Self::check(response).await?;
        let envelope = response
            .json::<MessagesEnvelope>()
            .await
            .map_err(|_| ApiError::InvalidResponse)?;
        Ok(envelope.messages)
    }

    async fn send_message(&self, user_id: UserId, text: String) -> Result<(), ApiError> {
        let path = format!("/api/dashboard/chats/{}/send/", user_id);
        let response = self
            .authorized(self.client.post(self.url(&path)))
            .json(&SendBody { text })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn resolve(&self, user_id: UserId) -> Result<(), ApiError> {
        self.post_action(&format!("/api/dashboard/chats/{}/resolve/", user_id))
            .await
    }

    async fn reopen(&self, user_id: UserId) -> Result<(), ApiError> {
        self.post_action(&format!("/api/dashboard/chats/{}/reopen/", user_id))
            .await
    }
}
