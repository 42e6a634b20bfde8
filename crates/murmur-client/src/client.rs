use futures_util::future::BoxFuture;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use murmur_types::api::{
    AcceptMessagesResponse, AnonShieldResponse, ApiResponse, MessagesCheckResponse,
    MessagesResponse, SignInResponse, SuggestMessagesResponse,
};
use murmur_types::genai::{GenAiError, TextGenerator};
use murmur_types::models::Message;
use murmur_types::moderation::split_suggestions;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with its `{success: false, message}` envelope.
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status(),
        }
    }
}

pub struct MurmurClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl MurmurClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ApiResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
            debug!("API error {}: {}", status, message);
            return Err(ClientError::Api { status, message });
        }
        Ok(resp.json().await?)
    }

    // -- Account --

    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<ApiResponse, ClientError> {
        let body = json!({ "username": username, "email": email, "password": password });
        self.send(self.request(Method::POST, "sign-up").json(&body)).await
    }

    pub async fn verify_code(
        &self,
        username: &str,
        code: &str,
    ) -> Result<ApiResponse, ClientError> {
        let body = json!({ "username": username, "code": code });
        self.send(self.request(Method::POST, "verify-code").json(&body)).await
    }

    /// Signs in and keeps the session token for later dashboard calls.
    pub async fn sign_in(
        &mut self,
        identifier: &str,
        password: &str,
    ) -> Result<SignInResponse, ClientError> {
        let body = json!({ "identifier": identifier, "password": password });
        let resp: SignInResponse = self
            .send(self.request(Method::POST, "sign-in").json(&body))
            .await?;
        self.token = Some(resp.token.clone());
        Ok(resp)
    }

    pub async fn check_username(&self, username: &str) -> Result<ApiResponse, ClientError> {
        let builder = self
            .request(Method::GET, "check-username-unique")
            .query(&[("username", username)]);
        self.send(builder).await
    }

    // -- Profile page --

    pub async fn send_message(
        &self,
        username: &str,
        content: &str,
    ) -> Result<ApiResponse, ClientError> {
        let body = json!({ "username": username, "content": content });
        self.send(self.request(Method::POST, "send-message").json(&body)).await
    }

    pub async fn suggest_messages(&self) -> Result<Vec<String>, ClientError> {
        let resp: SuggestMessagesResponse =
            self.send(self.request(Method::POST, "suggest-messages")).await?;
        Ok(split_suggestions(&resp.content))
    }

    pub async fn anon_status(&self, username: &str) -> Result<AnonShieldResponse, ClientError> {
        self.send(self.request(Method::GET, &format!("anon-status/{username}")))
            .await
    }

    // -- Dashboard --

    pub async fn messages(&self) -> Result<Vec<Message>, ClientError> {
        let resp: MessagesResponse = self.send(self.request(Method::GET, "get-messages")).await?;
        Ok(resp.messages)
    }

    pub async fn delete_message(&self, id: &str) -> Result<ApiResponse, ClientError> {
        self.send(self.request(Method::DELETE, &format!("delete-messages/{id}")))
            .await
    }

    pub async fn accepting_messages(&self) -> Result<bool, ClientError> {
        let resp: AcceptMessagesResponse =
            self.send(self.request(Method::GET, "accept-message")).await?;
        Ok(resp.is_accepting_messages)
    }

    pub async fn set_accepting_messages(&self, accept: bool) -> Result<bool, ClientError> {
        let body = json!({ "acceptMessages": accept });
        let resp: AcceptMessagesResponse = self
            .send(self.request(Method::POST, "accept-message").json(&body))
            .await?;
        Ok(resp.is_accepting_messages)
    }

    pub async fn anon_shield(&self) -> Result<bool, ClientError> {
        let resp: AnonShieldResponse = self.send(self.request(Method::GET, "anon-shield")).await?;
        Ok(resp.anon_shield)
    }

    pub async fn set_anon_shield(&self, enabled: bool) -> Result<bool, ClientError> {
        let body = json!({ "anonShield": enabled });
        let resp: AnonShieldResponse = self
            .send(self.request(Method::POST, "anon-shield").json(&body))
            .await?;
        Ok(resp.anon_shield)
    }

    // -- Moderation --

    pub async fn messages_check(&self, prompt: &str) -> Result<String, ClientError> {
        let body = json!({ "prompt": prompt });
        let resp: MessagesCheckResponse = self
            .send(self.request(Method::POST, "messages-check").json(&body))
            .await?;
        Ok(resp.response)
    }
}

/// Lets the moderation checker run against the server's pass-through.
impl TextGenerator for MurmurClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, GenAiError>> {
        Box::pin(async move {
            self.messages_check(prompt).await.map_err(|e| match e {
                ClientError::Api { status, message } => GenAiError::Status {
                    status: status.as_u16(),
                    body: message,
                },
                ClientError::Http(e) => GenAiError::Transport(e.to_string()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly() {
        let client = MurmurClient::new("http://localhost:3000/");
        assert_eq!(
            client.endpoint("send-message"),
            "http://localhost:3000/api/send-message"
        );
        assert_eq!(
            client.endpoint("/delete-messages/abc"),
            "http://localhost:3000/api/delete-messages/abc"
        );
    }

    #[test]
    fn token_is_kept() {
        let client = MurmurClient::new("http://localhost:3000").with_token("t0k");
        assert_eq!(client.token(), Some("t0k"));
    }
}
