//! Exchange of the static API key for a short-lived bearer token.

use serde::Deserialize;

use crate::error::TokenError;

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Bearer token returned by the IAM endpoint. Expiry is enforced server
/// side only.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Source of bearer tokens for the generation endpoint. Called once per
/// pipeline stage; implementations must not cache.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<Token, TokenError>;
}

#[derive(Deserialize)]
struct IamTokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Posts the API key to the IAM token endpoint with the API-key grant type.
pub struct IamTokenProvider {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl IamTokenProvider {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            client,
        }
    }

    async fn exchange(&self) -> Result<Token, TokenError> {
        let form = [
            ("grant_type", APIKEY_GRANT_TYPE),
            ("apikey", self.api_key.as_str()),
        ];
        let resp = self.client.post(&self.url).form(&form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TokenError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: IamTokenResponse = resp.json().await?;
        match parsed.access_token {
            Some(tok) if !tok.is_empty() => Ok(Token(tok)),
            _ => Err(TokenError::MissingToken),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for IamTokenProvider {
    async fn access_token(&self) -> Result<Token, TokenError> {
        let result = self.exchange().await;
        if let Err(err) = &result {
            tracing::warn!(url = %self.url, error = %err, "error getting access token");
        }
        result
    }
}
