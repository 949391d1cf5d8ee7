use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::domain::email::Message;
use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The remote temp-mail service.
#[async_trait]
pub trait MailApi: Send + Sync {
    /// Asks the server for a fresh disposable address.
    async fn issue_address(&self) -> Result<String, ClientError>;

    /// Lists messages for `address`, in the order the server returns them.
    async fn list_messages(&self, address: &str) -> Result<Vec<Message>, ClientError>;
}

#[derive(Debug, Deserialize)]
struct IssuedAddress {
    email: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Option<Vec<Message>>,
}

pub struct HttpMailApi {
    http: reqwest::Client,
    base: Url,
}

impl HttpMailApi {
    pub fn new(base: Url) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(anyhow!("{base} cannot be used as a base URL"));
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("rs_tempmail/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, base })
    }

    /// `{base}/tempmail` or `{base}/tempmail/{address}`, the address percent-encoded.
    fn endpoint(&self, address: Option<&str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("tempmail");
            if let Some(address) = address {
                segments.push(address);
            }
        }
        url
    }
}

#[async_trait]
impl MailApi for HttpMailApi {
    async fn issue_address(&self) -> Result<String, ClientError> {
        let url = self.endpoint(None);
        log::debug!("GET {url}");

        let issued: IssuedAddress = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError::Generation(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Generation(e.to_string()))?;

        let email = issued.email.trim();
        if email.is_empty() {
            return Err(ClientError::Generation(
                "server returned an empty address".into(),
            ));
        }
        Ok(email.to_string())
    }

    async fn list_messages(&self, address: &str) -> Result<Vec<Message>, ClientError> {
        let url = self.endpoint(Some(address));
        log::debug!("GET {url}");

        let list: MessageList = self
            .http
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ClientError::Fetch(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::Fetch(e.to_string()))?;

        Ok(list.messages.unwrap_or_default())
    }
}
