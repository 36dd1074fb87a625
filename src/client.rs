//! This module provides a client that downloads the calendar feed

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use url::Url;

use crate::error::BoxError;
use crate::settings::Settings;
use crate::traits::FeedSource;


/// A feed source that downloads its content from an HTTP(S) server
#[derive(Clone, Debug)]
pub struct Client {
    url: Url,
    username: Option<String>,
    password: Option<String>,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>>(url: S) -> Result<Self, BoxError> {
        let url = Url::parse(url.as_ref())?;

        Ok(Self {
            url,
            username: None,
            password: None,
            http: reqwest::Client::new(),
        })
    }

    /// Use HTTP basic authentication
    pub fn with_credentials<T: ToString, U: ToString>(mut self, username: T, password: Option<U>) -> Self {
        self.username = Some(username.to_string());
        self.password = password.map(|p| p.to_string());
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let client = Self {
            url: settings.feed_url.clone(),
            username: None,
            password: None,
            http: reqwest::Client::new(),
        };
        match &settings.feed_username {
            None => client,
            Some(username) => client.with_credentials(username, settings.feed_password.as_ref()),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl FeedSource for Client {
    async fn fetch(&self) -> Result<String, BoxError> {
        let mut request = self.http
            .get(self.url.clone())
            .header(ACCEPT, "text/calendar");
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        let res = request.send().await?;
        if res.status().is_success() == false {
            return Err(format!("Feed server {} answered HTTP {}", self.url, res.status()).into());
        }
        let text = res.text().await?;
        log::debug!("Downloaded {} bytes from {}", text.len(), self.url);
        Ok(text)
    }
}
