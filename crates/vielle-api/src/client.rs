use base64::{engine::general_purpose::STANDARD, Engine};
use url::Url;
use vielle_core::Item;
use vielle_net::{Headers, HttpClient};

use crate::{
    error::{ApiError, ApiResult},
    models::BrowseEntry,
};

/// Basic-auth credentials for the server.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Client for the music server's browse and serve endpoints.
#[derive(Clone, Debug)]
pub struct ServerApi {
    http: HttpClient,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl ServerApi {
    pub fn new(http: HttpClient, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            credentials: None,
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn auth_headers(&self) -> Option<Headers> {
        let credentials = self.credentials.as_ref()?;
        let token = STANDARD.encode(format!(
            "{}:{}",
            credentials.username, credentials.password
        ));
        let mut headers = Headers::new();
        headers.insert("Authorization", format!("Basic {token}"));
        Some(headers)
    }

    fn endpoint(&self, kind: &str, path: &str) -> ApiResult<Url> {
        // Collection paths may contain slashes; joining relative to the
        // endpoint root keeps them intact while percent-encoding the rest.
        self.base_url
            .join(&format!("api/{kind}/"))
            .and_then(|base| base.join(path))
            .map_err(|_| ApiError::InvalidUrl(path.to_string()))
    }

    /// Ordered listing of the collection at `path` (empty = root).
    pub async fn browse(&self, path: &str) -> ApiResult<Vec<BrowseEntry>> {
        let url = self.endpoint("browse", path)?;
        let body = self.http.get_bytes(url, self.auth_headers()).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// All songs under `path`, depth-first.
    pub async fn flatten(&self, path: &str) -> ApiResult<Vec<Item>> {
        let url = self.endpoint("flatten", path)?;
        let body = self.http.get_bytes(url, self.auth_headers()).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Address the item's audio is served from.
    pub fn audio_url(&self, item: &Item) -> ApiResult<Url> {
        self.endpoint("serve", item.path())
    }
}
