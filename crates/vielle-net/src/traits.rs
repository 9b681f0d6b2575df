use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use url::Url;

use crate::{
    error::NetResult,
    types::{Headers, RangeSpec},
};

/// Boxed stream of body chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, crate::NetError>> + Send>>;

/// HTTP operations needed by the fetch and API layers. The seam for test
/// doubles.
#[async_trait]
pub trait Net: Send + Sync {
    /// Fetch an entire body.
    async fn get_bytes(&self, url: Url, headers: Option<Headers>) -> NetResult<Bytes>;

    /// Open a streaming GET. No request timeout — downloads take arbitrary
    /// time.
    async fn stream(&self, url: Url, headers: Option<Headers>) -> NetResult<ByteStream>;

    /// Open a streaming ranged GET (`206 Partial Content` tolerated).
    async fn get_range(
        &self,
        url: Url,
        range: RangeSpec,
        headers: Option<Headers>,
    ) -> NetResult<ByteStream>;

    /// Issue a HEAD request and return the response headers.
    async fn head(&self, url: Url, headers: Option<Headers>) -> NetResult<Headers>;
}
