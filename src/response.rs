//! Results returned by client operations.

use std::borrow::Cow;
use std::path::PathBuf;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;

/// The outcome of one HTTP exchange: status, headers and body.
///
/// Returned as-is for every status code; callers decide what counts as failure.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Read the full body of a transport response.
    pub(crate) fn read(response: reqwest::blocking::Response) -> reqwest::Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Keep status and headers only; used when the body went elsewhere.
    pub(crate) fn head(response: &reqwest::blocking::Response) -> Self {
        Self {
            status: response.status(),
            headers: response.headers().clone(),
            body: Bytes::new(),
        }
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body decoded as UTF-8, with invalid sequences replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Metadata record from a container listing.
///
/// Only `name` is guaranteed; the rest depends on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectInfo {
    /// Object path within the container.
    pub name: String,
    /// Object size in bytes.
    #[serde(default)]
    pub bytes: Option<u64>,
    /// MD5 of the object content.
    #[serde(default)]
    pub hash: Option<String>,
    /// Last modification time as reported by the service.
    #[serde(default)]
    pub last_modified: Option<String>,
    /// MIME type of the object.
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Result of [`Client::list_objects`](crate::Client::list_objects).
#[derive(Debug, Clone)]
pub enum Listing {
    /// HTTP 200 with a well-formed JSON array.
    Objects(Vec<ObjectInfo>),
    /// Any other status, with the raw response for inspection.
    Failed(Response),
}

impl Listing {
    pub(crate) fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body).map(Listing::Objects)
    }

    /// The listed objects, or `None` if the request failed.
    pub fn objects(&self) -> Option<&[ObjectInfo]> {
        match self {
            Listing::Objects(objects) => Some(objects),
            Listing::Failed(_) => None,
        }
    }
}

/// Result of [`Client::get_object`](crate::Client::get_object).
#[derive(Debug, Clone)]
pub enum Download {
    /// HTTP 200: the body was written to `path`.
    ///
    /// `response.body` is empty since the content was streamed to disk.
    Saved { response: Response, path: PathBuf },
    /// Any other status; nothing was written locally.
    Failed(Response),
}

impl Download {
    /// Status and headers of the exchange, whichever way it went.
    pub fn response(&self) -> &Response {
        match self {
            Download::Saved { response, .. } => response,
            Download::Failed(response) => response,
        }
    }

    /// Where the object was written, if it was.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Download::Saved { path, .. } => Some(path),
            Download::Failed(_) => None,
        }
    }
}
