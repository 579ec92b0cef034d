//! Authenticated client for a Swift-style object storage account.
//!
//! The [`Client`] authenticates once against the token endpoint when it is
//! built, then maps each method onto exactly one HTTP request below the
//! storage account URL:
//!
//! ```text
//! <storage_url>/<container>
//! <storage_url>/<container>/<path/to/object>
//! ```
//!
//! # Token lifetime
//!
//! The token is never refreshed. Once the service expires it, every call
//! returns an authentication status (usually 401) until a new client is built.

use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Body, Client as HttpClient, RequestBuilder};
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};
use url::Url;

use crate::config::Credentials;
use crate::error::{OfsError, Result};
use crate::response::{Download, Listing, Response};
use crate::uri;

/// Header carrying the auth token on every storage request.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
/// Header granting anonymous read access to a container.
pub const CONTAINER_READ_HEADER: &str = "X-Container-Read";
/// Header revoking anonymous read access.
pub const REMOVE_CONTAINER_READ_HEADER: &str = "X-Remove-Container-Read";
/// ACL value meaning "any referrer may read".
pub const PUBLIC_READ_ACL: &str = ".r:*";
/// Size of the buffer used when writing downloads to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 4096;

const APPLICATION_JSON: &str = "application/json";

// Identity API v2.0 token request/response bodies
#[derive(Serialize)]
struct AuthRequest<'a> {
    auth: AuthBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthBody<'a> {
    password_credentials: PasswordCredentials<'a>,
    tenant_id: &'a str,
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
}

#[derive(Deserialize)]
struct Token {
    id: String,
}

/// Object storage client bound to one account and one auth token.
///
/// Every operation blocks until its single HTTP exchange completes. Remote
/// error statuses are returned, not raised; only argument checks, transport
/// failures and local I/O produce an [`OfsError`].
pub struct Client {
    http: HttpClient,
    base: Url,
    token: SecretString,
    token_header: HeaderValue,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Authenticate and build a client with a default transport.
    ///
    /// The transport has no request timeout; use
    /// [`with_http_client`](Self::with_http_client) to set one.
    ///
    /// # Errors
    /// Returns [`OfsError::Auth`] if the token endpoint rejects the
    /// credentials or answers without `access.token.id`.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let http = HttpClient::builder().timeout(None::<Duration>).build()?;
        Self::with_http_client(credentials, http)
    }

    /// Authenticate and build a client on top of a caller-supplied transport.
    pub fn with_http_client(credentials: Credentials, http: HttpClient) -> Result<Self> {
        credentials.validate()?;
        let base = uri::base_url(&credentials.storage_url)?;
        let token = authenticate(&http, &credentials)?;

        let mut token_header = HeaderValue::from_str(token.expose_secret())
            .map_err(|_| OfsError::Auth("token is not a valid header value".to_string()))?;
        token_header.set_sensitive(true);

        info!(
            storage = %base,
            tenant = %credentials.tenant_id,
            "Object storage client authenticated"
        );

        Ok(Self {
            http,
            base,
            token,
            token_header,
        })
    }

    /// The auth token obtained at construction.
    pub fn token(&self) -> &SecretString {
        &self.token
    }

    /// Storage account URL all object URIs are resolved against.
    pub fn storage_url(&self) -> &Url {
        &self.base
    }

    /// Create a container (a top-level namespace).
    ///
    /// # Errors
    /// Returns [`OfsError::InvalidContainer`] if `container` contains `/`.
    #[instrument(skip(self))]
    pub fn create_container(&self, container: &str) -> Result<Response> {
        let url = uri::join(&self.base, uri::ensure_container(container)?)?;
        let response = self
            .authed(Method::PUT, url)
            .header(ACCEPT, APPLICATION_JSON)
            .send()?;
        finish(response)
    }

    /// Download `uri` into `output_dir`.
    ///
    /// On HTTP 200 the body is streamed into `output_dir/uri` (or
    /// `output_dir/<last segment of uri>` with `omit_folders`), creating
    /// parent directories as needed. On any other status nothing is written.
    #[instrument(skip(self, output_dir))]
    pub fn get_object(
        &self,
        uri: &str,
        output_dir: impl AsRef<Path>,
        omit_folders: bool,
    ) -> Result<Download> {
        let url = uri::join(&self.base, uri)?;
        let response = self
            .authed(Method::GET, url)
            .header(ACCEPT, APPLICATION_JSON)
            .send()?;

        if response.status() != StatusCode::OK {
            return Ok(Download::Failed(finish(response)?));
        }

        let head = Response::head(&response);
        let path = uri::download_path(output_dir.as_ref(), uri, omit_folders);
        let written = write_chunks(response, &path)?;
        debug!(path = %path.display(), bytes = written, "Object saved");

        Ok(Download::Saved {
            response: head,
            path,
        })
    }

    /// Delete an object, or an empty container when `uri` is a bare name.
    #[instrument(skip(self))]
    pub fn delete_object(&self, uri: &str) -> Result<Response> {
        let url = uri::join(&self.base, uri)?;
        let response = self
            .authed(Method::DELETE, url)
            .header(ACCEPT, APPLICATION_JSON)
            .send()?;
        finish(response)
    }

    /// Upload `local_file` into the remote directory `put_path`.
    ///
    /// The remote object is `put_path/<file name of local_file>`.
    ///
    /// # Errors
    /// Returns [`OfsError::InvalidPutPath`] if `put_path` contains `.`, and
    /// [`OfsError::Io`] if the local file cannot be opened.
    #[instrument(skip(self, local_file))]
    pub fn put_object(&self, local_file: impl AsRef<Path>, put_path: &str) -> Result<Response> {
        let put_path = uri::ensure_put_path(put_path)?;
        let local_file = local_file.as_ref();
        let name = uri::upload_name(local_file)?;
        let url = uri::join(&uri::join(&self.base, put_path)?, name)?;

        let file = File::open(local_file)?;
        let len = file.metadata()?.len();
        debug!(file = %local_file.display(), bytes = len, "Uploading object");

        let response = self
            .authed(Method::PUT, url)
            .header(ACCEPT, APPLICATION_JSON)
            .body(Body::sized(file, len))
            .send()?;
        finish(response)
    }

    /// List objects in `container` whose names start with `prefix`.
    ///
    /// # Errors
    /// Returns [`OfsError::InvalidContainer`] if `container` contains `/`,
    /// and [`OfsError::MalformedListing`] if a 200 body is not a JSON array
    /// of object records.
    #[instrument(skip(self))]
    pub fn list_objects(&self, container: &str, prefix: &str) -> Result<Listing> {
        let url = uri::join(&self.base, uri::ensure_container(container)?)?;
        let response = self
            .authed(Method::GET, url)
            .query(&[("format", "json"), ("prefix", prefix)])
            .send()?;
        let response = finish(response)?;

        if response.status != StatusCode::OK {
            return Ok(Listing::Failed(response));
        }
        Ok(Listing::parse(&response.body)?)
    }

    /// Make every object in `container` readable without a token.
    #[instrument(skip(self))]
    pub fn enable_public_access(&self, container: &str) -> Result<Response> {
        self.update_read_acl(container, CONTAINER_READ_HEADER)
    }

    /// Revoke anonymous read access granted by
    /// [`enable_public_access`](Self::enable_public_access).
    #[instrument(skip(self))]
    pub fn disable_public_access(&self, container: &str) -> Result<Response> {
        self.update_read_acl(container, REMOVE_CONTAINER_READ_HEADER)
    }

    fn update_read_acl(&self, container: &str, header: &'static str) -> Result<Response> {
        let url = uri::join(&self.base, uri::ensure_container(container)?)?;
        let response = self
            .authed(Method::POST, url)
            .header(ACCEPT, APPLICATION_JSON)
            .header(header, PUBLIC_READ_ACL)
            .send()?;
        finish(response)
    }

    fn authed(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "Sending request");
        self.http
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, self.token_header.clone())
    }
}

/// Exchange password credentials for a token.
fn authenticate(http: &HttpClient, credentials: &Credentials) -> Result<SecretString> {
    let request = AuthRequest {
        auth: AuthBody {
            password_credentials: PasswordCredentials {
                username: &credentials.username,
                password: credentials.password.expose_secret(),
            },
            tenant_id: &credentials.tenant_id,
        },
    };

    debug!(url = %credentials.token_url, user = %credentials.username, "Requesting token");

    let response = http
        .post(&credentials.token_url)
        .header(ACCEPT, APPLICATION_JSON)
        .json(&request)
        .send()?;
    let status = response.status();
    let body = response.bytes()?;

    if !status.is_success() {
        return Err(OfsError::Auth(format!(
            "{status}: {}",
            String::from_utf8_lossy(&body)
        )));
    }

    let payload: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| OfsError::Auth(format!("malformed token response: {e}")))?;
    if payload.access.token.id.is_empty() {
        return Err(OfsError::Auth("token response carried an empty token".to_string()));
    }

    Ok(SecretString::from(payload.access.token.id))
}

fn finish(response: reqwest::blocking::Response) -> Result<Response> {
    let response = Response::read(response)?;
    debug!(status = %response.status, "Received response");
    Ok(response)
}

/// Stream `reader` into `path`, one chunk at a time.
///
/// The bytes go to a temporary file beside `path` that replaces it only once
/// the whole body has been read; on error `path` is left untouched.
fn write_chunks(mut reader: impl Read, path: &Path) -> io::Result<u64> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = NamedTempFile::new_in(parent)?;
    let mut chunk = [0u8; DOWNLOAD_CHUNK_SIZE];
    let mut written = 0u64;
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        staged.write_all(&chunk[..n])?;
        written += n as u64;
    }
    staged.flush()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(written)
}
