//! Per request state shared by every handler of a chain.
//!
//! [`Context`] carries the inbound request, the path parameters resolved by the
//! router and the response being built. It is exclusively owned by the task
//! serving the request and turned into an [`http::Response`] once the chain
//! returns.

use crate::body::{RequestBody, ResponseBody};
use crate::error::{BodyError, BoxError};
use bytes::{Bytes, BytesMut};
use http::header::{AsHeaderName, ACCEPT, CONTENT_TYPE, ORIGIN};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri, Version};
use http_body::Body as HttpBody;
use mime::Mime;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{error, warn};

/// Body written when a response can not be produced.
pub const INTERNAL_SERVER_ERROR_BODY: &str = "500 Internal Server Error";

/// Represents path parameters extracted from the URL path of an HTTP request.
///
/// For the pattern `/users/:id` and the path `/users/42`, `id` maps to `42`.
/// A trailing `*path` maps `path` to the rest of the request path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: HashMap<String, String>,
}

impl PathParams {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Gets the value of a path parameter by its name
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.inner.get(key.as_ref()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), value.into());
    }
}

/// Request data and response sink of one request.
pub struct Context {
    request_header: http::request::Parts,
    request_body: RequestBody,
    path: String,
    path_params: PathParams,

    status: StatusCode,
    written: bool,
    response_headers: HeaderMap,
    response_body: BytesMut,
}

impl Context {
    pub fn new<B>(request: Request<B>) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (request_header, body) = request.into_parts();
        let path = percent_decode_str(request_header.uri.path()).decode_utf8_lossy().into_owned();
        Self {
            request_header,
            request_body: RequestBody::new(body),
            path,
            path_params: PathParams::empty(),
            status: StatusCode::OK,
            written: false,
            response_headers: HeaderMap::new(),
            response_body: BytesMut::new(),
        }
    }

    /// Method of the request.
    pub fn method(&self) -> &Method {
        &self.request_header.method
    }

    /// Request URI as received, still percent-encoded.
    pub fn uri(&self) -> &Uri {
        &self.request_header.uri
    }

    /// The percent-decoded path of the request URI, without the query string.
    ///
    /// Routing, group middleware and path parameters all work on this path.
    /// Invalid UTF-8 sequences are replaced with `U+FFFD`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// HTTP version of the request.
    pub fn version(&self) -> Version {
        self.request_header.version
    }

    /// All request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.request_header.headers
    }

    /// Returns a request header value, `None` when absent or not visible ASCII.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.request_header.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `Origin` request header.
    pub fn origin(&self) -> Option<&str> {
        self.header(ORIGIN)
    }

    /// The parsed `Content-Type` of the request.
    pub fn content_type(&self) -> Option<Mime> {
        self.header(CONTENT_TYPE).and_then(|value| value.parse().ok())
    }

    /// Returns true when the client sent a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type().is_some_and(|content_type| content_type.essence_str() == mime::APPLICATION_JSON.essence_str())
    }

    /// Returns true when the client accepts a JSON response.
    pub fn expect_json(&self) -> bool {
        self.header(ACCEPT).is_some_and(|accept| accept.contains(mime::APPLICATION_JSON.essence_str()))
    }

    /// Value of the path parameter `name`, already percent-decoded.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Path parameters of the matched route.
    pub fn params(&self) -> &PathParams {
        &self.path_params
    }

    pub(crate) fn set_params(&mut self, params: PathParams) {
        self.path_params = params;
    }

    /// Returns the first value of the url query field `key`.
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.uri().query()?;
        find_pair(query, key)
    }

    /// Like [`Context::query`], falling back to `default`.
    pub fn query_or(&self, key: &str, default: &str) -> String {
        self.query(key).unwrap_or_else(|| default.to_owned())
    }

    /// Returns the first value of the form field `key`.
    ///
    /// Fields of a url-encoded POST, PUT or PATCH body take precedence over the
    /// url query. A body that can not be read counts as empty.
    pub async fn form_value(&mut self, key: &str) -> Option<String> {
        if self.has_form_body() {
            match self.body_bytes().await {
                Ok(bytes) => {
                    let value = std::str::from_utf8(&bytes).ok().and_then(|form| find_pair(form, key));
                    if value.is_some() {
                        return value;
                    }
                }
                Err(e) => warn!(cause = %e, "read form body error"),
            }
        }

        self.query(key)
    }

    pub async fn form_value_or(&mut self, key: &str, default: &str) -> String {
        self.form_value(key).await.unwrap_or_else(|| default.to_owned())
    }

    /// Reads the whole request body.
    ///
    /// The body is buffered on first read and every later call returns the same
    /// bytes.
    pub async fn body_bytes(&mut self) -> Result<Bytes, BodyError> {
        self.request_body.bytes().await
    }

    pub(crate) fn has_form_body(&self) -> bool {
        let accepts_body = [Method::POST, Method::PUT, Method::PATCH].contains(self.method());
        accepts_body
            && self
                .content_type()
                .is_some_and(|content_type| content_type.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str())
    }

    /// Sets the response status code.
    ///
    /// The status can be written once. The first body write without an explicit
    /// status writes `200 OK`.
    pub fn status(&mut self, status: StatusCode) {
        if self.written {
            warn!(current = %self.status, ignored = %status, "response status already written");
            return;
        }

        self.status = status;
        self.written = true;
    }

    /// Sets a response header, replacing previous values of the same name.
    ///
    /// Headers must be set before the status is written, later changes are
    /// ignored.
    pub fn set_header<K, V>(&mut self, name: K, value: V) -> Result<(), http::Error>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let name = <HeaderName as TryFrom<K>>::try_from(name).map_err(Into::into)?;
        let value = <HeaderValue as TryFrom<V>>::try_from(value).map_err(Into::into)?;
        self.insert_header(name, value);
        Ok(())
    }

    /// Sets the `Content-Type` response header.
    pub fn set_content_type(&mut self, content_type: &Mime) {
        match HeaderValue::from_str(content_type.as_ref()) {
            Ok(value) => self.insert_header(CONTENT_TYPE, value),
            Err(e) => warn!(cause = %e, content_type = %content_type, "invalid content type"),
        }
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.written {
            warn!(header = %name, "response status already written, header ignored");
            return;
        }

        self.response_headers.insert(name, value);
    }

    /// Appends bytes to the response body.
    pub fn write(&mut self, bytes: &[u8]) {
        self.written = true;
        self.response_body.extend_from_slice(bytes);
    }

    /// Writes a plain text response.
    pub fn string(&mut self, status: StatusCode, text: impl AsRef<str>) {
        self.set_content_type(&mime::TEXT_PLAIN_UTF_8);
        self.status(status);
        self.write(text.as_ref().as_bytes());
    }

    /// Writes a html response.
    pub fn html(&mut self, status: StatusCode, html: impl AsRef<str>) {
        self.set_content_type(&mime::TEXT_HTML_UTF_8);
        self.status(status);
        self.write(html.as_ref().as_bytes());
    }

    /// Writes a JSON response.
    ///
    /// The value is serialized before anything is written. When serialization
    /// fails, whatever the response held is dropped and a plain text `500`
    /// is written instead.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                self.set_content_type(&mime::APPLICATION_JSON);
                self.status(status);
                self.write(&bytes);
            }
            Err(e) => {
                error!(cause = %e, "encode json response error");
                self.reset_response();
                self.string(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY);
            }
        }
    }

    /// Writes a binary response.
    pub fn data(&mut self, status: StatusCode, bytes: impl AsRef<[u8]>) {
        self.set_content_type(&mime::APPLICATION_OCTET_STREAM);
        self.status(status);
        self.write(bytes.as_ref());
    }

    /// Drops the response built so far, so an error response can replace it.
    pub(crate) fn reset_response(&mut self) {
        self.status = StatusCode::OK;
        self.written = false;
        self.response_headers.clear();
        self.response_body.clear();
    }

    /// Returns true once the status line has been written.
    pub fn is_written(&self) -> bool {
        self.written
    }

    /// Status of the response, `200` until one is written.
    pub fn response_status(&self) -> StatusCode {
        self.status
    }

    /// Headers of the response.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Bytes written to the response so far.
    pub fn response_body(&self) -> &[u8] {
        &self.response_body
    }

    /// Consumes the context into the response sent to the client.
    pub fn into_response(self) -> Response<ResponseBody> {
        let mut response = Response::new(ResponseBody::once(self.response_body.freeze()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.response_headers;
        response
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("method", self.method())
            .field("uri", self.uri())
            .field("params", &self.path_params)
            .field("status", &self.status)
            .field("written", &self.written)
            .finish_non_exhaustive()
    }
}

fn find_pair(encoded: &str, key: &str) -> Option<String> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(encoded)
        .ok()?
        .into_iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value)
}
