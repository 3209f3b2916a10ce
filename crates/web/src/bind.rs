//! Binding request data into typed values.
//!
//! The binders decode with serde, so the target type decides which fields are
//! required and how each value is parsed:
//!
//! ```no_run
//! # use http::StatusCode;
//! # use nano_web::Context;
//! # use serde::Deserialize;
//! #[derive(Deserialize)]
//! struct Product {
//!     name: String,
//!     stock: u32,
//! }
//!
//! async fn create(ctx: &mut Context) {
//!     match ctx.bind::<Product>().await {
//!         Ok(product) => ctx.string(StatusCode::CREATED, product.name),
//!         Err(e) => e.respond(ctx),
//!     }
//! }
//! ```

use crate::context::Context;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Failure to bind request data, carrying the status to answer with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct BindingError {
    status: StatusCode,
    message: String,
}

impl BindingError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn unknown_content_type() -> Self {
        Self::bad_request("unknown content type of request body")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Writes the error as the response, as JSON when the client expects JSON.
    pub fn respond(&self, ctx: &mut Context) {
        if ctx.expect_json() {
            ctx.json(self.status, &json!({ "message": self.message }));
        } else {
            ctx.string(self.status, &self.message);
        }
    }
}

impl Context {
    /// Binds the request into `T`, picking the binder from the request.
    ///
    /// POST, PUT and PATCH requests and requests carrying a content type are
    /// bound from their body: url-encoded forms with [`Context::bind_form`],
    /// JSON with [`Context::bind_json`]. Any other content type fails with
    /// `400`. The remaining requests bind their url query.
    pub async fn bind<T: DeserializeOwned>(&mut self) -> Result<T, BindingError> {
        let content_type = self.header(http::header::CONTENT_TYPE).unwrap_or_default().to_owned();
        let has_body = [Method::POST, Method::PUT, Method::PATCH].contains(self.method());

        if !has_body && content_type.is_empty() {
            return self.bind_form().await;
        }

        if content_type.contains(mime::APPLICATION_WWW_FORM_URLENCODED.essence_str()) {
            self.bind_form().await
        } else if self.is_json() {
            self.bind_json().await
        } else {
            debug!(%content_type, "unsupported content type for binding");
            Err(BindingError::unknown_content_type())
        }
    }

    /// Binds a JSON request body into `T`.
    pub async fn bind_json<T: DeserializeOwned>(&mut self) -> Result<T, BindingError> {
        let bytes = self.body_bytes().await.map_err(|e| BindingError::bad_request(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| BindingError::bad_request(e.to_string()))
    }

    /// Binds the fields of a url-encoded body and of the url query into `T`.
    ///
    /// A field present in both is taken from the body.
    pub async fn bind_form<T: DeserializeOwned>(&mut self) -> Result<T, BindingError> {
        let mut pairs = Vec::new();

        if self.has_form_body() {
            let bytes = self.body_bytes().await.map_err(|e| BindingError::bad_request(e.to_string()))?;
            pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(&bytes)
                .map_err(|e| BindingError::bad_request(e.to_string()))?;
        }

        let query = self.uri().query().unwrap_or_default();
        pairs.extend(
            serde_urlencoded::from_str::<Vec<(String, String)>>(query).map_err(|e| BindingError::bad_request(e.to_string()))?,
        );

        // first value of every field wins
        let mut fields: Vec<(String, String)> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            if !fields.iter().any(|(existing, _)| *existing == key) {
                fields.push((key, value));
            }
        }

        let encoded = serde_urlencoded::to_string(&fields).map_err(|e| BindingError::bad_request(e.to_string()))?;
        serde_urlencoded::from_str(&encoded).map_err(|e| BindingError::bad_request(e.to_string()))
    }

    /// Binds the url query into `T`.
    pub fn bind_query<T: DeserializeOwned>(&self) -> Result<T, BindingError> {
        let query = self.uri().query().unwrap_or_default();
        serde_qs::from_str(query).map_err(|e| BindingError::bad_request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::BindingError;
    use crate::Context;
    use bytes::Bytes;
    use http::header::{ACCEPT, CONTENT_TYPE};
    use http::{Method, Request, StatusCode};
    use http_body_util::Full;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Product {
        name: String,
        stock: u32,
        #[serde(default)]
        tags: Option<String>,
    }

    fn request(method: Method, uri: &str, content_type: Option<&str>, body: &'static str) -> Context {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        Context::new(builder.body(Full::new(Bytes::from_static(body.as_bytes()))).unwrap())
    }

    fn product(name: &str, stock: u32) -> Product {
        Product { name: name.to_owned(), stock, tags: None }
    }

    #[tokio::test]
    async fn test_bind_dispatch() {
        let cases = [
            (Method::GET, "/?name=pen&stock=3", None, "", product("pen", 3)),
            (Method::POST, "/", Some("application/json"), r#"{"name":"pen","stock":3}"#, product("pen", 3)),
            (Method::PUT, "/", Some("application/json; charset=utf-8"), r#"{"name":"pen","stock":3}"#, product("pen", 3)),
            (Method::POST, "/", Some("application/x-www-form-urlencoded"), "name=pen&stock=3", product("pen", 3)),
            (Method::PATCH, "/?stock=5", Some("application/x-www-form-urlencoded"), "name=pen", product("pen", 5)),
        ];

        for (method, uri, content_type, body, expected) in cases {
            let mut ctx = request(method, uri, content_type, body);
            assert_eq!(ctx.bind::<Product>().await, Ok(expected), "{uri} {content_type:?}");
        }
    }

    #[tokio::test]
    async fn test_bind_unknown_content_type() {
        for content_type in [None, Some("multipart/form-data; boundary=xyz"), Some("text/plain")] {
            let mut ctx = request(Method::POST, "/", content_type, "name=pen&stock=3");

            let error = ctx.bind::<Product>().await.unwrap_err();
            assert_eq!(error.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error.message(), "unknown content type of request body");
        }
    }

    #[tokio::test]
    async fn test_bind_json_errors() {
        for body in ["", "{", r#"{"name":"pen"}"#, r#"{"name":"pen","stock":-1}"#] {
            let mut ctx = request(Method::POST, "/", Some("application/json"), body);

            let error = ctx.bind_json::<Product>().await.unwrap_err();
            assert_eq!(error.status(), StatusCode::BAD_REQUEST, "{body}");
        }
    }

    #[tokio::test]
    async fn test_bind_form_prefers_body() {
        let mut ctx = request(
            Method::POST,
            "/?name=query&stock=1&tags=new",
            Some("application/x-www-form-urlencoded"),
            "name=body&name=again&stock=2",
        );

        let bound = ctx.bind_form::<Product>().await.unwrap();

        assert_eq!(bound, Product { name: "body".into(), stock: 2, tags: Some("new".into()) });
    }

    #[tokio::test]
    async fn test_bind_form_invalid_value() {
        let mut ctx = request(Method::GET, "/?name=pen&stock=many", None, "");

        let error = ctx.bind_form::<Product>().await.unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bind_query() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Filter {
            page: u32,
            name: Option<String>,
        }

        let ctx = request(Method::GET, "/?page=2&name=foo", None, "");
        assert_eq!(ctx.bind_query::<Filter>(), Ok(Filter { page: 2, name: Some("foo".into()) }));

        let ctx = request(Method::GET, "/", None, "");
        assert!(ctx.bind_query::<Filter>().is_err());
    }

    #[test]
    fn test_respond() {
        let error = BindingError::new(StatusCode::UNPROCESSABLE_ENTITY, "name is required");

        let mut ctx = request(Method::GET, "/", None, "");
        error.respond(&mut ctx);
        assert_eq!(ctx.response_status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ctx.response_body(), b"name is required");

        let mut ctx = Context::new(
            Request::builder().uri("/").header(ACCEPT, "application/json").body(Full::new(Bytes::new())).unwrap(),
        );
        error.respond(&mut ctx);
        assert_eq!(ctx.response_body(), br#"{"message":"name is required"}"#);
    }
}
