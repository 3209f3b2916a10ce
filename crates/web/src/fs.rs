//! Static file serving.
//!
//! [`StaticFiles`] is registered by [`crate::RouterGroup::static_files`] under
//! a `*filepath` wildcard and serves the file the wildcard names below its root
//! directory. Directories are never listed.

use crate::context::{Context, INTERNAL_SERVER_ERROR_BODY};
use crate::handler::{Handler, Next};
use async_trait::async_trait;
use http::StatusCode;
use mime::Mime;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error};

pub const FILE_NOT_FOUND_BODY: &str = "file not found";
pub const ACCESS_FORBIDDEN_BODY: &str = "access forbidden";

/// Serves the files of a directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Name of the path parameter holding the requested file.
    pub const PARAM: &'static str = "filepath";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request file path to a path below the root directory.
    ///
    /// Returns `None` when the file path tries to leave the root directory.
    pub fn resolve(&self, file_path: &str) -> Option<PathBuf> {
        let mut resolved = self.root.clone();

        for component in Path::new(file_path).components() {
            match component {
                Component::Normal(segment) => resolved.push(segment),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        Some(resolved)
    }
}

#[async_trait]
impl Handler for StaticFiles {
    async fn call(&self, ctx: &mut Context, _next: Next<'_>) {
        let Some(path) = self.resolve(ctx.param(Self::PARAM).unwrap_or_default()) else {
            ctx.string(StatusCode::NOT_FOUND, FILE_NOT_FOUND_BODY);
            return;
        };

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!(cause = %e, path = %path.display(), "static file not found");
                ctx.string(StatusCode::NOT_FOUND, FILE_NOT_FOUND_BODY);
                return;
            }
        };

        if metadata.is_dir() {
            ctx.string(StatusCode::FORBIDDEN, ACCESS_FORBIDDEN_BODY);
            return;
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                ctx.set_content_type(&content_type(&path));
                ctx.status(StatusCode::OK);
                ctx.write(&bytes);
            }
            Err(e) => {
                error!(cause = %e, path = %path.display(), "read static file error");
                ctx.string(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_BODY);
            }
        }
    }
}

/// Guesses the content type of a file from its extension.
pub fn content_type(path: &Path) -> Mime {
    let extension = path.extension().and_then(|extension| extension.to_str()).map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html" | "htm") => mime::TEXT_HTML_UTF_8,
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js" | "mjs") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("json") => mime::APPLICATION_JSON,
        Some("txt") => mime::TEXT_PLAIN_UTF_8,
        Some("csv") => mime::TEXT_CSV_UTF_8,
        Some("xml") => mime::TEXT_XML,
        Some("png") => mime::IMAGE_PNG,
        Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
        Some("gif") => mime::IMAGE_GIF,
        Some("bmp") => mime::IMAGE_BMP,
        Some("svg") => mime::IMAGE_SVG,
        Some("pdf") => mime::APPLICATION_PDF,
        Some("woff") => mime::FONT_WOFF,
        Some("woff2") => mime::FONT_WOFF2,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}
