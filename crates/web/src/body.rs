use crate::error::{BodyError, BoxError};
use bytes::Bytes;
use http_body::Body as HttpBody;
use http_body::{Frame, SizeHint};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::BodyExt;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

/// The request body as seen by a [`crate::Context`].
///
/// The body starts as a stream and is buffered the first time it is read, so
/// every handler of the chain observes the same bytes.
pub(crate) enum RequestBody {
    Streaming(UnsyncBoxBody<Bytes, BoxError>),
    Buffered(Bytes),
}

impl RequestBody {
    pub(crate) fn new<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self::Streaming(UnsyncBoxBody::new(body.map_err(Into::into)))
    }

    pub(crate) async fn bytes(&mut self) -> Result<Bytes, BodyError> {
        match std::mem::replace(self, Self::Buffered(Bytes::new())) {
            Self::Buffered(bytes) => {
                *self = Self::Buffered(bytes.clone());
                Ok(bytes)
            }
            Self::Streaming(body) => {
                let bytes = body.collect().await.map_err(|source| BodyError::Read { source })?.to_bytes();
                *self = Self::Buffered(bytes.clone());
                Ok(bytes)
            }
        }
    }
}

/// The body of a response produced by an [`crate::Engine`].
#[derive(Debug)]
pub struct ResponseBody {
    inner: Option<Bytes>,
}

impl ResponseBody {
    pub fn empty() -> Self {
        Self { inner: None }
    }

    pub fn once(bytes: Bytes) -> Self {
        if bytes.is_empty() { Self::empty() } else { Self { inner: Some(bytes) } }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::once(bytes)
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        Self::once(Bytes::from(value))
    }
}

impl From<&'static str> for ResponseBody {
    fn from(value: &'static str) -> Self {
        Self::once(Bytes::from_static(value.as_bytes()))
    }
}

impl HttpBody for ResponseBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Poll::Ready(self.get_mut().inner.take().map(|bytes| Ok(Frame::data(bytes))))
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        match &self.inner {
            None => SizeHint::with_exact(0),
            Some(bytes) => SizeHint::with_exact(bytes.len() as u64),
        }
    }
}
