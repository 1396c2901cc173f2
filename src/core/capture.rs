//! Byte-level interception of request and response bodies
//!
//! The wrappers in this module sit between the server and the handler. They
//! forward every byte unchanged and keep a copy when the exchange is allowed
//! to capture that side.

use crate::utils::error::{ObserverError, Result};
use actix_web::http::StatusCode;
use actix_web::http::header::HeaderMap;
use bytes::{Bytes, BytesMut};
use futures::Stream;
use pin_project_lite::pin_project;
use std::cell::RefCell;
use std::io::{self, Read};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

/// Shared capture sink for a body that is moved into the handler
pub type CaptureBuffer = Rc<RefCell<BytesMut>>;

pub fn new_capture_buffer() -> CaptureBuffer {
    Rc::new(RefCell::new(BytesMut::new()))
}

pin_project! {
    /// Request body reader that records what the handler consumes.
    ///
    /// Implements [`std::io::Read`] for blocking bodies and [`Stream`] for
    /// chunked async payloads.
    pub struct CaptureReader<R> {
        #[pin]
        inner: R,
        buffer: Option<CaptureBuffer>,
    }
}

impl<R> CaptureReader<R> {
    /// Wrap `inner`; bytes are recorded only when `buffer` is set
    pub fn new(inner: R, buffer: Option<CaptureBuffer>) -> Self {
        Self { inner, buffer }
    }
}

impl<R: Read> Read for CaptureReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            if let Some(buffer) = &self.buffer {
                buffer.borrow_mut().extend_from_slice(&buf[..n]);
            }
        }
        Ok(n)
    }
}

impl<R, E> Stream for CaptureReader<R>
where
    R: Stream<Item = std::result::Result<Bytes, E>>,
{
    type Item = std::result::Result<Bytes, E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = this.inner.poll_next(cx);
        if let Poll::Ready(Some(Ok(chunk))) = &item {
            if let Some(buffer) = this.buffer.as_ref() {
                buffer.borrow_mut().extend_from_slice(chunk);
            }
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Response-side capture state shared by every writer adapter
#[derive(Debug)]
pub struct ResponseCapture {
    status: StatusCode,
    content_length: usize,
    body: Option<BytesMut>,
}

impl ResponseCapture {
    /// Start with status 200; `with_body` decides whether bytes are kept
    pub fn new(with_body: bool) -> Self {
        Self {
            status: StatusCode::OK,
            content_length: 0,
            body: with_body.then(BytesMut::new),
        }
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Count `written` bytes and keep them if body capture is enabled
    pub fn record(&mut self, written: &[u8]) {
        self.content_length += written.len();
        if let Some(body) = self.body.as_mut() {
            body.extend_from_slice(written);
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn content_length(&self) -> usize {
        self.content_length
    }

    /// Captured body, empty when capture was disabled
    pub fn into_body(self) -> Bytes {
        self.body.map(BytesMut::freeze).unwrap_or_default()
    }
}

/// Connection handed over by [`ResponseWriter::hijack`]
pub trait HijackedIo: io::Read + io::Write + Send {}

impl<T: io::Read + io::Write + Send> HijackedIo for T {}

/// Minimal response-writing surface a server exposes to handlers.
///
/// `flush`, `hijack` and `push` are optional capabilities; the defaults
/// report that the writer does not support them.
pub trait ResponseWriter {
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn write_header(&mut self, status: StatusCode);

    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn hijack(&mut self) -> Result<Box<dyn HijackedIo>> {
        Err(ObserverError::NotAHijacker(std::any::type_name::<Self>()))
    }

    fn push(&mut self, _target: &str) -> Result<()> {
        Err(ObserverError::PushNotSupported)
    }
}

impl<W: ResponseWriter + ?Sized> ResponseWriter for &mut W {
    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        (**self).write_header(status)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        (**self).write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn hijack(&mut self) -> Result<Box<dyn HijackedIo>> {
        (**self).hijack()
    }

    fn push(&mut self, target: &str) -> Result<()> {
        (**self).push(target)
    }
}

/// Response writer that records status, length and body of what it forwards
pub struct CaptureWriter<W> {
    inner: W,
    capture: ResponseCapture,
}

impl<W: ResponseWriter> CaptureWriter<W> {
    pub fn new(inner: W, capture: ResponseCapture) -> Self {
        Self { inner, capture }
    }

    pub fn into_parts(self) -> (W, ResponseCapture) {
        (self.inner, self.capture)
    }
}

impl<W: ResponseWriter> ResponseWriter for CaptureWriter<W> {
    fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    fn write_header(&mut self, status: StatusCode) {
        self.inner.write_header(status);
        self.capture.set_status(status);
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(data)?;
        self.capture.record(&data[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn hijack(&mut self) -> Result<Box<dyn HijackedIo>> {
        self.inner.hijack()
    }

    fn push(&mut self, target: &str) -> Result<()> {
        self.inner.push(target)
    }
}

/// In-memory response writer, useful for embedding and for tests
#[derive(Debug, Default)]
pub struct BufferedResponse {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: BytesMut,
    flushes: usize,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status sent by the handler, 200 if none was set explicitly
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn flushes(&self) -> usize {
        self.flushes
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
