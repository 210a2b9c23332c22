use anyhow::Context as _;
use bytes::Buf;
use hyper::body::Body;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

pin_project! {
    /// Reads every data frame of a body into a single buffer.
    pub struct DrainBodyFuture<B: Body> {
        #[pin]
        body: B,
        buf: Vec<u8>,
    }
}

impl<B> DrainBodyFuture<B>
where
    B: Body,
{
    /// `content_length` only sizes the initial buffer, the body may be longer.
    #[inline]
    #[must_use]
    pub fn new_trusted_length(body: B, content_length: usize) -> Self {
        Self {
            body,
            buf: Vec::with_capacity(content_length),
        }
    }
}

impl<B> Future for DrainBodyFuture<B>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    type Output = Result<Vec<u8>, anyhow::Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut slf = self.project();
        loop {
            let Some(next_res) = ready!(slf.body.as_mut().poll_frame(cx)) else {
                return Poll::Ready(Ok(std::mem::take(slf.buf)));
            };
            let frame = match next_res.context("Failed to poll next frame") {
                Ok(frame) => frame,
                Err(e) => return Poll::Ready(Err(e)),
            };
            // Trailer frames are skipped.
            if let Ok(mut data) = frame.into_data() {
                while data.has_remaining() {
                    let chunk = data.chunk();
                    let len = chunk.len();
                    slf.buf.extend_from_slice(chunk);
                    data.advance(len);
                }
            }
        }
    }
}
