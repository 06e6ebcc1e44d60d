// SPDX-License-Identifier: MIT OR Apache-2.0
//! Byte sources feeding a session.

use async_trait::async_trait;
use genui_error::GenUiError;
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// A pull-based source of raw chunks.
///
/// A session calls [`open`](ByteSource::open) once, then
/// [`next_chunk`](ByteSource::next_chunk) until it returns `Ok(None)`, an
/// error, or the session stops. Only one read is ever outstanding.
#[async_trait]
pub trait ByteSource: Send {
    /// Establish the underlying channel.
    async fn open(&mut self) -> Result<(), GenUiError> {
        Ok(())
    }

    /// Next chunk, or `None` at end of stream.
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, GenUiError>;
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    async fn open(&mut self) -> Result<(), GenUiError> {
        (**self).open().await
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, GenUiError> {
        (**self).next_chunk().await
    }
}

/// Replays a fixed list of chunks, optionally ending in an error.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    chunks: VecDeque<Vec<u8>>,
    open_error: Option<GenUiError>,
    end_error: Option<GenUiError>,
}

impl ScriptedSource {
    /// Source yielding `chunks` in order.
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Source yielding `body` cut into `chunk_size`-byte pieces.
    pub fn chunked(body: &[u8], chunk_size: usize) -> Self {
        Self::new(body.chunks(chunk_size.max(1)).map(<[u8]>::to_vec))
    }

    /// Fail [`open`](ByteSource::open) with `err`.
    pub fn fail_open(mut self, err: GenUiError) -> Self {
        self.open_error = Some(err);
        self
    }

    /// Return `err` once every chunk has been delivered.
    pub fn fail_after(mut self, err: GenUiError) -> Self {
        self.end_error = Some(err);
        self
    }

    /// Chunks not yet delivered.
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }
}

#[async_trait]
impl ByteSource for ScriptedSource {
    async fn open(&mut self) -> Result<(), GenUiError> {
        match self.open_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, GenUiError> {
        if let Some(chunk) = self.chunks.pop_front() {
            return Ok(Some(chunk));
        }
        match self.end_error.take() {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}

/// Chunks pushed from elsewhere through an mpsc channel.
///
/// The stream ends when every sender is dropped.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<Result<Vec<u8>, GenUiError>>,
}

impl ChannelSource {
    /// Create a source and the sender that feeds it.
    pub fn new(buffer: usize) -> (mpsc::Sender<Result<Vec<u8>, GenUiError>>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self { rx })
    }
}

#[async_trait]
impl ByteSource for ChannelSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, GenUiError> {
        self.rx.recv().await.transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genui_error::ErrorCode;

    #[tokio::test]
    async fn scripted_yields_then_ends() {
        let mut s = ScriptedSource::new(["a", "b"]);
        s.open().await.unwrap();
        assert_eq!(s.next_chunk().await.unwrap(), Some(b"a".to_vec()));
        assert_eq!(s.remaining(), 1);
        assert_eq!(s.next_chunk().await.unwrap(), Some(b"b".to_vec()));
        assert_eq!(s.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn scripted_error_after_chunks() {
        let mut s = ScriptedSource::new(["a"])
            .fail_after(GenUiError::new(ErrorCode::TransportRead, "reset"));
        assert!(s.next_chunk().await.unwrap().is_some());
        let err = s.next_chunk().await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TransportRead);
    }

    #[tokio::test]
    async fn chunked_splits_body() {
        let mut s = ScriptedSource::chunked(b"abcde", 2);
        assert_eq!(s.remaining(), 3);
        assert_eq!(s.next_chunk().await.unwrap(), Some(b"ab".to_vec()));
    }

    #[tokio::test]
    async fn channel_ends_when_sender_dropped() {
        let (tx, mut s) = ChannelSource::new(4);
        tx.send(Ok(b"x".to_vec())).await.unwrap();
        drop(tx);
        assert_eq!(s.next_chunk().await.unwrap(), Some(b"x".to_vec()));
        assert_eq!(s.next_chunk().await.unwrap(), None);
    }

    #[tokio::test]
    async fn boxed_source_delegates() {
        let mut s: Box<dyn ByteSource> = Box::new(ScriptedSource::new(["z"]));
        s.open().await.unwrap();
        assert_eq!(s.next_chunk().await.unwrap(), Some(b"z".to_vec()));
    }
}
