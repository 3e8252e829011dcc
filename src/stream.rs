//! Record stream over an async byte source
//!
//! Pulls bytes from the connection, reassembles frames and decodes them.
//! Reading is the only await point; decoding itself never blocks.

use crate::error::{PrimaryError, Result};
use crate::frame::{FrameDecoder, DEFAULT_MAX_FRAME_LEN};
use crate::record::{decode_frame, DecodedFrame, DecodedRecord};
use futures::Stream;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Default size of a single socket read
pub const DEFAULT_READ_SIZE: usize = 4096;

/// Connection lifecycle as seen by the decode loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Disconnected,
    Connecting,
    Streaming,
    /// A framing error made byte positions untrustworthy
    Faulted,
}

/// Running counters for one stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub bytes: u64,
    pub frames: u64,
    pub records: u64,
    pub decode_failures: u64,
    pub skipped_sub_packages: u64,
}

pub struct PrimaryStream<R> {
    reader: R,
    decoder: FrameDecoder,
    state: StreamState,
    shutdown: Option<watch::Receiver<bool>>,
    pending: VecDeque<DecodedRecord>,
    read_buf: Vec<u8>,
    stats: StreamStats,
}

impl<R: AsyncRead + Unpin> PrimaryStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            decoder: FrameDecoder::new(DEFAULT_MAX_FRAME_LEN),
            state: StreamState::Streaming,
            shutdown: None,
            pending: VecDeque::new(),
            read_buf: vec![0u8; DEFAULT_READ_SIZE],
            stats: StreamStats::default(),
        }
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.decoder = FrameDecoder::new(max_frame_len);
        self
    }

    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_buf = vec![0u8; read_size.max(1)];
        self
    }

    /// Stop when the channel turns `true` or its sender is dropped.
    /// A pending read is abandoned immediately.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Swap in a fresh connection, dropping any partial frame
    pub fn reconnect(&mut self, reader: R) {
        self.reader = reader;
        self.decoder.reset();
        self.pending.clear();
        self.state = StreamState::Streaming;
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn stop_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|shutdown| *shutdown.borrow())
    }

    fn end(&mut self, state: StreamState, err: PrimaryError) -> Option<Result<DecodedFrame>> {
        match state {
            StreamState::Faulted => error!("Stream faulted: {}", err),
            _ => info!("Stream ended: {}", err),
        }
        self.state = state;
        Some(Err(err))
    }

    /// Decode the next frame. Returns `None` once the stream has ended;
    /// the error that ended it is returned exactly once before that.
    pub async fn next_frame(&mut self) -> Option<Result<DecodedFrame>> {
        if self.state != StreamState::Streaming {
            return None;
        }

        loop {
            if self.stop_requested() {
                let err = PrimaryError::Connection("Stream stopped".to_string());
                return self.end(StreamState::Disconnected, err);
            }

            match self.decoder.next_frame() {
                Ok(Some(frame)) => match decode_frame(&frame) {
                    Ok(decoded) => {
                        self.stats.frames += 1;
                        self.stats.records += decoded.records.len() as u64;
                        self.stats.decode_failures += decoded.failures.len() as u64;
                        self.stats.skipped_sub_packages += decoded.skipped.len() as u64;
                        return Some(Ok(decoded));
                    }
                    Err(err) => return self.end(StreamState::Faulted, err.into()),
                },
                Ok(None) => {}
                Err(err) => return self.end(StreamState::Faulted, err.into()),
            }

            if let Err(err) = self.fill().await {
                let state = match err {
                    PrimaryError::Framing(_) => StreamState::Faulted,
                    _ => StreamState::Disconnected,
                };
                return self.end(state, err);
            }
        }
    }

    /// Next decoded record across frame boundaries
    pub async fn next_record(&mut self) -> Option<Result<DecodedRecord>> {
        loop {
            if let Some(record) = self.pending.pop_front() {
                return Some(Ok(record));
            }
            match self.next_frame().await? {
                Ok(frame) => self.pending.extend(frame.records),
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// All records as a `Stream`, ending after end-of-stream or a fatal error
    pub fn into_records(self) -> impl Stream<Item = Result<DecodedRecord>> {
        futures::stream::unfold(self, |mut stream| async move {
            let item = stream.next_record().await?;
            Some((item, stream))
        })
    }

    async fn fill(&mut self) -> Result<()> {
        let read = loop {
            let Some(shutdown) = self.shutdown.as_mut() else {
                break self.reader.read(&mut self.read_buf).await;
            };
            tokio::select! {
                result = self.reader.read(&mut self.read_buf) => break result,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        return Err(PrimaryError::Connection("Stream stopped".to_string()));
                    }
                }
            }
        };

        let count = read.map_err(|e| PrimaryError::Connection(format!("Read failed: {}", e)))?;
        if count == 0 {
            if let Some(err) = self.decoder.leftover() {
                return Err(err.into());
            }
            return Err(PrimaryError::Connection(
                "Connection closed by controller".to_string(),
            ));
        }
        self.stats.bytes += count as u64;
        self.decoder.extend(&self.read_buf[..count]);
        debug!("Read {} bytes, {} buffered", count, self.decoder.buffered());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FramingError;
    use crate::frame::{Frame, MessageType};
    use crate::state::{encode_sub_package, StatePackage};
    use futures::StreamExt;
    use tokio::io::AsyncWriteExt;

    fn state_frame(sub_packages: &[(u8, &[u8])]) -> Vec<u8> {
        let mut payload = Vec::new();
        for (code, body) in sub_packages {
            payload.extend(encode_sub_package(*code, body));
        }
        Frame::new(MessageType::RobotState, payload).encode()
    }

    #[tokio::test]
    async fn test_records_from_slice_then_end_of_stream() {
        let mut bytes = state_frame(&[(13, &[1, 0]), (12, &[0, 0, 1])]);
        bytes.extend(Frame::new(MessageType::ProgramState, vec![0; 8]).encode());
        bytes.extend(state_frame(&[(13, &[2, 0])]));

        let mut stream = PrimaryStream::new(&bytes[..]);
        let mut severities = Vec::new();
        let mut count = 0;
        let end = loop {
            match stream.next_record().await {
                Some(Ok(DecodedRecord::State(StatePackage::SingularityInfo(info)))) => {
                    severities.push(info.severity);
                    count += 1;
                }
                Some(Ok(_)) => count += 1,
                Some(Err(err)) => break err,
                None => panic!("stream ended without an error"),
            }
        };

        assert_eq!(count, 3);
        assert_eq!(severities, vec![1, 2]);
        assert!(matches!(end, PrimaryError::Connection(_)));
        assert_eq!(stream.state(), StreamState::Disconnected);
        assert!(stream.next_record().await.is_none());
        assert_eq!(stream.stats().frames, 3);
        assert_eq!(stream.stats().records, 3);
    }

    #[tokio::test]
    async fn test_partial_reads_are_reassembled() {
        let bytes = state_frame(&[(13, &[3, 1]), (99, &[0; 30])]);
        let (mut client, server) = tokio::io::duplex(64);

        let writer = tokio::spawn(async move {
            for chunk in bytes.chunks(3) {
                client.write_all(chunk).await.unwrap();
                tokio::task::yield_now().await;
            }
            client
        });

        let mut stream = PrimaryStream::new(server).with_read_size(4);
        let frame = stream.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.records.len(), 1);
        assert_eq!(frame.skipped, vec![99]);
        assert_eq!(stream.stats().skipped_sub_packages, 1);
        assert_eq!(stream.state(), StreamState::Streaming);

        drop(writer.await.unwrap());
        assert!(matches!(
            stream.next_frame().await,
            Some(Err(PrimaryError::Connection(_)))
        ));
    }

    #[tokio::test]
    async fn test_framing_error_faults_stream() {
        let mut bytes = state_frame(&[(13, &[1, 0])]);
        bytes.extend([0, 0, 0, 2, 16]);
        bytes.extend(state_frame(&[(13, &[1, 0])]));

        let mut stream = PrimaryStream::new(&bytes[..]);
        assert!(stream.next_frame().await.unwrap().is_ok());
        assert!(matches!(
            stream.next_frame().await,
            Some(Err(PrimaryError::Framing(_)))
        ));
        assert_eq!(stream.state(), StreamState::Faulted);
        assert!(stream.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_truncated_tail_faults_stream() {
        let mut bytes = state_frame(&[(13, &[1, 0])]);
        let second = state_frame(&[(13, &[2, 0])]);
        bytes.extend(&second[..9]);

        let mut stream = PrimaryStream::new(&bytes[..]);
        assert!(stream.next_frame().await.unwrap().is_ok());
        match stream.next_frame().await {
            Some(Err(PrimaryError::Framing(err))) => assert_eq!(
                err,
                FramingError::Truncated { needed: second.len(), available: 9 }
            ),
            other => panic!("expected truncated frame, got {:?}", other),
        }
        assert_eq!(stream.state(), StreamState::Faulted);
        assert!(stream.next_frame().await.is_none());
    }

    #[tokio::test]
    async fn test_partial_header_at_end_of_stream() {
        let bytes = [0u8, 0, 0];
        let mut stream = PrimaryStream::new(&bytes[..]);
        assert!(matches!(
            stream.next_frame().await,
            Some(Err(PrimaryError::Framing(FramingError::Truncated { needed: 5, available: 3 })))
        ));
        assert_eq!(stream.state(), StreamState::Faulted);
    }

    #[tokio::test]
    async fn test_decode_errors_do_not_end_stream() {
        let mut bytes = state_frame(&[(0, &[0; 10]), (13, &[1, 0])]);
        bytes.extend(state_frame(&[(13, &[4, 0])]));

        let mut stream = PrimaryStream::new(&bytes[..]);
        let first = stream.next_frame().await.unwrap().unwrap();
        assert_eq!(first.failures.len(), 1);
        assert_eq!(first.records.len(), 1);
        let second = stream.next_frame().await.unwrap().unwrap();
        assert_eq!(second.records.len(), 1);
        assert_eq!(stream.stats().decode_failures, 1);
    }

    #[tokio::test]
    async fn test_shutdown_unblocks_pending_read() {
        let (_client, server) = tokio::io::duplex(64);
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut stream = PrimaryStream::new(server).with_shutdown(stop_rx);

        let reader = tokio::spawn(async move {
            let result = stream.next_frame().await;
            (result, stream.state())
        });
        tokio::task::yield_now().await;
        stop_tx.send(true).unwrap();

        let (result, state) = reader.await.unwrap();
        assert!(matches!(result, Some(Err(PrimaryError::Connection(_)))));
        assert_eq!(state, StreamState::Disconnected);
    }

    #[tokio::test]
    async fn test_reconnect_resets_partial_frame() {
        let bytes = state_frame(&[(13, &[5, 0])]);
        let mut stream = PrimaryStream::new(&bytes[..7]);
        assert!(matches!(stream.next_frame().await, Some(Err(_))));

        stream.reconnect(&bytes[..]);
        let frame = stream.next_frame().await.unwrap().unwrap();
        assert_eq!(frame.records.len(), 1);
    }

    #[tokio::test]
    async fn test_into_records_stream() {
        let bytes = state_frame(&[(13, &[1, 0]), (8, &[1, 1, 0])]);
        let records: Vec<_> = PrimaryStream::new(&bytes[..]).into_records().collect().await;
        assert_eq!(records.len(), 3);
        assert!(records[0].is_ok());
        assert!(records[1].is_ok());
        assert!(records[2].is_err());
    }
}
