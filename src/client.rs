//! TCP connection to the primary interface and a background subscriber
//!
//! `connect` dials the controller and hands back a `PrimaryStream`.
//! `PrimarySubscriber` owns that stream on a tokio task, keeps the shared
//! snapshot current and forwards robot messages to the caller.

use crate::config::RobotConfig;
use crate::error::{PrimaryError, Result};
use crate::message::RobotMessage;
use crate::record::DecodedRecord;
use crate::snapshot::{SnapshotPublisher, StateSnapshot};
use crate::stream::{PrimaryStream, StreamState};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// Robot messages buffered for the caller before new ones are dropped
pub const MESSAGE_BUFFER: usize = 64;

async fn dial(config: &RobotConfig) -> Result<TcpStream> {
    let addr = config.primary_addr();
    let timeout = config.connection.timeout();

    let socket = tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            PrimaryError::Connection(format!("Timed out connecting to {} after {:?}", addr, timeout))
        })?
        .map_err(|e| PrimaryError::Connection(format!("Failed to connect to {}: {}", addr, e)))?;
    socket.set_nodelay(true)?;

    info!("Connected to primary interface at {}", addr);
    Ok(socket)
}

/// Dial the primary interface and wrap the socket in a record stream
pub async fn connect(config: &RobotConfig) -> Result<PrimaryStream<TcpStream>> {
    let socket = dial(config).await?;
    Ok(PrimaryStream::new(socket)
        .with_max_frame_len(config.connection.max_frame_len())
        .with_read_size(config.connection.read_buffer()))
}

/// Background reader keeping a `StateSnapshot` current
pub struct PrimarySubscriber {
    snapshot: watch::Receiver<StateSnapshot>,
    state: watch::Receiver<StreamState>,
    messages: mpsc::Receiver<RobotMessage>,
    shutdown: watch::Sender<bool>,
    task_handle: tokio::task::JoinHandle<()>,
}

impl PrimarySubscriber {
    /// Connect and start streaming. The first connection must succeed;
    /// later losses are retried per `connection.retry_attempts`.
    pub async fn spawn(config: RobotConfig) -> Result<Self> {
        let (state_sender, state) = watch::channel(StreamState::Connecting);
        let (shutdown, shutdown_receiver) = watch::channel(false);

        let stream = connect(&config)
            .await?
            .with_shutdown(shutdown_receiver.clone());

        let publisher = SnapshotPublisher::new();
        let snapshot = publisher.subscribe();
        let (message_sender, messages) = mpsc::channel(MESSAGE_BUFFER);

        let task = SubscriberTask {
            config,
            publisher,
            state: state_sender,
            messages: message_sender,
            shutdown: shutdown_receiver,
        };
        let task_handle = tokio::spawn(task.run(stream));

        Ok(Self {
            snapshot,
            state,
            messages,
            shutdown,
            task_handle,
        })
    }

    /// Latest snapshot (non-blocking)
    pub fn latest(&self) -> StateSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Wait for the next applied frame
    pub async fn next_snapshot(&mut self) -> Option<StateSnapshot> {
        self.snapshot.changed().await.ok()?;
        Some(self.snapshot.borrow_and_update().clone())
    }

    pub fn snapshot_receiver(&self) -> watch::Receiver<StateSnapshot> {
        self.snapshot.clone()
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    pub fn state_receiver(&self) -> watch::Receiver<StreamState> {
        self.state.clone()
    }

    /// Next robot message, `None` once the reader has stopped and the
    /// buffer is drained
    pub async fn next_message(&mut self) -> Option<RobotMessage> {
        self.messages.recv().await
    }

    /// Signal the reader and wait for it to finish
    pub async fn stop(mut self) {
        self.shutdown.send_replace(true);
        if let Err(e) = (&mut self.task_handle).await {
            debug!("Subscriber task ended abnormally: {}", e);
        }
    }
}

impl Drop for PrimarySubscriber {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
        self.task_handle.abort();
    }
}

struct SubscriberTask {
    config: RobotConfig,
    publisher: SnapshotPublisher,
    state: watch::Sender<StreamState>,
    messages: mpsc::Sender<RobotMessage>,
    shutdown: watch::Receiver<bool>,
}

impl SubscriberTask {
    async fn run(mut self, mut stream: PrimaryStream<TcpStream>) {
        loop {
            self.state.send_replace(StreamState::Streaming);

            while let Some(result) = stream.next_frame().await {
                match result {
                    Ok(frame) => self.forward(frame.records),
                    Err(e) => warn!("Primary stream ended: {}", e),
                }
            }

            let ended = stream.state();
            self.state.send_replace(ended);
            if ended == StreamState::Faulted || *self.shutdown.borrow() {
                break;
            }

            match self.reconnect().await {
                Some(socket) => stream.reconnect(socket),
                None => {
                    self.state.send_replace(StreamState::Disconnected);
                    break;
                }
            }
        }
        debug!("Subscriber task finished");
    }

    fn forward(&self, records: Vec<DecodedRecord>) {
        self.publisher.publish(&records);
        for record in records {
            if let DecodedRecord::Message(message) = record {
                if self.messages.try_send(message).is_err() {
                    debug!("Robot message dropped, receiver full or gone");
                }
            }
        }
    }

    async fn reconnect(&mut self) -> Option<TcpStream> {
        let attempts = self.config.connection.retry_attempts();
        let delay = self.config.connection.retry_delay();

        for attempt in 1..=attempts {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.shutdown.changed() => return None,
            }
            self.state.send_replace(StreamState::Connecting);
            match dial(&self.config).await {
                Ok(socket) => return Some(socket),
                Err(e) => warn!("Reconnect attempt {}/{} failed: {}", attempt, attempts, e),
            }
        }
        None
    }
}
