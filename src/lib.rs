//! UR Primary - decoder for the Universal Robots primary interface
//!
//! The controller pushes a continuous stream of length-prefixed binary
//! messages on its primary port. This library reassembles those frames,
//! decodes robot state sub-packages and robot messages into typed
//! records, and keeps a snapshot of the latest value of each.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ur_primary::{Config, PrimarySubscriber};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_from_path("config/robot.yaml")?;
//!     let mut subscriber = PrimarySubscriber::spawn(config.robot).await?;
//!
//!     while let Some(snapshot) = subscriber.next_snapshot().await {
//!         if let Some(mode) = snapshot.robot_mode() {
//!             println!("Robot mode: {}", mode.robot_mode);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **FrameDecoder**: splits the byte stream into whole frames
//! - **decode_frame**: dispatches a frame on its message type
//! - **decode_robot_state**: walks the sub-packages of a state frame
//! - **decode_robot_message**: decodes popup, keyed and other messages
//! - **PrimaryStream**: async frame and record stream over any reader
//! - **SnapshotPublisher**: latest value per sub-package, shared over a watch channel
//! - **PrimarySubscriber**: background reader with reconnect
//! - **DashboardClient**: text commands on the dashboard port

pub mod client;
pub mod config;
pub mod cursor;
pub mod dashboard;
pub mod error;
pub mod frame;
pub mod json_output;
pub mod message;
pub mod modes;
pub mod record;
pub mod snapshot;
pub mod state;
pub mod stream;

// High-level exports for easy usage
pub use client::{connect, PrimarySubscriber};
pub use config::{Config, ConnectionConfig, PortConfig, RobotConfig};
pub use dashboard::DashboardClient;
pub use error::{DecodeError, FramingError, PrimaryError, Result};
pub use record::{decode_frame, DecodedFrame, DecodedRecord};
pub use snapshot::{SnapshotPublisher, StateSnapshot};
pub use stream::{PrimaryStream, StreamState, StreamStats};

// Decoder exports for advanced usage
pub use cursor::{FieldCursor, FieldWriter};
pub use frame::{decode_one, Frame, FrameDecoder, MessageType};
pub use message::{
    decode_robot_message, KeyedMessage, PopupMessage, RobotMessage, RobotMessageBody,
    RobotMessageType,
};
pub use modes::{
    ControlMode, JointMode, MessageSource, RequestValueType, RobotMode, SafetyMode, ToolMode,
};
pub use state::{decode_robot_state, RobotStateFrame, StatePackage, SubPackageType};
