//! Latest decoded value per sub-package and robot message type
//!
//! The decode loop is the single writer. A whole frame is applied inside
//! one `watch::Sender::send_modify`, so readers going through the channel
//! never observe a frame half applied.

use crate::message::{RobotMessage, RobotMessageType};
use crate::record::DecodedRecord;
use crate::state::{
    AdditionalInfo, CartesianInfo, ConfigurationData, ForceModeData, JointData, KinematicsInfo,
    MasterboardData, RobotModeData, SingularityInfo, StatePackage, SubPackageType, ToolCommInfo,
    ToolData, ToolModeInfo,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::watch;

macro_rules! package_accessor {
    ($(#[$meta:meta])* $name:ident => $variant:ident) => {
        $(#[$meta])*
        pub fn $name(&self) -> Option<&$variant> {
            match self.packages.get(&SubPackageType::$variant) {
                Some(StatePackage::$variant(data)) => Some(data),
                _ => None,
            }
        }
    };
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StateSnapshot {
    packages: HashMap<SubPackageType, StatePackage>,
    messages: HashMap<RobotMessageType, RobotMessage>,
    /// Frames applied so far
    pub sequence: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StateSnapshot {
    /// Fold one frame's records in arrival order, last write wins per type
    pub fn apply(&mut self, records: &[DecodedRecord]) {
        for record in records {
            match record {
                DecodedRecord::State(package) => {
                    self.packages.insert(package.kind(), package.clone());
                }
                DecodedRecord::Message(message) => {
                    self.messages.insert(message.message_type(), message.clone());
                }
            }
        }
        self.sequence += 1;
        self.updated_at = Some(Utc::now());
    }

    pub fn package(&self, kind: SubPackageType) -> Option<&StatePackage> {
        self.packages.get(&kind)
    }

    pub fn message(&self, kind: RobotMessageType) -> Option<&RobotMessage> {
        self.messages.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.messages.is_empty()
    }

    package_accessor!(robot_mode => RobotModeData);
    package_accessor!(
        /// Joint positions, speeds and motor feedback
        joints => JointData
    );
    package_accessor!(tool => ToolData);
    package_accessor!(masterboard => MasterboardData);
    package_accessor!(cartesian => CartesianInfo);
    package_accessor!(kinematics => KinematicsInfo);
    package_accessor!(configuration => ConfigurationData);
    package_accessor!(force_mode => ForceModeData);
    package_accessor!(additional_info => AdditionalInfo);
    package_accessor!(tool_comm => ToolCommInfo);
    package_accessor!(tool_mode => ToolModeInfo);
    package_accessor!(singularity => SingularityInfo);
}

/// Write side of the shared snapshot
#[derive(Debug)]
pub struct SnapshotPublisher {
    sender: watch::Sender<StateSnapshot>,
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(StateSnapshot::default());
        Self { sender }
    }

    /// Apply one frame. Frames without records leave the snapshot untouched.
    pub fn publish(&self, records: &[DecodedRecord]) {
        if records.is_empty() {
            return;
        }
        self.sender.send_modify(|snapshot| snapshot.apply(records));
    }

    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.sender.subscribe()
    }

    pub fn latest(&self) -> StateSnapshot {
        self.sender.borrow().clone()
    }
}
