use crate::{ConnectionId, RoomName};
use serde::{Deserialize, Serialize};

/// One line segment of a pen stroke.
///
/// Coordinates are fractions of the sender's canvas width and height, so
/// canvases of different pixel sizes draw the same picture. They are
/// forwarded exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeSegment {
    pub room: RoomName,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub color: String,
}

/// Inbound message from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientCommand {
    JoinRoom(RoomName),
    LeaveRoom(RoomName),
    Drawing(StrokeSegment),
}

/// Outbound message to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServerEvent {
    Drawing(StrokeSegment),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeliveryError {
    /// The receiver's outbound buffer is full.
    Overflow,
    /// The receiver's channel is gone.
    Closed,
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overflow => write!(f, "outbound buffer overflow"),
            Self::Closed => write!(f, "outbound channel closed"),
        }
    }
}

/// Per-connection outbound event channel.
pub trait Outbound {
    /// Hands `event` to the transport of `to` without waiting for it.
    fn deliver(&mut self, to: &ConnectionId, event: ServerEvent) -> Result<(), DeliveryError>;
}
