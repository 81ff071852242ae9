use crate::{ClientCommand, ServerEvent};
use serde::Deserialize;

/// Wire encoding of outbound events for one connection.
///
/// Inbound frames pick their own decoder: text frames are JSON, binary
/// frames are bincode.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Codec {
    Json,
    Bincode,
}

impl std::default::Default for Codec {
    fn default() -> Self {
        Self::Json
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    Bincode(bincode::Error),
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "json: {}", err),
            Self::Bincode(err) => write!(f, "bincode: {}", err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        Self::Bincode(err)
    }
}

impl Codec {
    pub fn encode(&self, event: &ServerEvent) -> Result<Frame, CodecError> {
        Ok(match self {
            Self::Json => Frame::Text(serde_json::to_string(event)?),
            Self::Bincode => Frame::Binary(bincode::serialize(event)?),
        })
    }
}

pub fn decode_text(text: &str) -> Result<ClientCommand, CodecError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_binary(bin: &[u8]) -> Result<ClientCommand, CodecError> {
    Ok(bincode::deserialize(bin)?)
}
