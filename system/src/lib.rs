pub extern crate bincode;
pub extern crate serde;
pub extern crate serde_json;

mod codec;
mod lifecycle;
mod message;
mod registry;
mod relay;
mod types;

pub use codec::*;
pub use lifecycle::*;
pub use message::*;
pub use registry::*;
pub use relay::*;
pub use types::*;
