//! Data models for the message service

mod message;
mod page;

pub use message::*;
pub use page::*;
