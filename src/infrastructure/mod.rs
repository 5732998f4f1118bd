//! Infrastructure layer: durable storage backends and the event bus

pub mod events;
pub mod storage;
