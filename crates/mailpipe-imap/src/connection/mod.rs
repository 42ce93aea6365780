//! Connection management: transport streams, framing and the type-state
//! client.

mod client;
mod config;
mod framed;
mod idle;
mod stream;

pub use client::{Authenticated, Client, NotAuthenticated, RawMessage, Selected};
pub use config::{Config, Security};
pub use framed::FramedStream;
pub use idle::{IdleEvent, IdleHandle};
pub use stream::{ImapStream, connect};
