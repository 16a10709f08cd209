//! API layer: WebSocket endpoint and connection registry.

pub mod connections;
pub mod websocket;

pub use connections::ConnectionManager;
