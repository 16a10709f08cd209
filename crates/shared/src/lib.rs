//! Nightshade Protocol - Shared types for engine and client communication
//!
//! This crate contains all types shared between the engine (backend) and
//! game clients:
//! - WebSocket message types (ClientMessage, ServerMessage)
//! - Snapshot DTOs for reconnect resync
//! - Error classification codes
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, uuid, serde_json, and thiserror
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Closed tagged unions** - Payloads are validated at the boundary,
//!    never trusted as loose JSON

pub mod messages;
pub mod responses;

// =============================================================================
// WebSocket Message Types
// =============================================================================
pub use messages::{ClientMessage, ServerMessage};

// =============================================================================
// Snapshot / Error Types
// =============================================================================
pub use responses::{ErrorCode, GameSnapshot, PlayerInfo};
