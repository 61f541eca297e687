//! Room state: the registry that owns every active room, and the per-room
//! message store.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`registry`] | Single coordinating owner of all room state; join/leave, presence, message posting, reaction application |
//! | [`store`] | Per-room message history keyed by message id |

pub mod registry;
pub mod store;

pub use registry::RoomRegistry;
