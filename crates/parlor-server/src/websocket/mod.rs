//! WebSocket transport layer.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`connection`] | Per-connection lifecycle: outbound queue handle, reader/writer tasks, teardown |
//! | [`session`] | Sequential dispatch of inbound frames through the schema gate to the registry |
//! | [`broadcast`] | Serialize-once fan-out and dead-connection pruning |

pub mod broadcast;
pub mod connection;
pub mod session;
