//! # parlor-server
//!
//! Axum HTTP + WebSocket server for the Parlor chat relay.
//!
//! Clients connect to `GET /ws/{room}/{username}`; everything after the
//! upgrade is JSON text frames in both directions. The server relays
//! messages and emoji reactions to every connection in the room, keeps a
//! per-room message history for the lifetime of the room, and exposes
//! `/health` and `/metrics` alongside.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`config`] | Environment-driven server configuration |
//! | [`metrics`] | Prometheus recorder and metric name constants |
//! | [`rooms`] | Room registry and per-room message store |
//! | [`server`] | Router, endpoints, startup |
//! | [`websocket`] | Connection lifecycle, session dispatch, broadcast fan-out |

#![deny(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod rooms;
pub mod server;
pub mod websocket;

pub use config::ServerConfig;
pub use rooms::RoomRegistry;
pub use server::{AppState, ServerHandle, build_router, start};
