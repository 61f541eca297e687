//! # parlor-core
//!
//! Foundation types for the Parlor chat relay.
//!
//! This crate provides the shared vocabulary the server is built on:
//!
//! - **Branded IDs**: [`ids::ConnId`], [`ids::MessageId`] as newtypes
//! - **Wire events**: [`events::ClientEvent`] (inbound) and
//!   [`events::ServerEvent`] (outbound), internally tagged JSON
//! - **Messages**: [`message::StoredMessage`] with its creation timestamp
//! - **Reactions**: [`reactions::ReactionSet`] — emoji → usernames, with
//!   idempotent add and key-pruning remove
//!
//! ## Crate Position
//!
//! Foundation crate. No I/O, no async; depended on by `parlor-server`.

#![deny(unsafe_code)]

pub mod events;
pub mod ids;
pub mod message;
pub mod reactions;
