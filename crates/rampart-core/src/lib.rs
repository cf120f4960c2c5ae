//! Core types and definitions for the RAMPART combat simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, content templates,
//! and constants. It has no dependency on the ECS or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod content;
pub mod enums;
pub mod events;
pub mod player;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
