//! pokelist - PokeAPI catalog browser built on tui-dispatch
//!
//! The library exposes the state machine, the catalog client and the
//! components so they can be exercised from tests.

pub mod action;
pub mod api;
pub mod components;
pub mod config;
pub mod effect;
pub mod error;
pub mod logging;
pub mod reducer;
pub mod sprite;
pub mod state;
pub mod tasks;
