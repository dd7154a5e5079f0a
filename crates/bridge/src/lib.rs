//! Child-process bridge for ShogiLLM
//!
//! Neither shogi rules nor model inference live in this workspace. Both are
//! run as helper processes that speak a tiny JSON-lines protocol: one JSON
//! object per request line on the helper's stdin, one JSON reply line on its
//! stdout.
//!
//! - [`JsonLineProcess`]: the transport (spawn, request/reply, timeout, respawn)
//! - [`BridgeRules`]: a [`usi_core::RulesEngine`] backed by a rules helper

mod process;
mod rules;

pub use process::*;
pub use rules::*;
