//! Syntactic navigation from tRPC-style client paths to router and
//! procedure declarations. No type checker: parsed syntax trees,
//! import following, and structural heuristics only.

pub mod cache;
pub mod classify;
pub mod cli;
pub mod client;
pub mod config;
pub mod imports;
pub mod locate;
pub mod model;
pub mod navigate;
pub mod parse;
pub mod structure;
