//! An abstraction layer for the decision-maker behind the agent.
//!
//! This crate establishes an unified protocol for the agent to talk to
//! a language model: the transcript messages it reads, the tool
//! definitions it may choose from, and the tool-call requests it emits.
//! The agent can switch between model services without modifying the
//! core codebase.
//!
//! Types in this crate don't define any behavior, instead they are the
//! constraints that the implementors should adhere to.

#![deny(missing_docs)]

mod error;
mod message;
mod provider;
mod request;
mod response;

pub use error::*;
pub use message::*;
pub use provider::*;
pub use request::*;
pub use response::*;
