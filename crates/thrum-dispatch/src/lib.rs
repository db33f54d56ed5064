//! Request dispatcher: translates decoded requests into engine commands and
//! runs the NRT worker loop that drains RT-originated jobs (§4.8, §4.9).
//!
//! This crate is the NRT-side counterpart to `thrum-core::Environment`'s RT
//! side: it owns nothing the RT thread touches directly, only the sender
//! half of the command queue and a handle to the plugin registry used to
//! resolve `Synth` requests before they ever reach the RT thread.

mod dispatcher;
mod error;
mod host_impl;
mod request;
mod response;
mod worker;

pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use host_impl::DispatchHost;
pub use request::{decode_args, encode_args, ConfigArg, Insert, Patch, RequestBody};
pub use response::Reply;
pub use worker::NrtWorker;
