//! Decoded request shapes (§4.8, §6).
//!
//! The wire-level request-serialization format is explicitly out of scope
//! (§1): "the core treats it as opaque message objects with typed
//! accessors." [`RequestBody`] is that accessor contract — a concrete codec
//! crate (outside this workspace) decodes whatever structured
//! property-list/object encoding it receives and hands this crate an
//! implementor of the trait; `Dispatcher` never parses bytes itself.

use thrum_core::{AddAction, AudioBusId, NodeId};

/// A single construction argument forwarded to [`thrum_core::SynthDef::construct`]
/// after being assembled into an options blob (§3 "options size").
///
/// Kept as a small closed set of primitive kinds rather than an arbitrary
/// value type: a `Synth` request's `args` tuple (§6) is numeric/string
/// parameters for the plugin's `configure` step, not general data.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigArg {
    /// A floating-point argument.
    Float(f32),
    /// An integer argument.
    Int(i64),
    /// A string argument.
    Text(String),
}

/// Typed, already-decoded access to one request body (§6 "Recognized object
/// bodies"). A concrete request message implements this directly; there is
/// no intermediate parsing step inside the dispatcher.
pub trait RequestBody {
    /// One of `"Group"`, `"Synth"`, `"Free"`, `"MapPort"`, `"SetControl"`.
    fn body_type(&self) -> &str;

    /// The `target`/`node` property: the node this request is relative to
    /// or acts on, decoded from the wire id the caller was previously
    /// handed by a `NodeCreated` response (§6).
    fn target(&self) -> Option<NodeId> {
        None
    }

    /// The `addAction` property (`Group`/`Synth` bodies).
    fn add_action(&self) -> Option<AddAction> {
        None
    }

    /// The `plugin` property (`Synth` bodies): a synth-definition URI.
    fn plugin_uri(&self) -> Option<&str> {
        None
    }

    /// The `args` property (`Synth` bodies): construction arguments
    /// forwarded to the plugin's `configure` step.
    fn args(&self) -> &[ConfigArg] {
        &[]
    }

    /// The `index` property (`MapPort`/`SetControl` bodies): a port index.
    fn port_index(&self) -> Option<u32> {
        None
    }

    /// The `bus` property (`MapPort` bodies).
    fn bus(&self) -> Option<AudioBusId> {
        None
    }

    /// The `value` property (`SetControl` bodies).
    fn value(&self) -> Option<f32> {
        None
    }
}

/// A single `patch:Insert` request: `Insert { subject, body }` (§4.8).
/// `subject` has no effect on dispatch; it is carried through to the
/// response unchanged so a caller can correlate a reply with the request
/// that produced it without a server-side request-id table.
pub struct Insert<B> {
    /// Caller-chosen correlation token, echoed back unexamined.
    pub subject: u64,
    /// The decoded body.
    pub body: B,
}

/// Root of a request: one `Insert`, or a sequence of them (§4.8 "a sequence
/// of timestamped such operations"). Per-operation timestamps are a
/// scheduling concept the core does not implement (no cancellation/timeout
/// support, §5) — operations in a sequence are simply applied in order, as
/// if each were submitted individually.
pub enum Patch<B> {
    /// A single operation.
    One(Insert<B>),
    /// An ordered sequence of operations, applied one after another.
    Many(Vec<Insert<B>>),
}

/// Pack a synth's construction arguments into the opaque options blob
/// [`thrum_core::SynthDef::construct`] receives.
///
/// Encoding: each argument is tagged (1 byte) then little-endian encoded —
/// `0x00` + 4 bytes for `Float`, `0x01` + 8 bytes for `Int`, `0x02` + 4-byte
/// length + UTF-8 bytes for `Text`. A plugin's `configure`/`construct`
/// decodes the same way; this crate and `thrum-builtin` agree on the
/// format, and a third-party plugin need only document its own.
#[must_use]
pub fn encode_args(args: &[ConfigArg]) -> Box<[u8]> {
    let mut out = Vec::new();
    for arg in args {
        match arg {
            ConfigArg::Float(v) => {
                out.push(0x00);
                out.extend_from_slice(&v.to_le_bytes());
            }
            ConfigArg::Int(v) => {
                out.push(0x01);
                out.extend_from_slice(&v.to_le_bytes());
            }
            ConfigArg::Text(s) => {
                out.push(0x02);
                out.extend_from_slice(&(s.len() as u32).to_le_bytes());
                out.extend_from_slice(s.as_bytes());
            }
        }
    }
    out.into_boxed_slice()
}

/// Decode an options blob produced by [`encode_args`] back into a list of
/// arguments. `thrum-builtin`'s synth definitions use this to parse
/// `construct`'s `options` parameter.
#[must_use]
pub fn decode_args(mut bytes: &[u8]) -> Vec<ConfigArg> {
    let mut out = Vec::new();
    while let Some(&tag) = bytes.first() {
        bytes = &bytes[1..];
        match tag {
            0x00 if bytes.len() >= 4 => {
                let (head, rest) = bytes.split_at(4);
                out.push(ConfigArg::Float(f32::from_le_bytes(head.try_into().unwrap())));
                bytes = rest;
            }
            0x01 if bytes.len() >= 8 => {
                let (head, rest) = bytes.split_at(8);
                out.push(ConfigArg::Int(i64::from_le_bytes(head.try_into().unwrap())));
                bytes = rest;
            }
            0x02 if bytes.len() >= 4 => {
                let (len_bytes, rest) = bytes.split_at(4);
                let len = u32::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
                if rest.len() < len {
                    break;
                }
                let (text, rest) = rest.split_at(len);
                out.push(ConfigArg::Text(String::from_utf8_lossy(text).into_owned()));
                bytes = rest;
            }
            _ => break,
        }
    }
    out
}
