//! Dispatch replies (§4.8, §6).

use thrum_core::{EngineError, NodeId};

/// Outcome of one dispatched [`crate::request::Insert`], delivered to the
/// caller-supplied `respond` callback after the RT side has acknowledged
/// the command (§4.8 "Responses are delivered on the NRT thread after the
/// RT has acked the command").
#[derive(Debug, Clone)]
pub struct Reply {
    /// Correlation token copied from the originating [`crate::request::Insert::subject`].
    pub subject: u64,
    /// The assigned node id, for `Group`/`Synth` bodies that succeeded.
    pub node_id: Option<NodeId>,
    /// The failure, if any (§7). `None` means success.
    pub error: Option<EngineError>,
}

impl Reply {
    /// Whether this reply represents success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
