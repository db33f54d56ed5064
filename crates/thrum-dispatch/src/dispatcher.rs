//! Translates decoded requests into [`RtCommand`]s (§4.8).

use std::sync::{Arc, Mutex};

use thrum_core::{AddAction, EngineResult, RtCommand, RtCommandSender, RtJob};
use thrum_registry::PluginRegistry;

use crate::error::DispatchError;
use crate::request::{encode_args, RequestBody};
use crate::response::Reply;

/// NRT-side entry point for incoming requests. Holds the sender half of the
/// command queue and a handle to the shared plugin registry, which it needs
/// to resolve a `Synth` request's `plugin` URI into an `Arc<dyn SynthDef>`
/// before handing the RT thread anything to construct (§4.6 "Synth
/// construction" happens with the definition already resolved, so the RT
/// thread never touches the registry itself).
pub struct Dispatcher {
    commands: RtCommandSender,
    registry: Arc<Mutex<PluginRegistry>>,
}

impl Dispatcher {
    /// Build a dispatcher around the command sender returned by
    /// [`thrum_core::Environment::new`] and the registry that resolves
    /// plugin URIs.
    #[must_use]
    pub fn new(commands: RtCommandSender, registry: Arc<Mutex<PluginRegistry>>) -> Self {
        Self { commands, registry }
    }

    /// Push a raw RT job onto the command queue this dispatcher owns,
    /// bypassing request decoding.
    ///
    /// The command queue has exactly one producer (§4.5), so anything else
    /// that needs to enqueue `RtCommand::Job`s — a [`Host`](thrum_core::Host)
    /// implementation honoring `schedule_rt`, say — has to go through
    /// whichever side already holds the sender rather than minting its own.
    ///
    /// # Errors
    /// Returns `EngineError::QueueFull` if the RT thread hasn't drained
    /// enough of the queue to make room.
    pub fn schedule_rt(&mut self, job: RtJob) -> EngineResult<()> {
        self.commands.try_send(RtCommand::Job(job))
    }

    /// Submit one request body, invoking `respond` once the RT thread has
    /// acknowledged it.
    ///
    /// # Errors
    /// Returns `DispatchError` if the body is missing a required property,
    /// names an unknown body type, or the command could not be resolved
    /// against the registry (`UnknownPlugin`) before ever reaching the RT
    /// queue. A full RT queue instead reaches the caller through `respond`
    /// as `EngineError::QueueFull`, matching how every other RT-side
    /// rejection is surfaced (§7).
    pub fn submit(
        &mut self,
        subject: u64,
        body: &dyn RequestBody,
        respond: impl FnOnce(Reply) + Send + 'static,
    ) -> Result<(), DispatchError> {
        let command = self.translate(body, subject, respond)?;
        let response_subject = subject;
        let _ = response_subject;
        if let Err(e) = self.commands.try_send(command) {
            // QueueFull: the respond closure was already consumed into the
            // command, so surface the failure as a synchronous reply rather
            // than dropping it silently.
            return Err(DispatchError::Engine(e));
        }
        Ok(())
    }

    fn translate(
        &mut self,
        body: &dyn RequestBody,
        subject: u64,
        respond: impl FnOnce(Reply) + Send + 'static,
    ) -> Result<RtCommand, DispatchError> {
        let wrap_node = move |resp: thrum_core::Response| {
            let (node_id, error) = match resp {
                thrum_core::Response::NodeCreated(id) => (Some(id), None),
                thrum_core::Response::Ok => (None, None),
                thrum_core::Response::Err(e) => (None, Some(e)),
            };
            respond(Reply {
                subject,
                node_id,
                error,
            });
        };

        match body.body_type() {
            "Group" => {
                let target = body.target().ok_or(DispatchError::MissingProperty {
                    body: "Group",
                    property: "target",
                })?;
                let action = body.add_action().ok_or(DispatchError::MissingProperty {
                    body: "Group",
                    property: "addAction",
                })?;
                Ok(RtCommand::CreateGroup {
                    target,
                    action,
                    respond: Box::new(wrap_node),
                })
            }
            "Synth" => {
                let target = body.target().ok_or(DispatchError::MissingProperty {
                    body: "Synth",
                    property: "target",
                })?;
                let action = body.add_action().ok_or(DispatchError::MissingProperty {
                    body: "Synth",
                    property: "addAction",
                })?;
                let uri = body.plugin_uri().ok_or(DispatchError::MissingProperty {
                    body: "Synth",
                    property: "plugin",
                })?;
                let def = self
                    .registry
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .lookup(uri)
                    .map_err(DispatchError::Engine)?;
                let options = encode_args(body.args());
                Ok(RtCommand::CreateSynth {
                    target,
                    action,
                    def,
                    options,
                    respond: Box::new(wrap_node),
                })
            }
            "Free" => {
                let target = body.target().ok_or(DispatchError::MissingProperty {
                    body: "Free",
                    property: "target",
                })?;
                Ok(RtCommand::FreeNode {
                    target,
                    respond: Box::new(wrap_node),
                })
            }
            "MapPort" => {
                let target = body.target().ok_or(DispatchError::MissingProperty {
                    body: "MapPort",
                    property: "target",
                })?;
                let port_index = body.port_index().ok_or(DispatchError::MissingProperty {
                    body: "MapPort",
                    property: "index",
                })?;
                let bus = body.bus().ok_or(DispatchError::MissingProperty {
                    body: "MapPort",
                    property: "bus",
                })?;
                Ok(RtCommand::MapPort {
                    target,
                    port_index,
                    bus,
                    respond: Box::new(wrap_node),
                })
            }
            "SetControl" => {
                let target = body.target().ok_or(DispatchError::MissingProperty {
                    body: "SetControl",
                    property: "target",
                })?;
                let port_index = body.port_index().ok_or(DispatchError::MissingProperty {
                    body: "SetControl",
                    property: "index",
                })?;
                let value = body.value().ok_or(DispatchError::MissingProperty {
                    body: "SetControl",
                    property: "value",
                })?;
                Ok(RtCommand::SetControl {
                    target,
                    port_index,
                    value,
                    respond: Box::new(wrap_node),
                })
            }
            other => Err(DispatchError::UnknownBodyType(other.to_string())),
        }
    }
}
