//! Node table and group/synth tree (§3, §4.5, §4.6).

extern crate alloc;

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::arena::{Slab, SlabId};
use crate::error::{EngineError, EngineResult};
use crate::plugin::{PortBinding, PortFlags, SynthDef, SynthInstance};
use crate::world::World;

/// Identifies a node in the tree. Carries a generation so a stale id can
/// never resolve to a different node that later reused its slot (§9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(SlabId);

impl NodeId {
    /// The raw slot index, for logging/diagnostics only — never use this to
    /// compare node identity; use `NodeId` equality instead.
    #[must_use]
    pub fn slot(&self) -> u32 {
        self.0.index()
    }

    /// Pack this id into a single `u64` (slot in the high bits, generation
    /// in the low bits) for the wire representation the dispatcher hands
    /// back to callers as an "assigned `nodeId`" (§6 Responses) and that
    /// later requests (`Free`, `MapPort`, `SetControl`) echo back as their
    /// `target`. Round-tripping through [`NodeId::from_raw`] preserves the
    /// generation check that makes a stale id fail rather than alias.
    #[must_use]
    pub fn to_raw(self) -> u64 {
        (u64::from(self.0.index()) << 32) | u64::from(self.0.generation())
    }

    /// Reconstruct a `NodeId` from a value previously produced by
    /// [`NodeId::to_raw`]. Does not itself validate liveness — pass the
    /// result to any `NodeTable` operation, which will reject it with
    /// `InvalidNodeId` if the slot has since been reused under a different
    /// generation.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        NodeId(SlabId::from_parts((raw >> 32) as u32, raw as u32))
    }
}

/// Where to splice a newly created node relative to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddAction {
    /// Target must be a group; attach as its first child.
    AddToHead,
    /// Target must be a group; attach as its last child.
    AddToTail,
    /// Attach immediately before target, as its sibling.
    AddBefore,
    /// Attach immediately after target, as its sibling.
    AddAfter,
}

struct GroupData {
    head: Option<NodeId>,
    tail: Option<NodeId>,
}

struct SynthData {
    def: Arc<dyn SynthDef>,
    instance: Box<dyn SynthInstance>,
    ports: Vec<PortBinding>,
}

enum NodeKind {
    Group(GroupData),
    Synth(SynthData),
}

struct Node {
    parent: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    active: bool,
    kind: NodeKind,
}

/// Dense node table: slot index = `NodeId`, structural mutation only ever
/// happens from the RT thread (§5).
pub struct NodeTable {
    slab: Slab<Node>,
    root: NodeId,
}

impl NodeTable {
    /// Build a table sized to `max_num_nodes`, with a singleton root group
    /// already inserted (§8 scenario 1: root group present with id 0).
    #[must_use]
    pub fn new(max_num_nodes: usize) -> Self {
        let mut slab = Slab::with_capacity(max_num_nodes);
        let root_id = slab
            .try_insert(Node {
                parent: None,
                prev: None,
                next: None,
                active: true,
                kind: NodeKind::Group(GroupData {
                    head: None,
                    tail: None,
                }),
            })
            .expect("max_num_nodes must be at least 1");
        Self {
            slab,
            root: NodeId(root_id),
        }
    }

    /// The singleton root group created at construction.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` resolves to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.slab.get(id.0).is_some()
    }

    fn is_group(&self, id: NodeId) -> Option<bool> {
        self.slab
            .get(id.0)
            .map(|n| matches!(n.kind, NodeKind::Group(_)))
    }

    fn splice_attach(
        &mut self,
        new_id: NodeId,
        target: NodeId,
        action: AddAction,
    ) -> EngineResult<()> {
        let target_is_group = self.is_group(target).ok_or(EngineError::InvalidNodeId)?;

        let (parent, insert_before, insert_after) = match action {
            AddAction::AddToHead | AddAction::AddToTail => {
                if !target_is_group {
                    return Err(EngineError::InvalidArgument(
                        "AddToHead/AddToTail target must be a group".into(),
                    ));
                }
                (target, None, None)
            }
            AddAction::AddBefore => {
                let parent = self
                    .slab
                    .get(target.0)
                    .and_then(|n| n.parent)
                    .ok_or_else(|| {
                        EngineError::InvalidArgument("root has no siblings".into())
                    })?;
                (parent, Some(target), None)
            }
            AddAction::AddAfter => {
                let parent = self
                    .slab
                    .get(target.0)
                    .and_then(|n| n.parent)
                    .ok_or_else(|| {
                        EngineError::InvalidArgument("root has no siblings".into())
                    })?;
                (parent, None, Some(target))
            }
        };

        // Determine neighbors for the new node's prev/next links.
        let (prev, next) = match action {
            AddAction::AddToHead => {
                let head = match &self.slab.get(parent.0).unwrap().kind {
                    NodeKind::Group(g) => g.head,
                    NodeKind::Synth(_) => unreachable!(),
                };
                (None, head)
            }
            AddAction::AddToTail => {
                let tail = match &self.slab.get(parent.0).unwrap().kind {
                    NodeKind::Group(g) => g.tail,
                    NodeKind::Synth(_) => unreachable!(),
                };
                (tail, None)
            }
            AddAction::AddBefore => {
                let before = insert_before.unwrap();
                let prev = self.slab.get(before.0).unwrap().prev;
                (prev, Some(before))
            }
            AddAction::AddAfter => {
                let after = insert_after.unwrap();
                let next = self.slab.get(after.0).unwrap().next;
                (Some(after), next)
            }
        };

        if let Some(p) = prev {
            self.slab.get_mut(p.0).unwrap().next = Some(new_id);
        }
        if let Some(n) = next {
            self.slab.get_mut(n.0).unwrap().prev = Some(new_id);
        }
        {
            let node = self.slab.get_mut(new_id.0).unwrap();
            node.parent = Some(parent);
            node.prev = prev;
            node.next = next;
        }
        if let NodeKind::Group(g) = &mut self.slab.get_mut(parent.0).unwrap().kind {
            if prev.is_none() {
                g.head = Some(new_id);
            }
            if next.is_none() {
                g.tail = Some(new_id);
            }
        }

        Ok(())
    }

    /// Create a group node and attach it per `action` relative to `target`
    /// (§4.6 "Adding a node").
    pub fn insert_group(&mut self, target: NodeId, action: AddAction) -> EngineResult<NodeId> {
        let slot = self
            .slab
            .try_insert(Node {
                parent: None,
                prev: None,
                next: None,
                active: true,
                kind: NodeKind::Group(GroupData {
                    head: None,
                    tail: None,
                }),
            })
            .ok_or(EngineError::AllocationFailed)?;
        let new_id = NodeId(slot);
        if let Err(e) = self.splice_attach(new_id, target, action) {
            self.slab.remove(slot);
            return Err(e);
        }
        Ok(new_id)
    }

    /// Construct a synth instance and attach it per `action` relative to
    /// `target` (§4.6 "Synth construction").
    ///
    /// Port bindings start at their definition's default: silence for audio
    /// ports, zero for control ports.
    pub fn insert_synth(
        &mut self,
        target: NodeId,
        action: AddAction,
        def: Arc<dyn SynthDef>,
        world: &mut dyn World,
        options: &[u8],
    ) -> EngineResult<NodeId> {
        let mut ports = Vec::new();
        let mut index = 0u32;
        while let Some(desc) = def.port_descriptor(index) {
            ports.push(match desc.port_type {
                crate::plugin::PortType::Audio => PortBinding::Bus(None),
                crate::plugin::PortType::Control => PortBinding::Control(0.0),
            });
            index += 1;
        }

        let mut instance = def.construct(world, options)?;
        instance.activate(world);

        let slot = self
            .slab
            .try_insert(Node {
                parent: None,
                prev: None,
                next: None,
                active: true,
                kind: NodeKind::Synth(SynthData {
                    def,
                    instance,
                    ports,
                }),
            })
            .ok_or(EngineError::AllocationFailed)?;
        let new_id = NodeId(slot);
        if let Err(e) = self.splice_attach(new_id, target, action) {
            if let Some(Node {
                kind: NodeKind::Synth(mut synth),
                ..
            }) = self.slab.remove(slot)
            {
                synth.instance.destroy(world);
            }
            return Err(e);
        }
        Ok(new_id)
    }

    /// Bind an audio port to a bus, or a control port to a direct value is
    /// done via [`NodeTable::set_control`]. Fails with `InvalidNodeId` or
    /// `InvalidArgument` if the node/port/port-type doesn't match.
    pub fn map_port(
        &mut self,
        node: NodeId,
        port_index: u32,
        bus: crate::bus::AudioBusId,
    ) -> EngineResult<()> {
        let synth = self.synth_mut(node)?;
        let binding = synth
            .ports
            .get_mut(port_index as usize)
            .ok_or_else(|| EngineError::InvalidArgument("port index out of range".into()))?;
        match binding {
            PortBinding::Bus(slot) => {
                *slot = Some(bus);
                Ok(())
            }
            PortBinding::Control(_) => Err(EngineError::InvalidArgument(
                "MapPort targets an audio port".into(),
            )),
        }
    }

    /// Set a control port's direct value (§4.6, §6).
    pub fn set_control(&mut self, node: NodeId, port_index: u32, value: f32) -> EngineResult<()> {
        let synth = self.synth_mut(node)?;
        let binding = synth
            .ports
            .get_mut(port_index as usize)
            .ok_or_else(|| EngineError::InvalidArgument("port index out of range".into()))?;
        match binding {
            PortBinding::Control(v) => {
                *v = value;
                Ok(())
            }
            PortBinding::Bus(_) => Err(EngineError::InvalidArgument(
                "SetControl targets a control port".into(),
            )),
        }
    }

    fn synth_mut(&mut self, node: NodeId) -> EngineResult<&mut SynthData> {
        match self.slab.get_mut(node.0) {
            Some(Node {
                kind: NodeKind::Synth(s),
                ..
            }) => Ok(s),
            Some(_) => Err(EngineError::InvalidArgument("node is not a synth".into())),
            None => Err(EngineError::InvalidNodeId),
        }
    }

    /// Depth-first collection of `id` and every descendant, used before
    /// destroying a subtree (§4.6 "Removing a node").
    pub fn collect_subtree(&self, id: NodeId) -> EngineResult<Vec<NodeId>> {
        if !self.contains(id) {
            return Err(EngineError::InvalidNodeId);
        }
        let mut out = Vec::new();
        let mut stack = alloc::vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            if let Some(Node {
                kind: NodeKind::Group(g),
                ..
            }) = self.slab.get(current.0)
            {
                let mut child = g.head;
                while let Some(c) = child {
                    stack.push(c);
                    child = self.slab.get(c.0).and_then(|n| n.next);
                }
            }
        }
        Ok(out)
    }

    /// Splice `id` out of its parent's child list. Root is a no-op.
    pub fn detach_from_parent(&mut self, id: NodeId) {
        let (parent, prev, next) = match self.slab.get(id.0) {
            Some(n) => (n.parent, n.prev, n.next),
            None => return,
        };
        let Some(parent) = parent else { return };

        if let Some(p) = prev {
            self.slab.get_mut(p.0).unwrap().next = next;
        }
        if let Some(n) = next {
            self.slab.get_mut(n.0).unwrap().prev = prev;
        }
        if let NodeKind::Group(g) = &mut self.slab.get_mut(parent.0).unwrap().kind {
            if g.head == Some(id) {
                g.head = next;
            }
            if g.tail == Some(id) {
                g.tail = prev;
            }
        }
    }

    /// Remove `id` from the table outright, returning its synth instance so
    /// the caller can call `destroy` on it with a `World` in scope. Group
    /// nodes have no instance to destroy.
    pub fn remove_and_take_instance(&mut self, id: NodeId) -> Option<Box<dyn SynthInstance>> {
        match self.slab.remove(id.0)?.kind {
            NodeKind::Synth(s) => Some(s.instance),
            NodeKind::Group(_) => None,
        }
    }

    /// Mark every node in `ids` inactive without removing it from the
    /// table. Used to make a subtree stop processing immediately while its
    /// teardown command is still draining.
    pub fn deactivate(&mut self, ids: &[NodeId]) {
        for &id in ids {
            if let Some(node) = self.slab.get_mut(id.0) {
                node.active = false;
            }
        }
    }

    /// Walk the tree from the root, invoking `process` on every active
    /// synth in depth-first head-to-tail order (§4.6 "Processing a
    /// group"). The `next` pointer is read fresh on every step, so a
    /// structural change that happens to land mid-walk cannot invalidate
    /// the iteration.
    pub fn walk_process(&mut self, world: &mut dyn World, num_frames: usize) {
        self.process_group(self.root, world, num_frames);
    }

    fn process_group(&mut self, group_id: NodeId, world: &mut dyn World, num_frames: usize) {
        let head = match self.slab.get(group_id.0) {
            Some(Node {
                kind: NodeKind::Group(g),
                ..
            }) => g.head,
            _ => return,
        };

        let mut current = head;
        while let Some(child_id) = current {
            let Some(node) = self.slab.get(child_id.0) else {
                break;
            };
            let next = node.next;
            let active = node.active;
            let is_group = matches!(node.kind, NodeKind::Group(_));

            if active {
                if is_group {
                    self.process_group(child_id, world, num_frames);
                } else if let Some(Node {
                    kind: NodeKind::Synth(synth),
                    ..
                }) = self.slab.get_mut(child_id.0)
                {
                    synth
                        .instance
                        .process(world, &mut synth.ports, num_frames);
                }
            }

            current = next;
        }
    }

    /// Reset every trigger-flagged control port's value to zero, called
    /// once after the tree walk completes (§4.6 "Port binding", §4.7 step
    /// 7).
    pub fn clear_triggers(&mut self) {
        for (_, node) in self.slab.iter_mut() {
            if let NodeKind::Synth(synth) = &mut node.kind {
                for (index, binding) in synth.ports.iter_mut().enumerate() {
                    if let PortBinding::Control(value) = binding
                        && let Some(desc) = synth.def.port_descriptor(index as u32)
                        && desc.flags.contains(PortFlags::TRIGGER)
                    {
                        *value = 0.0;
                    }
                }
            }
        }
    }
}
