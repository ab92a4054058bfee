//! Scene Object Builder and Identifier Bridge.
//!
//! `SceneRuntime` owns the ephemeral scene nodes derived from the registry.
//! The whole node set is rebuilt on every record-collection change and the
//! handle -> id map is rebuilt alongside it, never patched.

use super::{GeometryKind, ModelId, ModelRecord, Transform};
use crate::render::highlight::Appearance;
use crate::render::pick::PickKey;
use std::collections::HashMap;

/// Transient identity of a scene node. Not stable across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(u32);

impl RenderHandle {
    /// Handles must fit the 20-bit object id range of a pick key.
    pub const MAX: u32 = 0xFFFFF;

    pub fn from_raw(raw: u32) -> Option<Self> {
        (1..=Self::MAX).contains(&raw).then_some(Self(raw))
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Default)]
struct HandleAllocator {
    last: u32,
}

impl HandleAllocator {
    // Wraps within the pick range; 0 is reserved for "no object".
    fn allocate(&mut self) -> RenderHandle {
        self.last = if self.last >= RenderHandle::MAX {
            1
        } else {
            self.last + 1
        };
        RenderHandle(self.last)
    }
}

/// Renderable projection of one record. `transform` is the live value the
/// manipulator mutates in place until it is committed back.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    handle: RenderHandle,
    model_id: ModelId,
    kind: GeometryKind,
    pub transform: Transform,
    appearance: Appearance,
}

impl SceneNode {
    fn from_record(handle: RenderHandle, record: &ModelRecord) -> Self {
        Self {
            handle,
            model_id: record.id.clone(),
            kind: record.kind,
            transform: record.transform(),
            appearance: Appearance::Neutral,
        }
    }

    pub fn handle(&self) -> RenderHandle {
        self.handle
    }

    pub fn model_id(&self) -> &ModelId {
        &self.model_id
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn appearance(&self) -> Appearance {
        self.appearance
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.appearance = appearance;
    }
}

pub type IdentifierMap = HashMap<RenderHandle, ModelId>;

/// One entry per node, keyed by render handle.
pub fn build_identifier_map(nodes: &[SceneNode]) -> IdentifierMap {
    nodes
        .iter()
        .map(|node| (node.handle, node.model_id.clone()))
        .collect()
}

#[derive(Debug, Default)]
pub struct SceneRuntime {
    nodes: Vec<SceneNode>,
    index_by_model: HashMap<ModelId, usize>,
    identifiers: IdentifierMap,
    handles: HandleAllocator,
}

impl SceneRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the node set with fresh nodes for `models`. Returns the
    /// handles of the discarded nodes; they no longer resolve.
    pub fn rebuild(&mut self, models: &[ModelRecord]) -> Vec<RenderHandle> {
        let released: Vec<RenderHandle> = self.nodes.iter().map(|node| node.handle).collect();
        let mut nodes = Vec::with_capacity(models.len());
        for record in models {
            let handle = self.handles.allocate();
            nodes.push(SceneNode::from_record(handle, record));
        }
        self.index_by_model = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.model_id.clone(), index))
            .collect();
        self.identifiers = build_identifier_map(&nodes);
        self.nodes = nodes;
        log::debug!(
            "Scene nodes rebuilt: {} released, {} live",
            released.len(),
            self.nodes.len()
        );
        released
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SceneNode] {
        &mut self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn identifier_map(&self) -> &IdentifierMap {
        &self.identifiers
    }

    pub fn resolve(&self, handle: RenderHandle) -> Option<&ModelId> {
        self.identifiers.get(&handle)
    }

    pub fn handle_for_model(&self, id: &ModelId) -> Option<RenderHandle> {
        self.node_for_model(id).map(SceneNode::handle)
    }

    pub fn node_for_model(&self, id: &ModelId) -> Option<&SceneNode> {
        self.index_by_model.get(id).map(|&index| &self.nodes[index])
    }

    pub fn node_for_model_mut(&mut self, id: &ModelId) -> Option<&mut SceneNode> {
        let index = *self.index_by_model.get(id)?;
        self.nodes.get_mut(index)
    }

    pub fn node(&self, handle: RenderHandle) -> Option<&SceneNode> {
        let id = self.identifiers.get(&handle)?;
        self.node_for_model(id)
    }

    pub fn node_mut(&mut self, handle: RenderHandle) -> Option<&mut SceneNode> {
        let id = self.identifiers.get(&handle)?.clone();
        self.node_for_model_mut(&id)
    }

    /// One scene-node pick key per live node.
    pub fn pick_keys(&self) -> Vec<PickKey> {
        self.nodes
            .iter()
            .map(|node| PickKey::scene_node(node.handle))
            .collect()
    }
}
