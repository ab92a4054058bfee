//! Render-side contract.
//!
//! The editor never talks to a renderer directly; it queues `RenderCommand`s
//! which the host drains once per frame and applies in order.

pub mod highlight;
pub mod manipulator;
pub mod pick;

pub use highlight::{apply_highlight, Appearance};
pub use manipulator::{ManipulatorBinder, ManipulatorBinding, ManipulatorHandle, ManipulatorMode};
pub use pick::{PickHit, PickKey, PickKind};

use crate::scene::{GeometryKind, RenderHandle};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    InsertNode {
        handle: RenderHandle,
        kind: GeometryKind,
        transform: [f32; 16],
    },
    ReleaseNode(RenderHandle),
    SetTransform {
        handle: RenderHandle,
        transform: [f32; 16],
    },
    SetAppearance {
        handle: RenderHandle,
        appearance: Appearance,
        color: [f32; 4],
    },
    /// Replaces any previous target.
    AttachManipulator(RenderHandle),
    DetachManipulator,
    SetManipulatorMode(ManipulatorMode),
    /// Drop the widget's grab without emitting further changes.
    AbortDrag(RenderHandle),
    SetOrbitControlsEnabled(bool),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    #[error("render command references unknown node {0:?}")]
    UnknownNode(RenderHandle),
    #[error("node {0:?} inserted twice")]
    DuplicateNode(RenderHandle),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirrorNode {
    pub kind: GeometryKind,
    pub transform: [f32; 16],
    pub appearance: Appearance,
    pub color: [f32; 4],
}

/// Renderer state reconstructed from the command stream.
#[derive(Debug)]
pub struct RenderMirror {
    nodes: HashMap<RenderHandle, MirrorNode>,
    attached: Option<RenderHandle>,
    mode: ManipulatorMode,
    orbit_enabled: bool,
    aborted_drags: usize,
}

impl Default for RenderMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderMirror {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            attached: None,
            mode: ManipulatorMode::default(),
            orbit_enabled: true,
            aborted_drags: 0,
        }
    }

    pub fn apply(&mut self, command: &RenderCommand) -> Result<(), MirrorError> {
        match command {
            RenderCommand::InsertNode {
                handle,
                kind,
                transform,
            } => {
                if self.nodes.contains_key(handle) {
                    return Err(MirrorError::DuplicateNode(*handle));
                }
                self.nodes.insert(
                    *handle,
                    MirrorNode {
                        kind: *kind,
                        transform: *transform,
                        appearance: Appearance::Neutral,
                        color: [1.0; 4],
                    },
                );
            }
            RenderCommand::ReleaseNode(handle) => {
                self.nodes
                    .remove(handle)
                    .ok_or(MirrorError::UnknownNode(*handle))?;
            }
            RenderCommand::SetTransform { handle, transform } => {
                self.node_mut(*handle)?.transform = *transform;
            }
            RenderCommand::SetAppearance {
                handle,
                appearance,
                color,
            } => {
                let node = self.node_mut(*handle)?;
                node.appearance = *appearance;
                node.color = *color;
            }
            RenderCommand::AttachManipulator(handle) => {
                if !self.nodes.contains_key(handle) {
                    return Err(MirrorError::UnknownNode(*handle));
                }
                self.attached = Some(*handle);
            }
            RenderCommand::DetachManipulator => self.attached = None,
            RenderCommand::SetManipulatorMode(mode) => self.mode = *mode,
            RenderCommand::AbortDrag(_) => self.aborted_drags += 1,
            RenderCommand::SetOrbitControlsEnabled(enabled) => self.orbit_enabled = *enabled,
        }
        Ok(())
    }

    pub fn apply_all(&mut self, commands: &[RenderCommand]) -> Result<(), MirrorError> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(())
    }

    fn node_mut(&mut self, handle: RenderHandle) -> Result<&mut MirrorNode, MirrorError> {
        self.nodes
            .get_mut(&handle)
            .ok_or(MirrorError::UnknownNode(handle))
    }

    pub fn node(&self, handle: RenderHandle) -> Option<&MirrorNode> {
        self.nodes.get(&handle)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn attached(&self) -> Option<RenderHandle> {
        self.attached
    }

    /// False when the manipulator points at a node that was released.
    pub fn attached_is_live(&self) -> bool {
        self.attached
            .map_or(true, |handle| self.nodes.contains_key(&handle))
    }

    pub fn selected_nodes(&self) -> Vec<RenderHandle> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.appearance == Appearance::Selected)
            .map(|(handle, _)| *handle)
            .collect()
    }

    pub fn mode(&self) -> ManipulatorMode {
        self.mode
    }

    pub fn orbit_enabled(&self) -> bool {
        self.orbit_enabled
    }

    pub fn aborted_drags(&self) -> usize {
        self.aborted_drags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(raw: u32) -> RenderHandle {
        RenderHandle::from_raw(raw).unwrap()
    }

    fn insert(raw: u32) -> RenderCommand {
        RenderCommand::InsertNode {
            handle: handle(raw),
            kind: GeometryKind::Box,
            transform: [0.0; 16],
        }
    }

    #[test]
    fn attach_requires_live_node() {
        let mut mirror = RenderMirror::new();
        assert_eq!(
            mirror.apply(&RenderCommand::AttachManipulator(handle(1))),
            Err(MirrorError::UnknownNode(handle(1)))
        );
        mirror.apply(&insert(1)).unwrap();
        mirror.apply(&RenderCommand::AttachManipulator(handle(1))).unwrap();
        assert_eq!(mirror.attached(), Some(handle(1)));
    }

    #[test]
    fn releasing_attached_node_is_visible_as_stale_attachment() {
        let mut mirror = RenderMirror::new();
        mirror
            .apply_all(&[insert(1), RenderCommand::AttachManipulator(handle(1))])
            .unwrap();
        assert!(mirror.attached_is_live());
        mirror.apply(&RenderCommand::ReleaseNode(handle(1))).unwrap();
        assert!(!mirror.attached_is_live());
    }

    #[test]
    fn double_insert_is_rejected() {
        let mut mirror = RenderMirror::new();
        mirror.apply(&insert(4)).unwrap();
        assert_eq!(mirror.apply(&insert(4)), Err(MirrorError::DuplicateNode(handle(4))));
    }
}
