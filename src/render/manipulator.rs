use crate::render::pick::{PickKey, PickKind};
use crate::scene::{ModelId, RenderHandle, Transform};
use std::fmt;
use std::str::FromStr;

/// Tool mode fed to the manipulator widget. Orthogonal to attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManipulatorMode {
    #[default]
    Translate,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown manipulator mode '{0}'")]
pub struct UnknownManipulatorMode(pub String);

impl ManipulatorMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }
}

impl FromStr for ManipulatorMode {
    type Err = UnknownManipulatorMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translate" => Ok(Self::Translate),
            "rotate" => Ok(Self::Rotate),
            "scale" => Ok(Self::Scale),
            other => Err(UnknownManipulatorMode(other.to_string())),
        }
    }
}

impl fmt::Display for ManipulatorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grab handles drawn by the manipulator widget. The discriminant is the
/// pick key `sub_id`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManipulatorHandle {
    TranslateX = 1,
    TranslateY = 2,
    TranslateZ = 3,
    TranslateXY = 4,
    TranslateXZ = 5,
    TranslateYZ = 6,
    RotateX = 11,
    RotateY = 12,
    RotateZ = 13,
    RotateView = 14,
    RotateArcball = 15,
    ScaleX = 21,
    ScaleY = 22,
    ScaleZ = 23,
    ScaleXY = 24,
    ScaleXZ = 25,
    ScaleYZ = 26,
    ScaleUniform = 27,
}

impl ManipulatorHandle {
    pub const ALL: [Self; 18] = [
        Self::TranslateX,
        Self::TranslateY,
        Self::TranslateZ,
        Self::TranslateXY,
        Self::TranslateXZ,
        Self::TranslateYZ,
        Self::RotateX,
        Self::RotateY,
        Self::RotateZ,
        Self::RotateView,
        Self::RotateArcball,
        Self::ScaleX,
        Self::ScaleY,
        Self::ScaleZ,
        Self::ScaleXY,
        Self::ScaleXZ,
        Self::ScaleYZ,
        Self::ScaleUniform,
    ];

    pub fn sub_id(self) -> u8 {
        self as u8
    }

    pub fn from_sub_id(sub_id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|handle| handle.sub_id() == sub_id)
    }

    pub fn mode(self) -> ManipulatorMode {
        match self.sub_id() {
            1..=6 => ManipulatorMode::Translate,
            11..=15 => ManipulatorMode::Rotate,
            _ => ManipulatorMode::Scale,
        }
    }

    pub fn pick_kind(self) -> PickKind {
        match self {
            Self::TranslateX
            | Self::TranslateY
            | Self::TranslateZ
            | Self::ScaleX
            | Self::ScaleY
            | Self::ScaleZ => PickKind::ManipulatorAxis,
            Self::TranslateXY
            | Self::TranslateXZ
            | Self::TranslateYZ
            | Self::ScaleXY
            | Self::ScaleXZ
            | Self::ScaleYZ => PickKind::ManipulatorPlane,
            Self::RotateX
            | Self::RotateY
            | Self::RotateZ
            | Self::RotateView
            | Self::RotateArcball
            | Self::ScaleUniform => PickKind::ManipulatorRing,
        }
    }

    pub fn pick_key(self, target: RenderHandle) -> PickKey {
        PickKey::new(self.pick_kind(), target.raw(), self.sub_id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManipulatorBinding {
    #[default]
    Detached,
    Attached(RenderHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindTransition {
    Unchanged,
    Attached(RenderHandle),
    /// Single replace of the target; never attached to both.
    Retargeted { from: RenderHandle, to: RenderHandle },
    Detached(RenderHandle),
}

/// An in-progress drag on the attached node.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub handle: RenderHandle,
    pub model_id: ModelId,
    /// Latest sanitized value not yet committed (trailing-edge sync only).
    pub pending: Option<Transform>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rebind {
    pub transition: BindTransition,
    /// Drag session closed because its node lost the manipulator.
    pub closed_drag: Option<DragSession>,
}

#[derive(Debug, Default)]
pub struct ManipulatorBinder {
    binding: ManipulatorBinding,
    mode: ManipulatorMode,
    drag: Option<DragSession>,
}

impl ManipulatorBinder {
    pub fn new(mode: ManipulatorMode) -> Self {
        Self {
            binding: ManipulatorBinding::Detached,
            mode,
            drag: None,
        }
    }

    pub fn binding(&self) -> ManipulatorBinding {
        self.binding
    }

    pub fn target(&self) -> Option<RenderHandle> {
        match self.binding {
            ManipulatorBinding::Attached(handle) => Some(handle),
            ManipulatorBinding::Detached => None,
        }
    }

    pub fn is_target(&self, handle: RenderHandle) -> bool {
        self.target() == Some(handle)
    }

    pub fn mode(&self) -> ManipulatorMode {
        self.mode
    }

    /// Returns true when the mode actually changed.
    pub fn set_mode(&mut self, mode: ManipulatorMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    pub fn bind(&mut self, target: Option<RenderHandle>) -> Rebind {
        let transition = match (self.binding, target) {
            (ManipulatorBinding::Detached, None) => BindTransition::Unchanged,
            (ManipulatorBinding::Detached, Some(to)) => BindTransition::Attached(to),
            (ManipulatorBinding::Attached(from), None) => BindTransition::Detached(from),
            (ManipulatorBinding::Attached(from), Some(to)) if from == to => {
                BindTransition::Unchanged
            }
            (ManipulatorBinding::Attached(from), Some(to)) => {
                BindTransition::Retargeted { from, to }
            }
        };
        self.binding = match target {
            Some(handle) => ManipulatorBinding::Attached(handle),
            None => ManipulatorBinding::Detached,
        };
        let stale = self
            .drag
            .as_ref()
            .is_some_and(|session| Some(session.handle) != target);
        let closed_drag = if stale { self.drag.take() } else { None };
        Rebind {
            transition,
            closed_drag,
        }
    }

    /// Open a drag session. Only the attached node can be dragged.
    pub fn begin_drag(&mut self, handle: RenderHandle, model_id: ModelId) -> bool {
        if !self.is_target(handle) {
            return false;
        }
        if self.drag.as_ref().map(|session| session.handle) != Some(handle) {
            self.drag = Some(DragSession {
                handle,
                model_id,
                pending: None,
            });
        }
        true
    }

    pub fn drag(&self) -> Option<&DragSession> {
        self.drag.as_ref()
    }

    pub fn drag_mut(&mut self) -> Option<&mut DragSession> {
        self.drag.as_mut()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn end_drag(&mut self, handle: RenderHandle) -> Option<DragSession> {
        if self.drag.as_ref()?.handle == handle {
            self.drag.take()
        } else {
            None
        }
    }

    pub fn abort_drag(&mut self) -> Option<DragSession> {
        self.drag.take()
    }

    /// Keys for the grab handles of the active mode, if attached.
    pub fn pick_keys(&self) -> Vec<PickKey> {
        let Some(target) = self.target() else {
            return Vec::new();
        };
        ManipulatorHandle::ALL
            .into_iter()
            .filter(|handle| handle.mode() == self.mode)
            .map(|handle| handle.pick_key(target))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(raw: u32) -> RenderHandle {
        RenderHandle::from_raw(raw).unwrap()
    }

    #[test]
    fn transition_table() {
        let mut binder = ManipulatorBinder::new(ManipulatorMode::Translate);
        assert_eq!(binder.bind(None).transition, BindTransition::Unchanged);
        assert_eq!(
            binder.bind(Some(handle(1))).transition,
            BindTransition::Attached(handle(1))
        );
        assert_eq!(binder.bind(Some(handle(1))).transition, BindTransition::Unchanged);
        assert_eq!(
            binder.bind(Some(handle(2))).transition,
            BindTransition::Retargeted {
                from: handle(1),
                to: handle(2)
            }
        );
        assert_eq!(binder.binding(), ManipulatorBinding::Attached(handle(2)));
        assert_eq!(binder.bind(None).transition, BindTransition::Detached(handle(2)));
        assert_eq!(binder.binding(), ManipulatorBinding::Detached);
    }

    #[test]
    fn mode_change_never_touches_attachment() {
        let mut binder = ManipulatorBinder::new(ManipulatorMode::Translate);
        binder.bind(Some(handle(3)));
        assert!(binder.set_mode(ManipulatorMode::Scale));
        assert!(!binder.set_mode(ManipulatorMode::Scale));
        assert_eq!(binder.binding(), ManipulatorBinding::Attached(handle(3)));
    }

    #[test]
    fn drag_only_on_attached_node() {
        let mut binder = ManipulatorBinder::new(ManipulatorMode::Translate);
        assert!(!binder.begin_drag(handle(1), "a".into()));
        binder.bind(Some(handle(1)));
        assert!(!binder.begin_drag(handle(2), "b".into()));
        assert!(binder.begin_drag(handle(1), "a".into()));
        assert!(binder.end_drag(handle(2)).is_none());
        assert_eq!(binder.end_drag(handle(1)).unwrap().model_id, ModelId::from("a"));
        assert!(!binder.is_dragging());
    }

    #[test]
    fn detach_closes_open_drag() {
        let mut binder = ManipulatorBinder::new(ManipulatorMode::Rotate);
        binder.bind(Some(handle(1)));
        binder.begin_drag(handle(1), "a".into());
        let rebind = binder.bind(None);
        assert_eq!(rebind.closed_drag.unwrap().handle, handle(1));
        assert!(!binder.is_dragging());
    }

    #[test]
    fn rebinding_same_target_keeps_drag() {
        let mut binder = ManipulatorBinder::new(ManipulatorMode::Rotate);
        binder.bind(Some(handle(1)));
        binder.begin_drag(handle(1), "a".into());
        assert!(binder.bind(Some(handle(1))).closed_drag.is_none());
        assert!(binder.is_dragging());
    }

    #[test]
    fn pick_keys_follow_mode_and_target() {
        let mut binder = ManipulatorBinder::new(ManipulatorMode::Rotate);
        assert!(binder.pick_keys().is_empty());
        binder.bind(Some(handle(9)));
        let keys = binder.pick_keys();
        assert_eq!(keys.len(), 5);
        assert!(keys.iter().all(|key| key.object_id == 9));
        assert!(keys.iter().all(|key| key.kind == PickKind::ManipulatorRing));

        binder.set_mode(ManipulatorMode::Scale);
        assert_eq!(binder.pick_keys().len(), 7);
    }

    #[test]
    fn grab_handles_roundtrip_through_sub_id() {
        for grab in ManipulatorHandle::ALL {
            assert_eq!(ManipulatorHandle::from_sub_id(grab.sub_id()), Some(grab));
        }
        assert_eq!(ManipulatorHandle::from_sub_id(0), None);
        assert_eq!(ManipulatorHandle::ScaleUniform.mode(), ManipulatorMode::Scale);
    }

    #[test]
    fn mode_parses_widget_strings() {
        assert_eq!("rotate".parse::<ManipulatorMode>(), Ok(ManipulatorMode::Rotate));
        assert!("shear".parse::<ManipulatorMode>().is_err());
        assert_eq!(ManipulatorMode::Scale.to_string(), "scale");
    }
}
