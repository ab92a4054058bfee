//! Pick keys
//!
//! A renderer running an offscreen pick pass draws every pickable element
//! with a flat color encoding a `PickKey`. On click the 1×1 readback is
//! decoded back into a `PickKey`, and the editor resolves it into either a
//! scene node (by render handle) or a manipulator grab handle.

use crate::scene::RenderHandle;

const KIND_SHIFT: u32 = 28;
const OBJECT_SHIFT: u32 = 8;

/// Classification of pickable element.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickKind {
    None = 0,
    SceneNode = 1,
    ManipulatorAxis = 2,
    ManipulatorPlane = 3,
    ManipulatorRing = 4,
}

impl PickKind {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::SceneNode,
            2 => Self::ManipulatorAxis,
            3 => Self::ManipulatorPlane,
            4 => Self::ManipulatorRing,
            _ => Self::None,
        }
    }

    pub fn is_manipulator(self) -> bool {
        matches!(
            self,
            Self::ManipulatorAxis | Self::ManipulatorPlane | Self::ManipulatorRing
        )
    }
}

/// Packed into 32 bits, most significant first: 4-bit kind, 20-bit
/// object id (a render handle), 8-bit sub id (a manipulator grab handle).
/// The big-endian bytes of that word are the RGBA8 pick color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PickKey {
    pub kind: PickKind,
    pub object_id: u32,
    pub sub_id: u8,
}

impl PickKey {
    pub const NONE: Self = Self {
        kind: PickKind::None,
        object_id: 0,
        sub_id: 0,
    };

    pub fn new(kind: PickKind, object_id: u32, sub_id: u8) -> Self {
        debug_assert!(object_id <= RenderHandle::MAX, "object_id exceeds 20-bit range");
        Self {
            kind,
            object_id,
            sub_id,
        }
    }

    pub fn scene_node(handle: RenderHandle) -> Self {
        Self::new(PickKind::SceneNode, handle.raw(), 0)
    }

    pub fn handle(&self) -> Option<RenderHandle> {
        RenderHandle::from_raw(self.object_id)
    }

    pub fn to_bits(&self) -> u32 {
        (u32::from(self.kind as u8 & 0x0F) << KIND_SHIFT)
            | ((self.object_id & RenderHandle::MAX) << OBJECT_SHIFT)
            | u32::from(self.sub_id)
    }

    pub fn from_bits(bits: u32) -> Self {
        Self {
            kind: PickKind::from_u8((bits >> KIND_SHIFT) as u8),
            object_id: (bits >> OBJECT_SHIFT) & RenderHandle::MAX,
            sub_id: (bits & 0xFF) as u8,
        }
    }

    pub fn to_rgba(&self) -> [u8; 4] {
        self.to_bits().to_be_bytes()
    }

    pub fn from_rgba(rgba: [u8; 4]) -> Self {
        Self::from_bits(u32::from_be_bytes(rgba))
    }

    /// Normalized channels for a flat pick material color.
    pub fn to_float4(&self) -> [f32; 4] {
        self.to_rgba().map(|channel| f32::from(channel) / 255.0)
    }

    pub fn is_none(&self) -> bool {
        self.kind == PickKind::None && self.object_id == 0
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PickHit {
    pub key: PickKey,
    pub screen_x: f32,
    pub screen_y: f32,
}

impl PickHit {
    pub fn new(key: PickKey, screen_x: f32, screen_y: f32) -> Self {
        Self {
            key,
            screen_x,
            screen_y,
        }
    }

    pub fn none() -> Self {
        Self::new(PickKey::NONE, 0.0, 0.0)
    }

    pub fn is_none(&self) -> bool {
        self.key.is_none()
    }
}
