pub mod registry;
pub mod runtime;

pub use registry::{ModelAction, ModelRegistry, ModelStore, RegistryError, StoreChange};
pub use runtime::{build_identifier_map, IdentifierMap, RenderHandle, SceneNode, SceneRuntime};

use glam::{EulerRot, Mat4, Quat, Vec3};
use std::fmt;
use std::str::FromStr;

pub type Vec3Tuple = [f32; 3];

/// Persistent model identifier. Immutable once a record is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ModelId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ModelId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geometry kind tag carried by a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    #[default]
    Box,
    Sphere,
    Cylinder,
    Plane,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown geometry kind '{0}'")]
pub struct UnknownGeometryKind(pub String);

impl GeometryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Box => "box",
            Self::Sphere => "sphere",
            Self::Cylinder => "cylinder",
            Self::Plane => "plane",
        }
    }
}

impl FromStr for GeometryKind {
    type Err = UnknownGeometryKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "box" => Ok(Self::Box),
            "sphere" => Ok(Self::Sphere),
            "cylinder" => Ok(Self::Cylinder),
            "plane" => Ok(Self::Plane),
            other => Err(UnknownGeometryKind(other.to_string())),
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position / rotation (Euler XYZ, radians) / scale triple.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    pub position: Vec3Tuple,
    pub rotation: Vec3Tuple,
    pub scale: Vec3Tuple,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0],
        scale: [1.0, 1.0, 1.0],
    };

    pub fn new(position: Vec3Tuple, rotation: Vec3Tuple, scale: Vec3Tuple) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    pub fn to_matrix(&self) -> [f32; 16] {
        compose_transform_matrix(self.position, self.rotation, self.scale)
    }

    pub fn is_finite(&self) -> bool {
        self.position
            .iter()
            .chain(&self.rotation)
            .chain(&self.scale)
            .all(|v| v.is_finite())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Persistent description of one placed model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelRecord {
    pub id: ModelId,
    #[serde(rename = "type")]
    pub kind: GeometryKind,
    pub position: Vec3Tuple,
    pub rotation: Vec3Tuple,
    pub scale: Vec3Tuple,
}

impl ModelRecord {
    pub fn new(id: impl Into<ModelId>, kind: GeometryKind, transform: Transform) -> Self {
        Self {
            id: id.into(),
            kind,
            position: transform.position,
            rotation: transform.rotation,
            scale: transform.scale,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation, self.scale)
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.position = transform.position;
        self.rotation = transform.rotation;
        self.scale = transform.scale;
    }

    /// Copy of every field under a freshly generated id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: ModelId::generate(),
            ..self.clone()
        }
    }
}

/// Column-major world matrix, rotation applied as X * Y * Z.
pub fn compose_transform_matrix(
    position: Vec3Tuple,
    rotation: Vec3Tuple,
    scale: Vec3Tuple,
) -> [f32; 16] {
    let rotation = Quat::from_euler(EulerRot::XYZ, rotation[0], rotation[1], rotation[2]);
    Mat4::from_scale_rotation_translation(
        Vec3::from_array(scale),
        rotation,
        Vec3::from_array(position),
    )
    .to_cols_array()
}
