//! Transform Sync Bridge helpers: sanitizing live manipulator values before
//! they are written back to the registry, and the commit policy.

use crate::scene::{Transform, Vec3Tuple};

pub const POSITION_FALLBACK: f32 = 0.0;
pub const ROTATION_FALLBACK: f32 = 0.0;
pub const SCALE_FALLBACK: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Commit on every object-changed event.
    #[default]
    Continuous,
    /// Buffer the latest value during a drag and commit on release.
    TrailingEdge,
}

pub fn sanitize_component(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn sanitize_tuple(values: Vec3Tuple, fallback: f32) -> Vec3Tuple {
    values.map(|value| sanitize_component(value, fallback))
}

pub fn sanitize_transform(transform: &Transform) -> Transform {
    Transform {
        position: sanitize_tuple(transform.position, POSITION_FALLBACK),
        rotation: sanitize_tuple(transform.rotation, ROTATION_FALLBACK),
        scale: sanitize_tuple(transform.scale, SCALE_FALLBACK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_values_pass_through() {
        let t = Transform::new([1.0, -2.0, 3.5], [0.1, 0.2, 0.3], [2.0, 0.5, 1.0]);
        assert_eq!(sanitize_transform(&t), t);
    }

    #[test]
    fn each_tuple_uses_its_own_fallback() {
        let t = Transform::new(
            [f32::NAN, 5.0, 6.0],
            [0.5, f32::NAN, f32::NEG_INFINITY],
            [f32::INFINITY, 2.0, f32::NAN],
        );
        let clean = sanitize_transform(&t);
        assert_eq!(clean.position, [0.0, 5.0, 6.0]);
        assert_eq!(clean.rotation, [0.5, 0.0, 0.0]);
        assert_eq!(clean.scale, [1.0, 2.0, 1.0]);
        assert!(clean.is_finite());
    }
}
