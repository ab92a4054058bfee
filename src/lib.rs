//! Previz selection sync: keeps a model registry, the scene nodes derived
//! from it, selection highlight, and the transform manipulator consistent.

pub mod config;
pub mod editor;
pub mod render;
pub mod scene;
