//! Previz sync - headless editing session
//!
//! Drives the editor through a scripted session (create, pick, drag,
//! duplicate, remove) and replays its render commands into a mirror so
//! the output can be inspected with `RUST_LOG=debug`.
//!
//! Usage: `previz-sync [config.json]`

use previz_sync::config::{load_config_from_file, EditorConfig};
use previz_sync::editor::Editor;
use previz_sync::render::{ManipulatorMode, MirrorError, PickHit, PickKey, RenderMirror};
use previz_sync::scene::{GeometryKind, ModelAction, ModelRegistry, ModelStore, RegistryError};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
enum SessionError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("renderer error: {0}")]
    Mirror(#[from] MirrorError),
    #[error("{0}")]
    Script(&'static str),
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Previz sync - headless session");

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match load_config_from_file(&path) {
            Ok(config) => {
                log::info!("Loaded config from {:?}", path);
                config
            }
            Err(err) => {
                log::warn!("Failed to load config {:?}: {}; using defaults", path, err);
                EditorConfig::default()
            }
        },
        None => EditorConfig::default(),
    };

    if let Err(err) = run_session(config) {
        log::error!("Session failed: {}", err);
        std::process::exit(1);
    }

    log::info!("Goodbye!");
}

fn run_session(config: EditorConfig) -> Result<(), SessionError> {
    let mut editor = Editor::new(ModelRegistry::new(), config);
    let mut mirror = RenderMirror::new();

    let first = editor
        .dispatch(ModelAction::create(GeometryKind::Box))?
        .created
        .ok_or(SessionError::Script("create did not report an id"))?;
    editor.dispatch(ModelAction::Create {
        kind: GeometryKind::Sphere,
        position: Some([2.0, 0.0, 0.0]),
        rotation: None,
        scale: None,
    })?;
    present(&mut editor, &mut mirror)?;

    // Pointer pick on the box
    let handle = editor
        .runtime()
        .handle_for_model(&first)
        .ok_or(SessionError::Script("box has no scene node"))?;
    let outcome = editor.handle_pick(PickHit::new(PickKey::scene_node(handle), 640.0, 360.0));
    log::info!("Pick resolved to {:?}", outcome);
    present(&mut editor, &mut mirror)?;

    editor.handle_drag_started(handle);
    for step in 1..=3 {
        if let Some(live) = editor.manipulator_transform_mut() {
            live.position[1] = step as f32 * 0.5;
        }
        editor.handle_object_changed(handle);
    }
    editor.handle_drag_ended(handle);
    present(&mut editor, &mut mirror)?;

    editor.set_mode(ManipulatorMode::Rotate);
    editor.dispatch(ModelAction::Duplicate(first.clone()))?;
    present(&mut editor, &mut mirror)?;

    editor.dispatch(ModelAction::Remove(first))?;
    present(&mut editor, &mut mirror)?;

    for model in editor.store().models() {
        log::info!(
            "{} {}: pos {:?} rot {:?} scale {:?}",
            model.kind,
            model.id,
            model.position,
            model.rotation,
            model.scale
        );
    }
    Ok(())
}

/// Drain queued commands into the mirror, as a renderer would once per frame.
fn present(editor: &mut Editor, mirror: &mut RenderMirror) -> Result<(), MirrorError> {
    let commands = editor.drain_commands();
    log::debug!("Applying {} render commands", commands.len());
    for command in &commands {
        log::trace!("{:?}", command);
        mirror.apply(command)?;
    }
    log::info!(
        "Frame: {} nodes, manipulator {:?} ({}), orbit {}",
        mirror.node_count(),
        mirror.attached(),
        mirror.mode(),
        if mirror.orbit_enabled() { "on" } else { "off" }
    );
    Ok(())
}
