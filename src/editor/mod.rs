//! Selection and transform synchronization.
//!
//! `Editor` owns the scene runtime and manipulator binding and reacts to
//! three event sources: store dispatches, pointer picks, and manipulator
//! drag events. Every reaction runs to completion and queues the resulting
//! render commands before the next event is handled.

pub mod sync;

use crate::config::EditorConfig;
use crate::render::manipulator::{BindTransition, DragSession};
use crate::render::{
    apply_highlight, ManipulatorBinder, ManipulatorBinding, ManipulatorHandle, ManipulatorMode,
    PickHit, PickKey, PickKind, RenderCommand,
};
use crate::scene::{
    ModelAction, ModelId, ModelRegistry, ModelStore, RegistryError, RenderHandle, SceneRuntime,
    StoreChange, Transform,
};
use sync::SyncPolicy;

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Missed every tracked node.
    Ignored,
    AlreadySelected,
    Selected(ModelId),
    /// Grabbed a manipulator handle; selection unchanged.
    Manipulator(ManipulatorHandle),
}

pub struct Editor<S: ModelStore = ModelRegistry> {
    store: S,
    config: EditorConfig,
    runtime: SceneRuntime,
    binder: ManipulatorBinder,
    commands: Vec<RenderCommand>,
}

impl<S: ModelStore> Editor<S> {
    pub fn new(store: S, config: EditorConfig) -> Self {
        let binder = ManipulatorBinder::new(config.initial_mode);
        let mut editor = Self {
            store,
            config,
            runtime: SceneRuntime::new(),
            binder,
            commands: Vec::new(),
        };
        editor
            .commands
            .push(RenderCommand::SetManipulatorMode(editor.binder.mode()));
        editor.rebuild_scene();
        log::info!(
            "Editor started with {} models ({} mode, {:?} sync)",
            editor.runtime.len(),
            editor.binder.mode(),
            editor.config.sync_policy
        );
        editor
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn runtime(&self) -> &SceneRuntime {
        &self.runtime
    }

    pub fn binding(&self) -> ManipulatorBinding {
        self.binder.binding()
    }

    pub fn mode(&self) -> ManipulatorMode {
        self.binder.mode()
    }

    pub fn is_dragging(&self) -> bool {
        self.binder.is_dragging()
    }

    /// Commands queued since the last drain, in application order.
    pub fn drain_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Dispatch to the store and apply the full reaction before returning.
    pub fn dispatch(&mut self, action: ModelAction) -> Result<StoreChange, RegistryError> {
        let change = self.store.dispatch(action)?;
        self.react(&change);
        Ok(change)
    }

    fn react(&mut self, change: &StoreChange) {
        if change.collection_changed {
            // Rebuilt nodes start from the records and selection is re-derived.
            self.rebuild_scene();
            return;
        }
        if let Some(id) = &change.transform_updated {
            self.apply_external_transform(id);
        }
        if change.selection_changed {
            self.refresh_selection();
        }
    }

    /// Inserts for the new node set, then highlight and manipulator, then
    /// releases. The manipulator never points at a released node.
    fn rebuild_scene(&mut self) {
        // Settle an open drag first so new nodes start from committed values.
        if let Some(session) = self.binder.abort_drag() {
            self.cancel_drag(session);
        }
        let released = self.runtime.rebuild(self.store.models());
        for node in self.runtime.nodes() {
            self.commands.push(RenderCommand::InsertNode {
                handle: node.handle(),
                kind: node.kind(),
                transform: node.transform.to_matrix(),
            });
        }
        self.refresh_selection();
        self.commands
            .extend(released.into_iter().map(RenderCommand::ReleaseNode));
        log::info!("Scene rebuilt with {} nodes", self.runtime.len());
    }

    fn refresh_selection(&mut self) {
        let selected = self.store.selected_id().cloned();
        let target = self.highlight(selected.as_ref());
        self.rebind(target);
    }

    fn highlight(&mut self, selected: Option<&ModelId>) -> Option<RenderHandle> {
        let target = apply_highlight(&mut self.runtime, selected);
        let colors = self.config.highlight;
        for node in self.runtime.nodes() {
            let appearance = node.appearance();
            self.commands.push(RenderCommand::SetAppearance {
                handle: node.handle(),
                appearance,
                color: appearance.color(&colors),
            });
        }
        target
    }

    fn rebind(&mut self, target: Option<RenderHandle>) {
        let rebind = self.binder.bind(target);
        if let Some(session) = rebind.closed_drag {
            self.cancel_drag(session);
        }
        match rebind.transition {
            BindTransition::Unchanged => {}
            BindTransition::Attached(to) => {
                log::debug!("Manipulator attached to {:?}", to);
                self.commands.push(RenderCommand::AttachManipulator(to));
            }
            BindTransition::Retargeted { from, to } => {
                log::debug!("Manipulator moved {:?} -> {:?}", from, to);
                self.commands.push(RenderCommand::AttachManipulator(to));
            }
            BindTransition::Detached(from) => {
                log::debug!("Manipulator detached from {:?}", from);
                self.commands.push(RenderCommand::DetachManipulator);
            }
        }
    }

    /// Forced close: the widget loses its grab before the buffered value commits.
    fn cancel_drag(&mut self, session: DragSession) {
        log::debug!("Drag on {:?} cancelled", session.handle);
        self.commands.push(RenderCommand::AbortDrag(session.handle));
        self.close_drag(session);
    }

    /// Commit whatever the session buffered, if its record still exists.
    fn close_drag(&mut self, session: DragSession) {
        if let Some(transform) = session.pending {
            if self.store.model(&session.model_id).is_some() {
                self.commit(&session.model_id, transform);
            } else {
                log::trace!("Pending transform for removed {} dropped", session.model_id);
            }
        }
        self.commands.push(RenderCommand::SetOrbitControlsEnabled(true));
    }

    fn commit(&mut self, id: &ModelId, transform: Transform) {
        let action = ModelAction::UpdateTransform {
            id: id.clone(),
            transform,
        };
        match self.store.dispatch(action) {
            Ok(_) => log::trace!("Committed transform for {}: {:?}", id, transform),
            Err(err) => log::warn!("Transform commit for {} dropped: {}", id, err),
        }
    }

    /// Registry wins over the live node. An open drag on it is aborted.
    fn apply_external_transform(&mut self, id: &ModelId) {
        let Some(transform) = self.store.model(id).map(|record| record.transform()) else {
            return;
        };
        let Some(node) = self.runtime.node_for_model_mut(id) else {
            return;
        };
        node.transform = transform;
        let handle = node.handle();
        self.commands.push(RenderCommand::SetTransform {
            handle,
            transform: transform.to_matrix(),
        });
        if self.binder.drag().is_some_and(|session| session.handle == handle) {
            self.binder.abort_drag();
            log::debug!("External edit of {} aborted the active drag", id);
            self.commands.push(RenderCommand::AbortDrag(handle));
            self.commands.push(RenderCommand::SetOrbitControlsEnabled(true));
        }
    }

    /// Pointer click on a scene node.
    pub fn handle_click(&mut self, handle: RenderHandle) -> ClickOutcome {
        let Some(id) = self.runtime.resolve(handle).cloned() else {
            log::trace!("Click on untracked handle {:?} dropped", handle);
            return ClickOutcome::Ignored;
        };
        if self.store.selected_id() == Some(&id) {
            return ClickOutcome::AlreadySelected;
        }
        let target = self.highlight(Some(&id));
        self.rebind(target);
        if let Err(err) = self.store.dispatch(ModelAction::Select(Some(id.clone()))) {
            log::warn!("Store rejected selection of {}: {}", id, err);
            self.refresh_selection();
            return ClickOutcome::Ignored;
        }
        log::debug!("Selected {} by pointer", id);
        ClickOutcome::Selected(id)
    }

    /// Route a decoded pick-pass hit.
    pub fn handle_pick(&mut self, hit: PickHit) -> ClickOutcome {
        let key = hit.key;
        match key.kind {
            PickKind::None => ClickOutcome::Ignored,
            PickKind::SceneNode => match key.handle() {
                Some(handle) => self.handle_click(handle),
                None => ClickOutcome::Ignored,
            },
            PickKind::ManipulatorAxis | PickKind::ManipulatorPlane | PickKind::ManipulatorRing => {
                let grab = ManipulatorHandle::from_sub_id(key.sub_id);
                match (key.handle(), grab) {
                    (Some(handle), Some(grab))
                        if self.binder.is_target(handle) && grab.mode() == self.binder.mode() =>
                    {
                        ClickOutcome::Manipulator(grab)
                    }
                    _ => ClickOutcome::Ignored,
                }
            }
        }
    }

    /// Everything the pick pass should stage this frame.
    pub fn pick_keys(&self) -> Vec<PickKey> {
        let mut keys = self.runtime.pick_keys();
        keys.extend(self.binder.pick_keys());
        keys
    }

    pub fn set_mode(&mut self, mode: ManipulatorMode) {
        if self.binder.set_mode(mode) {
            log::debug!("Manipulator mode set to {}", mode);
            self.commands.push(RenderCommand::SetManipulatorMode(mode));
        }
    }

    /// Live transform of the attached node, for the widget to edit in place.
    pub fn manipulator_transform_mut(&mut self) -> Option<&mut Transform> {
        let handle = self.binder.target()?;
        self.runtime.node_mut(handle).map(|node| &mut node.transform)
    }

    pub fn handle_drag_started(&mut self, handle: RenderHandle) -> bool {
        let Some(id) = self.runtime.resolve(handle).cloned() else {
            return false;
        };
        if !self.binder.begin_drag(handle, id) {
            log::trace!("Drag start on unattached node {:?} ignored", handle);
            return false;
        }
        self.commands.push(RenderCommand::SetOrbitControlsEnabled(false));
        true
    }

    /// Manipulator "object changed" event. Returns true when the change was
    /// committed or buffered.
    pub fn handle_object_changed(&mut self, handle: RenderHandle) -> bool {
        if !self.binder.is_target(handle) {
            log::trace!("Change event for detached node {:?} dropped", handle);
            return false;
        }
        let Some(selected) = self.store.selected_id().cloned() else {
            return false;
        };
        let Some(node) = self.runtime.node(handle) else {
            return false;
        };
        if node.model_id() != &selected {
            return false;
        }
        let transform = sync::sanitize_transform(&node.transform);
        if self.config.sync_policy == SyncPolicy::TrailingEdge {
            if let Some(session) = self.binder.drag_mut() {
                session.pending = Some(transform);
                return true;
            }
        }
        self.commit(&selected, transform);
        true
    }

    pub fn handle_drag_ended(&mut self, handle: RenderHandle) -> bool {
        let Some(session) = self.binder.end_drag(handle) else {
            return false;
        };
        self.close_drag(session);
        true
    }
}
