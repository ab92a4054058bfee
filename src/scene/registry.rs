//! Model Registry: the ordered collection of model records plus the single
//! selected-model identifier. Mutated only through [`ModelAction`] dispatch.

use super::{GeometryKind, ModelId, ModelRecord, Transform, Vec3Tuple};

#[derive(Debug, Clone, PartialEq)]
pub enum ModelAction {
    /// Append a caller-built record and select it.
    Add(ModelRecord),
    Select(Option<ModelId>),
    UpdateTransform { id: ModelId, transform: Transform },
    /// Append a record with a fresh id. Missing tuples take identity defaults.
    Create {
        kind: GeometryKind,
        position: Option<Vec3Tuple>,
        rotation: Option<Vec3Tuple>,
        scale: Option<Vec3Tuple>,
    },
    Remove(ModelId),
    Duplicate(ModelId),
}

impl ModelAction {
    pub fn select(id: impl Into<ModelId>) -> Self {
        Self::Select(Some(id.into()))
    }

    pub fn create(kind: GeometryKind) -> Self {
        Self::Create {
            kind,
            position: None,
            rotation: None,
            scale: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no model with id {0}")]
    UnknownModel(ModelId),
    #[error("model id {0} is already in use")]
    DuplicateId(ModelId),
}

/// What a single dispatch changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreChange {
    /// Membership of the record collection changed (add/create/duplicate/remove).
    pub collection_changed: bool,
    pub selection_changed: bool,
    pub transform_updated: Option<ModelId>,
    pub created: Option<ModelId>,
}

impl StoreChange {
    pub fn is_empty(&self) -> bool {
        !self.collection_changed
            && !self.selection_changed
            && self.transform_updated.is_none()
            && self.created.is_none()
    }
}

/// Read + dispatch surface the editor consumes.
pub trait ModelStore {
    fn models(&self) -> &[ModelRecord];

    fn selected_id(&self) -> Option<&ModelId>;

    fn dispatch(&mut self, action: ModelAction) -> Result<StoreChange, RegistryError>;

    fn model(&self, id: &ModelId) -> Option<&ModelRecord> {
        self.models().iter().find(|model| &model.id == id)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelRecord>,
    selected: Option<ModelId>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            selected: None,
        }
    }

    /// Seed a registry with existing records. Nothing is selected.
    pub fn from_models(models: Vec<ModelRecord>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for model in models {
            if registry.position(&model.id).is_some() {
                return Err(RegistryError::DuplicateId(model.id));
            }
            registry.models.push(model);
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn position(&self, id: &ModelId) -> Option<usize> {
        self.models.iter().position(|model| &model.id == id)
    }

    fn push_and_select(&mut self, record: ModelRecord) -> StoreChange {
        let id = record.id.clone();
        self.models.push(record);
        let selection_changed = self.selected.as_ref() != Some(&id);
        self.selected = Some(id.clone());
        StoreChange {
            collection_changed: true,
            selection_changed,
            transform_updated: None,
            created: Some(id),
        }
    }
}

impl ModelStore for ModelRegistry {
    fn models(&self) -> &[ModelRecord] {
        &self.models
    }

    fn selected_id(&self) -> Option<&ModelId> {
        self.selected.as_ref()
    }

    fn dispatch(&mut self, action: ModelAction) -> Result<StoreChange, RegistryError> {
        match action {
            ModelAction::Add(record) => {
                if self.position(&record.id).is_some() {
                    return Err(RegistryError::DuplicateId(record.id));
                }
                Ok(self.push_and_select(record))
            }
            ModelAction::Select(Some(id)) => {
                if self.position(&id).is_none() {
                    return Err(RegistryError::UnknownModel(id));
                }
                if self.selected.as_ref() == Some(&id) {
                    return Ok(StoreChange::default());
                }
                self.selected = Some(id);
                Ok(StoreChange {
                    selection_changed: true,
                    ..StoreChange::default()
                })
            }
            ModelAction::Select(None) => Ok(StoreChange {
                selection_changed: self.selected.take().is_some(),
                ..StoreChange::default()
            }),
            ModelAction::UpdateTransform { id, transform } => {
                let index = self
                    .position(&id)
                    .ok_or_else(|| RegistryError::UnknownModel(id.clone()))?;
                let model = &mut self.models[index];
                if model.transform() == transform {
                    return Ok(StoreChange::default());
                }
                model.set_transform(transform);
                Ok(StoreChange {
                    transform_updated: Some(id),
                    ..StoreChange::default()
                })
            }
            ModelAction::Create {
                kind,
                position,
                rotation,
                scale,
            } => {
                let defaults = Transform::IDENTITY;
                let record = ModelRecord::new(
                    ModelId::generate(),
                    kind,
                    Transform::new(
                        position.unwrap_or(defaults.position),
                        rotation.unwrap_or(defaults.rotation),
                        scale.unwrap_or(defaults.scale),
                    ),
                );
                Ok(self.push_and_select(record))
            }
            ModelAction::Remove(id) => {
                let index = self
                    .position(&id)
                    .ok_or_else(|| RegistryError::UnknownModel(id.clone()))?;
                self.models.remove(index);
                let selection_changed = self.selected.as_ref() == Some(&id);
                if selection_changed {
                    self.selected = None;
                }
                Ok(StoreChange {
                    collection_changed: true,
                    selection_changed,
                    ..StoreChange::default()
                })
            }
            ModelAction::Duplicate(id) => {
                let copy = self
                    .model(&id)
                    .map(ModelRecord::duplicate)
                    .ok_or(RegistryError::UnknownModel(id))?;
                Ok(self.push_and_select(copy))
            }
        }
    }
}
