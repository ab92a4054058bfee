use crate::config::HighlightColors;
use crate::scene::{ModelId, RenderHandle, SceneRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    #[default]
    Neutral,
    Selected,
}

impl Appearance {
    pub fn color(self, colors: &HighlightColors) -> [f32; 4] {
        match self {
            Self::Neutral => rgb_to_float4(colors.neutral),
            Self::Selected => rgb_to_float4(colors.selected),
        }
    }
}

pub fn rgb_to_float4(rgb: u32) -> [f32; 4] {
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Reset every node to neutral, then mark the node owned by `selected`.
///
/// Always a full pass over the node set. Returns the highlighted node, or
/// `None` when nothing is selected or the id has no node.
pub fn apply_highlight(runtime: &mut SceneRuntime, selected: Option<&ModelId>) -> Option<RenderHandle> {
    for node in runtime.nodes_mut() {
        node.set_appearance(Appearance::Neutral);
    }
    let node = runtime.node_for_model_mut(selected?)?;
    node.set_appearance(Appearance::Selected);
    Some(node.handle())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GeometryKind, ModelRecord, Transform};

    fn runtime_with(ids: &[&str]) -> SceneRuntime {
        let models: Vec<ModelRecord> = ids
            .iter()
            .map(|id| ModelRecord::new(*id, GeometryKind::Box, Transform::IDENTITY))
            .collect();
        let mut runtime = SceneRuntime::new();
        runtime.rebuild(&models);
        runtime
    }

    fn selected_count(runtime: &SceneRuntime) -> usize {
        runtime
            .nodes()
            .iter()
            .filter(|node| node.appearance() == Appearance::Selected)
            .count()
    }

    #[test]
    fn exactly_one_node_is_selected() {
        let mut runtime = runtime_with(&["a", "b", "c"]);
        apply_highlight(&mut runtime, Some(&"a".into()));
        let handle = apply_highlight(&mut runtime, Some(&"c".into())).unwrap();
        assert_eq!(selected_count(&runtime), 1);
        assert_eq!(runtime.node(handle).unwrap().model_id(), &ModelId::from("c"));
    }

    #[test]
    fn no_selection_leaves_everything_neutral() {
        let mut runtime = runtime_with(&["a", "b"]);
        apply_highlight(&mut runtime, Some(&"b".into()));
        assert_eq!(apply_highlight(&mut runtime, None), None);
        assert_eq!(selected_count(&runtime), 0);
    }

    #[test]
    fn missing_id_is_treated_as_no_selection() {
        let mut runtime = runtime_with(&["a"]);
        apply_highlight(&mut runtime, Some(&"a".into()));
        assert_eq!(apply_highlight(&mut runtime, Some(&"gone".into())), None);
        assert_eq!(selected_count(&runtime), 0);
    }

    #[test]
    fn default_colors_are_green_and_blue() {
        let colors = HighlightColors::default();
        assert_eq!(Appearance::Neutral.color(&colors), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(Appearance::Selected.color(&colors), [0.0, 0.0, 1.0, 1.0]);
    }
}
