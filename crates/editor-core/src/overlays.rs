//! Overlay operations: add from a template, retime, edit props, remove.

use launchreel_project_model::{
    new_id, OverlayKind, OverlayTemplate, Props, TemplateLibrary, TemplateRef, TimelineComponent,
};
use serde_json::Value;

use crate::error::{EditError, EditResult};
use crate::timeline::Timeline;

impl Timeline {
    /// Instantiate a template at project time `at`. Returns the ids of the
    /// overlays created: one in the common case, one per recorded click for
    /// ripple effects.
    pub fn add_overlay(
        &mut self,
        library: &TemplateLibrary,
        template: &TemplateRef,
        at: f64,
        props_override: Option<Props>,
    ) -> EditResult<Vec<String>> {
        let template = library.resolve(template)?;
        let at = at.max(0.0);

        let mut props = template.default_props.clone();
        if let Some(overrides) = props_override {
            for (key, value) in overrides {
                props.insert(key, value);
            }
        }
        let duration = props
            .get("duration")
            .and_then(Value::as_f64)
            .filter(|d| *d > 0.0)
            .unwrap_or(self.tuning.default_overlay_duration);

        let ids = match template.kind {
            OverlayKind::FreezeFrame => {
                vec![self.insert_freeze_frame(&template, at, duration, props)]
            }
            OverlayKind::RippleEffect => {
                let placed = self.place_click_ripples(&template, at, &props);
                if placed.is_empty() {
                    vec![self.push_overlay(&template, at, duration, props)]
                } else {
                    placed
                }
            }
            _ => vec![self.push_overlay(&template, at, duration, props)],
        };

        self.commit();
        tracing::info!(
            template = %template.id,
            kind = %template.kind,
            at,
            count = ids.len(),
            "Added overlay"
        );
        Ok(ids)
    }

    /// Rewrite an overlay's bounds. For freeze-frames a change in length
    /// ripples through everything after the old end.
    pub fn update_timing(&mut self, id: &str, start_time: f64, end_time: f64) -> EditResult<()> {
        let min_duration = self.tuning.min_clip_duration;
        let overlay = self
            .overlay(id)
            .ok_or_else(|| EditError::OverlayNotFound(id.to_string()))?;

        let start_time = start_time.max(0.0);
        let end_time = end_time.max(start_time + min_duration);

        if overlay.kind == OverlayKind::FreezeFrame {
            self.retime_freeze_frame(id, start_time, end_time);
        } else if let Some(overlay) = self.overlays.iter_mut().find(|o| o.id == id) {
            overlay.start_time = start_time;
            overlay.end_time = end_time;
        }

        self.commit();
        Ok(())
    }

    /// Shallow-merge `partial` into an overlay's props. A numeric `duration`
    /// on a freeze-frame is applied as a timing edit so it ripples.
    pub fn update_props(&mut self, id: &str, mut partial: Props) -> EditResult<()> {
        let overlay = self
            .overlay(id)
            .ok_or_else(|| EditError::OverlayNotFound(id.to_string()))?;

        if overlay.kind == OverlayKind::FreezeFrame {
            if let Some(duration) = partial.get("duration").and_then(Value::as_f64) {
                let start = overlay.start_time;
                partial.remove("duration");
                self.update_timing(id, start, start + duration)?;
            }
        }

        if let Some(overlay) = self.overlays.iter_mut().find(|o| o.id == id) {
            overlay.merge_props(partial);
        }
        Ok(())
    }

    /// Remove an overlay. If it is part of the current selection, the whole
    /// selection goes with it.
    pub fn remove_overlay(&mut self, id: &str) -> EditResult<usize> {
        if self.overlay(id).is_none() {
            return Err(EditError::OverlayNotFound(id.to_string()));
        }
        let doomed: Vec<String> = if self.selection.contains_overlay(id) {
            self.selection.overlays().to_vec()
        } else {
            vec![id.to_string()]
        };

        let before = self.overlays.len();
        self.overlays.retain(|o| !doomed.contains(&o.id));
        let removed = before - self.overlays.len();
        self.commit();
        tracing::info!(removed, "Removed overlays");
        Ok(removed)
    }

    /// Append one overlay spanning `[at, at + duration]`, clamped to the
    /// project end. Callers commit.
    pub(crate) fn push_overlay(
        &mut self,
        template: &OverlayTemplate,
        at: f64,
        duration: f64,
        props: Props,
    ) -> String {
        let overlay = TimelineComponent {
            id: new_id(template.kind.as_str()),
            kind: template.kind.clone(),
            name: template.name.clone(),
            start_time: at,
            end_time: self.clamped_end(at, duration),
            props,
            row: 0,
        };
        let id = overlay.id.clone();
        self.overlays.push(overlay);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use launchreel_common::EditorTuning;
    use launchreel_project_model::VideoClip;
    use serde_json::json;

    fn clip(start: f64, end: f64) -> VideoClip {
        VideoClip {
            id: "c1".to_string(),
            start,
            end,
            source_start: 0.0,
            source_end: end - start,
            name: "screen".to_string(),
            row: 0,
            media_duration: Some(end - start),
            events: vec![],
        }
    }

    fn timeline() -> Timeline {
        Timeline::from_parts(vec![clip(0.0, 10.0)], vec![], EditorTuning::default()).unwrap()
    }

    fn props(value: Value) -> Props {
        match value {
            Value::Object(map) => map,
            _ => Props::new(),
        }
    }

    #[test]
    fn test_add_uses_declared_duration() {
        let mut tl = timeline();
        let library = TemplateLibrary::new();
        let ids = tl
            .add_overlay(&library, &"floating-text".into(), 1.0, None)
            .unwrap();
        let overlay = tl.overlay(&ids[0]).unwrap();
        assert_eq!(overlay.kind, OverlayKind::FloatingText);
        assert_eq!((overlay.start_time, overlay.end_time), (1.0, 3.0));
    }

    #[test]
    fn test_add_without_declared_duration_defaults_to_three_seconds() {
        let mut tl = timeline();
        let library = TemplateLibrary::new();
        let ids = tl
            .add_overlay(&library, &"browser-frame".into(), 2.0, None)
            .unwrap();
        assert_eq!(tl.overlay(&ids[0]).unwrap().end_time, 5.0);
    }

    #[test]
    fn test_add_clamps_to_project_end() {
        let mut tl = timeline();
        let library = TemplateLibrary::new();
        let ids = tl
            .add_overlay(&library, &"browser-frame".into(), 9.0, None)
            .unwrap();
        assert_eq!(tl.overlay(&ids[0]).unwrap().end_time, 10.0);
        assert_eq!(tl.project_duration(), 10.0);
    }

    #[test]
    fn test_add_with_override_props() {
        let mut tl = timeline();
        let library = TemplateLibrary::new();
        let ids = tl
            .add_overlay(
                &library,
                &"floating-text".into(),
                0.0,
                Some(props(json!({"text": "Launch day", "duration": 4}))),
            )
            .unwrap();
        let overlay = tl.overlay(&ids[0]).unwrap();
        assert_eq!(overlay.props["text"], json!("Launch day"));
        assert_eq!(overlay.end_time, 4.0);
    }

    #[test]
    fn test_add_unknown_template_is_rejected() {
        let mut tl = timeline();
        let err = tl
            .add_overlay(&TemplateLibrary::new(), &"nope".into(), 0.0, None)
            .unwrap_err();
        assert_eq!(err, EditError::TemplateNotFound("nope".to_string()));
        assert!(tl.overlays().is_empty());
    }

    #[test]
    fn test_add_custom_template_becomes_custom_code() {
        let mut tl = timeline();
        let mut library = TemplateLibrary::new();
        let template = library.create_custom(Some("Badge"), None, Some("<b>New</b>"), None);
        let ids = tl
            .add_overlay(&library, &TemplateRef::Id(template.id), 0.0, None)
            .unwrap();
        let overlay = tl.overlay(&ids[0]).unwrap();
        assert_eq!(overlay.kind, OverlayKind::CustomCode);
        assert_eq!(overlay.props["html"], json!("<b>New</b>"));
        assert_eq!(overlay.props["opacity"], json!(1));
    }

    #[test]
    fn test_update_timing_and_props() {
        let mut tl = timeline();
        let library = TemplateLibrary::new();
        let id = tl
            .add_overlay(&library, &"terminal".into(), 0.0, None)
            .unwrap()
            .remove(0);

        tl.update_timing(&id, 4.0, 14.0).unwrap();
        assert_eq!(tl.project_duration(), 14.0);

        tl.update_props(&id, props(json!({"title": "zsh", "nested": {"a": 1}})))
            .unwrap();
        let overlay = tl.overlay(&id).unwrap();
        assert_eq!(overlay.props["title"], json!("zsh"));
        assert_eq!(overlay.props["nested"], json!({"a": 1}));
    }

    #[test]
    fn test_remove_takes_whole_selection() {
        let mut tl = timeline();
        let library = TemplateLibrary::new();
        let a = tl.add_overlay(&library, &"terminal".into(), 0.0, None).unwrap().remove(0);
        let b = tl.add_overlay(&library, &"terminal".into(), 2.0, None).unwrap().remove(0);
        let c = tl.add_overlay(&library, &"terminal".into(), 4.0, None).unwrap().remove(0);

        tl.select_overlay(&a, true).unwrap();
        tl.select_overlay(&b, true).unwrap();
        assert_eq!(tl.remove_overlay(&a).unwrap(), 2);
        assert_eq!(tl.overlays().len(), 1);
        assert!(tl.selection().is_empty());

        assert_eq!(tl.remove_overlay(&c).unwrap(), 1);
        assert!(tl.overlays().is_empty());
    }
}
