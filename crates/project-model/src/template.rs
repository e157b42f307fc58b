//! Overlay template library.
//!
//! A template supplies the kind, display name and default props for a new
//! overlay. The library holds the built-in set plus user-authored HTML/CSS
//! templates, which are always normalized to the `custom-code` kind.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::overlay::{OverlayKind, Props};
use crate::project::new_id;

/// A library entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayTemplate {
    pub id: String,

    /// Kind of overlay this template produces. Built-in ids double as the kind.
    #[serde(rename = "type", default = "custom_kind")]
    pub kind: OverlayKind,

    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub default_props: Props,

    #[serde(default)]
    pub is_custom: bool,
}

fn custom_kind() -> OverlayKind {
    OverlayKind::CustomCode
}

/// How `add` names the template to instantiate.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateRef {
    /// Look the template up in the library.
    Id(String),
    /// Use this template object directly (custom templates picked from a file).
    Inline(OverlayTemplate),
}

impl From<&str> for TemplateRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

/// Errors raised while importing or resolving templates.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Template not found: {id}")]
    NotFound { id: String },

    #[error("Invalid component file: {message}")]
    Invalid { message: String },

    #[error("Failed to parse template: {0}")]
    Parse(#[from] serde_json::Error),
}

impl OverlayTemplate {
    /// Duration declared by `defaultProps.duration`, if any.
    pub fn declared_duration(&self) -> Option<f64> {
        self.default_props
            .get("duration")
            .and_then(Value::as_f64)
            .filter(|d| *d > 0.0)
    }

    /// Rewrite a user template into the canonical `custom-code` shape with
    /// every layout prop present.
    pub fn normalized(&self) -> OverlayTemplate {
        if !self.is_custom && self.kind != OverlayKind::CustomCode {
            return self.clone();
        }
        let mut props = custom_code_defaults();
        for (key, value) in &self.default_props {
            props.insert(key.clone(), value.clone());
        }
        OverlayTemplate {
            id: self.id.clone(),
            kind: OverlayKind::CustomCode,
            name: self.name.clone(),
            description: self.description.clone(),
            default_props: props,
            is_custom: true,
        }
    }
}

/// Layout and content defaults for custom HTML/CSS overlays.
pub fn custom_code_defaults() -> Props {
    props(json!({
        "html": "<div class=\"my-box\">Custom Component</div>",
        "css": ".my-box { color: white; font-size: 32px; }",
        "position": "center",
        "x": 50,
        "y": 50,
        "width": 400,
        "scale": 1,
        "opacity": 1
    }))
}

fn props(value: Value) -> Props {
    match value {
        Value::Object(map) => map,
        _ => Props::new(),
    }
}

fn builtin(kind: OverlayKind, name: &str, description: &str, defaults: Value) -> OverlayTemplate {
    OverlayTemplate {
        id: kind.as_str().to_string(),
        kind,
        name: name.to_string(),
        description: description.to_string(),
        default_props: props(defaults),
        is_custom: false,
    }
}

/// The built-in template set.
pub fn builtin_templates() -> Vec<OverlayTemplate> {
    vec![
        builtin(
            OverlayKind::FloatingText,
            "Floating Punch Text",
            "Animated floating text with customizable effects",
            json!({"text": "Your Text Here", "fontSize": 48, "color": "#ffffff", "animation": "float", "duration": 2}),
        ),
        builtin(
            OverlayKind::BrowserFrame,
            "Browser Frame",
            "Floating browser mockup frame",
            json!({"url": "yoursite.com", "title": "Your Product", "width": 800, "shadow": true}),
        ),
        builtin(
            OverlayKind::DeviceMockup,
            "Device Mockup",
            "Mobile or tablet device mockup",
            json!({"device": "iphone", "orientation": "portrait", "scale": 1}),
        ),
        builtin(
            OverlayKind::CalloutBubble,
            "Feature Callout",
            "Animated callout bubble",
            json!({"text": "Key Feature", "position": "top-right", "color": "#3b82f6", "size": "medium"}),
        ),
        builtin(
            OverlayKind::Terminal,
            "Terminal Window",
            "Typewriter terminal effect",
            json!({"code": "npm install your-package", "theme": "dark", "speed": 50}),
        ),
        builtin(
            OverlayKind::TextHighlight,
            "Text Highlight",
            "Highlighted text animation",
            json!({"text": "Important Feature", "highlightColor": "#fbbf24", "animationStyle": "sweep"}),
        ),
        builtin(
            OverlayKind::PremiumCursor,
            "Premium Cursor",
            "Smooth animated cursor path",
            json!({"startX": 20, "startY": 20, "endX": 70, "endY": 60, "size": 32, "clickEffect": true}),
        ),
        builtin(
            OverlayKind::ProblemStatement,
            "Problem Statement",
            "Full-screen problem statement card",
            json!({"title": "The Problem", "description": "Describe the pain point", "accentColor": "#ef4444"}),
        ),
        builtin(
            OverlayKind::FreezeFrame,
            "Freeze Frame",
            "Pause the video and annotate a still frame",
            json!({
                "duration": 5,
                "dimOpacity": 0.7,
                "highlights": [{
                    "id": "1",
                    "name": "Highlight 1",
                    "x": 20,
                    "y": 20,
                    "width": 30,
                    "height": 30,
                    "startTime": 0,
                    "duration": 3,
                    "color": "#3b82f6"
                }]
            }),
        ),
        builtin(
            OverlayKind::ZoomArea,
            "Zoom Area",
            "Zoom into a region of the video",
            json!({"scale": 2, "x": 50, "y": 50}),
        ),
        builtin(
            OverlayKind::RippleEffect,
            "Click Ripple",
            "Ripple highlight at a click position",
            json!({"x": 50, "y": 50, "size": 50, "color": "#3b82f6", "duration": 1}),
        ),
        builtin(
            OverlayKind::Audio,
            "Audio",
            "Background music or voice-over",
            json!({"src": "", "volume": 1, "loop": false}),
        ),
        builtin(
            OverlayKind::CameraOverlay,
            "Camera Overlay",
            "Picture-in-picture webcam bubble",
            json!({"videoSrc": "", "position": "bottom-right", "size": 200, "shape": "circle"}),
        ),
        builtin(
            OverlayKind::VideoOverlay,
            "Video Overlay",
            "Secondary video layered over the main track",
            json!({"videoSrc": "", "x": 50, "y": 50, "width": 40, "opacity": 1}),
        ),
    ]
}

/// Built-in templates plus user-authored custom ones.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    builtins: Vec<OverlayTemplate>,
    custom: Vec<OverlayTemplate>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self {
            builtins: builtin_templates(),
            custom: Vec::new(),
        }
    }

    /// Library with previously saved custom templates.
    pub fn with_custom(custom: Vec<OverlayTemplate>) -> Self {
        Self {
            builtins: builtin_templates(),
            custom,
        }
    }

    pub fn builtins(&self) -> &[OverlayTemplate] {
        &self.builtins
    }

    pub fn custom(&self) -> &[OverlayTemplate] {
        &self.custom
    }

    /// Look up a template by id, built-ins first.
    pub fn find(&self, id: &str) -> Option<&OverlayTemplate> {
        self.builtins
            .iter()
            .chain(self.custom.iter())
            .find(|t| t.id == id)
    }

    /// Resolve a reference to a ready-to-instantiate template.
    pub fn resolve(&self, template: &TemplateRef) -> Result<OverlayTemplate, TemplateError> {
        match template {
            TemplateRef::Id(id) => self
                .find(id)
                .map(OverlayTemplate::normalized)
                .ok_or_else(|| TemplateError::NotFound { id: id.clone() }),
            TemplateRef::Inline(t) => Ok(t.normalized()),
        }
    }

    /// Author a new custom HTML/CSS template.
    pub fn create_custom(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        html: Option<&str>,
        css: Option<&str>,
    ) -> OverlayTemplate {
        let mut default_props = custom_code_defaults();
        if let Some(html) = html.filter(|h| !h.is_empty()) {
            default_props.insert("html".to_string(), json!(html));
        }
        if let Some(css) = css.filter(|c| !c.is_empty()) {
            default_props.insert("css".to_string(), json!(css));
        }
        let template = OverlayTemplate {
            id: new_id("custom-template"),
            kind: OverlayKind::CustomCode,
            name: name.unwrap_or("New Component").to_string(),
            description: description.unwrap_or("Custom HTML/CSS Component").to_string(),
            default_props,
            is_custom: true,
        };
        self.custom.push(template.clone());
        template
    }

    /// Delete a custom template. Returns whether anything was removed.
    pub fn remove_custom(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|t| t.id != id);
        self.custom.len() != before
    }

    /// Serialize a template for sharing.
    pub fn export_json(template: &OverlayTemplate) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(template)?)
    }

    /// Import a shared template. A fresh id avoids collisions with the original.
    pub fn import_json(&mut self, content: &str) -> Result<OverlayTemplate, TemplateError> {
        let parsed: OverlayTemplate = serde_json::from_str(content)?;
        let has_html = parsed
            .default_props
            .get("html")
            .and_then(Value::as_str)
            .is_some_and(|h| !h.is_empty());
        if !has_html {
            return Err(TemplateError::Invalid {
                message: "defaultProps.html is missing".to_string(),
            });
        }

        let imported = OverlayTemplate {
            id: new_id("imported"),
            name: format!("{} (Imported)", parsed.name),
            is_custom: true,
            ..parsed
        }
        .normalized();
        self.custom.push(imported.clone());
        Ok(imported)
    }
}
