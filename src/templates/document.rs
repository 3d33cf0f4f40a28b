//! Template document model stored in `templates.pages`.
//!
//! Field names serialize in camelCase to match what the editor and the
//! main application read.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
    Conic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

/// Solid color or gradient fill; used for page backgrounds and shape fills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fill {
    Gradient { gradient: Gradient },
    Solid { color: String },
}

impl Fill {
    pub fn solid(color: impl Into<String>) -> Self {
        Fill::Solid {
            color: color.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_family: String,
    pub font_weight: u16,
    pub font_style: String,
    pub font_size: f64,
    pub line_height: f64,
    pub letter_spacing: f64,
    pub fill: String,
    pub text_align: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoResize {
    Width,
    Height,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grayscale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Polygon,
    Line,
    Custom,
}

/// Properties shared by every element kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementBase {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub position: Point,
    pub rotation: f64,
    pub scale: Point,
    pub opacity: f64,
    pub z_index: i32,
}

impl ElementBase {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: Point, z_index: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            visible: true,
            locked: false,
            position,
            rotation: 0.0,
            scale: Point { x: 1.0, y: 1.0 },
            opacity: 1.0,
            z_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(rename = "box")]
    pub size: Size,
    pub content: String,
    pub style: TextStyle,
    pub auto_resize: AutoResize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(rename = "box")]
    pub size: Size,
    pub asset_id: String,
    pub preserve_aspect_ratio: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ImageFilters>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    #[serde(flatten)]
    pub base: ElementBase,
    #[serde(rename = "box")]
    pub size: Size,
    pub shape: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    pub stroke: Option<Stroke>,
    pub fill: Option<Fill>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Image(ImageElement),
    Shape(ShapeElement),
}

impl Element {
    pub fn base(&self) -> &ElementBase {
        match self {
            Element::Text(e) => &e.base,
            Element::Image(e) => &e.base,
            Element::Shape(e) => &e.base,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub size: Size,
    pub background: Option<Fill>,
    pub layers: Vec<Layer>,
}
