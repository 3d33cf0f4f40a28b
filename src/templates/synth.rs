//! Build template documents from flat template definitions.
//!
//! Ids are derived from the template id so repeated runs produce identical
//! documents. Geometry follows the story renderer: a 1080x1920 canvas with a
//! safe area of 250/100/80/80 (top/bottom/left/right).

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::document::{
    AutoResize, Element, ElementBase, Fill, Gradient, GradientKind, GradientStop, ImageElement,
    ImageFilters, Layer, Page, Point, ShapeElement, ShapeKind, Size, Stroke, TextElement,
    TextStyle,
};
use crate::extract::{TemplateConfig, TemplateDefinition};

pub const CANVAS_WIDTH: f64 = 1080.0;
pub const CANVAS_HEIGHT: f64 = 1920.0;

const SAFE_TOP: f64 = 250.0;
const SAFE_BOTTOM: f64 = 100.0;
const SAFE_LEFT: f64 = 80.0;
const SAFE_RIGHT: f64 = 80.0;

const LOGO_SIZE: f64 = 180.0;
const TITLE_FONT_SIZE: f64 = 52.0;
const SUBTITLE_FONT_SIZE: f64 = 32.0;
const LABEL_FONT_SIZE: f64 = 32.0;
const VALUE_FONT_SIZE: f64 = 52.0;
const FONT_FAMILY: &str = "Inter, sans-serif";

/// Which element set the synthesized page carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// One empty layer.
    #[default]
    Blank,
    /// Title, date, logo, metric grid and route frame.
    Story,
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blank" => Ok(Layout::Blank),
            "story" => Ok(Layout::Story),
            other => Err(format!("unknown layout '{other}', expected blank or story")),
        }
    }
}

/// Page background for a `backgroundMode`.
pub fn background_for(config: &TemplateConfig) -> Fill {
    match config.background_mode.as_deref() {
        Some("gradient") => Fill::Gradient {
            gradient: Gradient {
                kind: GradientKind::Linear,
                stops: vec![
                    GradientStop {
                        offset: 0.0,
                        color: "#FF6B6B".to_string(),
                    },
                    GradientStop {
                        offset: 1.0,
                        color: "#4ECDC4".to_string(),
                    },
                ],
                angle: Some(135.0),
            },
        },
        Some("solid") => Fill::solid("#000000"),
        _ => Fill::solid("#FFFFFF"),
    }
}

/// Hex color for a `fontColor` value; named colors are mapped, anything else passes through.
pub fn font_fill(config: &TemplateConfig) -> String {
    match config.font_color.as_deref() {
        None | Some("white") => "#FFFFFF".to_string(),
        Some("black") => "#000000".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Tags derived from the badge: the lowercased badge, or nothing.
pub fn tags_for(template: &TemplateDefinition) -> Vec<String> {
    template
        .badge
        .as_deref()
        .map(|badge| vec![badge.to_lowercase()])
        .unwrap_or_default()
}

/// Logo asset shown on a club's story pages.
pub fn logo_asset(club_id: &str) -> &'static str {
    match club_id {
        "hedonism" => "/logo_HEDONISM.svg",
        _ => "/logo_NIP.svg",
    }
}

/// Build the page list for a template.
pub fn build_pages(template: &TemplateDefinition, club_id: &str, layout: Layout) -> Vec<Page> {
    let page_id = format!("{}-page-1", template.id);
    let layer_id = format!("{}-layer-1", template.id);

    let elements = match layout {
        Layout::Blank => Vec::new(),
        Layout::Story => story_elements(template, club_id, &layer_id),
    };

    vec![Page {
        id: page_id,
        name: "Story 1".to_string(),
        size: Size {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        },
        background: Some(background_for(&template.config)),
        layers: vec![Layer {
            id: layer_id,
            name: "Main Layer".to_string(),
            visible: true,
            locked: false,
            elements,
        }],
    }]
}

fn text_style(fill: &str, size: f64, weight: u16) -> TextStyle {
    TextStyle {
        font_family: FONT_FAMILY.to_string(),
        font_weight: weight,
        font_style: "normal".to_string(),
        font_size: size,
        line_height: 1.2,
        letter_spacing: 0.0,
        fill: fill.to_string(),
        text_align: "left".to_string(),
        text_transform: None,
    }
}

fn text(
    id: String,
    name: &str,
    content: &str,
    position: Point,
    size: Size,
    style: TextStyle,
    z_index: i32,
) -> Element {
    Element::Text(TextElement {
        base: ElementBase::new(id, name, position, z_index),
        size,
        content: content.to_string(),
        style,
        auto_resize: AutoResize::Height,
    })
}

fn story_elements(template: &TemplateDefinition, club_id: &str, prefix: &str) -> Vec<Element> {
    let fill = font_fill(&template.config);
    let mono = template.config.is_mono.unwrap_or(false);

    let logo_x = CANVAS_WIDTH - LOGO_SIZE - SAFE_RIGHT;
    let title_width = logo_x - SAFE_LEFT - 20.0;
    let title_height = (TITLE_FONT_SIZE * 1.2).round();

    let mut elements = vec![
        text(
            format!("{prefix}-title"),
            "Title",
            &template.name,
            Point {
                x: SAFE_LEFT,
                y: SAFE_TOP,
            },
            Size {
                width: title_width,
                height: title_height,
            },
            text_style(&fill, TITLE_FONT_SIZE, 700),
            1,
        ),
        text(
            format!("{prefix}-date"),
            "Date",
            "DATE",
            Point {
                x: SAFE_LEFT,
                y: SAFE_TOP + title_height + 8.0,
            },
            Size {
                width: title_width,
                height: (SUBTITLE_FONT_SIZE * 1.2).round(),
            },
            TextStyle {
                text_transform: Some("uppercase".to_string()),
                ..text_style(&fill, SUBTITLE_FONT_SIZE, 400)
            },
            2,
        ),
        Element::Image(ImageElement {
            base: ElementBase::new(
                format!("{prefix}-logo"),
                "Logo",
                Point {
                    x: logo_x,
                    y: SAFE_TOP,
                },
                3,
            ),
            size: Size {
                width: LOGO_SIZE,
                height: LOGO_SIZE,
            },
            asset_id: logo_asset(club_id).to_string(),
            preserve_aspect_ratio: true,
            filters: mono.then(|| ImageFilters {
                grayscale: Some(1.0),
                contrast: Some(1.2),
            }),
        }),
    ];

    // Metric grid: speed alone on the bottom row, three metrics on the row above.
    let available = CANVAS_WIDTH - SAFE_LEFT - SAFE_RIGHT;
    let cell_width = available / 3.0;
    let cell_height = VALUE_FONT_SIZE + LABEL_FONT_SIZE + 20.0;
    let first_row = CANVAS_HEIGHT - SAFE_BOTTOM;
    let second_row = first_row - cell_height - 44.0;

    let metrics = [
        ("distance", "Distance", 0.0, second_row),
        ("elevation", "Elevation", 1.0, second_row),
        ("time", "Time", 2.0, second_row),
        ("speed", "Speed", 0.0, first_row),
    ];

    let mut z_index = 4;
    for (key, label, column, baseline) in metrics {
        let x = SAFE_LEFT + column * cell_width;
        elements.push(text(
            format!("{prefix}-{key}-label"),
            &format!("{label} label"),
            &label.to_uppercase(),
            Point {
                x,
                y: baseline - VALUE_FONT_SIZE - 10.0 - LABEL_FONT_SIZE,
            },
            Size {
                width: cell_width,
                height: LABEL_FONT_SIZE,
            },
            text_style(&fill, LABEL_FONT_SIZE, 400),
            z_index,
        ));
        elements.push(text(
            format!("{prefix}-{key}-value"),
            &format!("{label} value"),
            "0",
            Point {
                x,
                y: baseline - VALUE_FONT_SIZE,
            },
            Size {
                width: cell_width,
                height: VALUE_FONT_SIZE,
            },
            text_style(&fill, VALUE_FONT_SIZE, 700),
            z_index + 1,
        ));
        z_index += 2;
    }

    let route_top = SAFE_TOP + LOGO_SIZE + 60.0;
    let route_bottom = second_row - cell_height - 40.0;
    elements.push(Element::Shape(ShapeElement {
        base: ElementBase::new(
            format!("{prefix}-route"),
            "Route",
            Point {
                x: SAFE_LEFT,
                y: route_top,
            },
            0,
        ),
        size: Size {
            width: available,
            height: route_bottom - route_top,
        },
        shape: ShapeKind::Custom,
        corner_radius: None,
        stroke: Some(Stroke {
            color: fill.clone(),
            width: 6.0,
        }),
        fill: None,
    }));

    elements
}
