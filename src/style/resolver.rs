//! Visual representation of rendered groups and clusters.
//!
//! Everything here is a pure function of its inputs. The renderer receives
//! plain style descriptions and never calls back into domain types.

use crate::{
    core::constants::{
        CLUSTER_BASE_RADIUS, CLUSTER_MAX_RADIUS, CLUSTER_RADIUS_STEP, PIN_ICON_SIZE,
    },
    data::model::LocationGroup,
    style::color::Color,
};
use serde::{Deserialize, Serialize};

const LABEL_FONT: &str = "12px Arial";
const LABEL_OFFSET_Y: f64 = 10.0;
const LABEL_HALO_WIDTH: f64 = 3.0;
const CLUSTER_FONT: &str = "bold 14px Arial";
const CLUSTER_FILL_ALPHA: f64 = 0.5;
const CLUSTER_STROKE_ALPHA: f64 = 0.8;
const CLUSTER_STROKE_WIDTH: f64 = 2.0;
const BADGE_SIZE: u32 = 20;
const BADGE_SCALE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub text: String,
    pub font: String,
    pub fill: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
    pub offset_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
}

/// Drop-shaped pin whose tip marks the coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinStyle {
    pub color: Color,
    pub svg: String,
    pub size: u32,
    /// Fractional anchor; `[0.5, 1.0]` is the bottom-centre tip
    pub anchor: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<TextStyle>,
}

/// Circular unit-count badge overlaid at the pin's lower right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeStyle {
    pub count: usize,
    pub svg: String,
    pub size: u32,
    pub scale: f64,
    pub anchor: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleStyle {
    pub radius: f64,
    pub fill: String,
    pub stroke: Stroke,
    pub text: TextStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderStyle {
    Pin(PinStyle),
    Badge(BadgeStyle),
    Circle(CircleStyle),
}

impl RenderStyle {
    pub fn as_pin(&self) -> Option<&PinStyle> {
        match self {
            RenderStyle::Pin(pin) => Some(pin),
            _ => None,
        }
    }

    pub fn as_circle(&self) -> Option<&CircleStyle> {
        match self {
            RenderStyle::Circle(circle) => Some(circle),
            _ => None,
        }
    }
}

/// Pin icon markup for `color`
pub fn pin_svg(color: &Color, size: u32) -> String {
    format!(
        concat!(
            r#"<svg width="{size}" height="{size}" viewBox="0 0 24 24" fill="none" xmlns="http://www.w3.org/2000/svg">"#,
            r#"<defs><filter id="drop-shadow" x="-50%" y="-50%" width="200%" height="200%">"#,
            r##"<feDropShadow dx="1" dy="2" stdDeviation="2" flood-opacity="0.3" flood-color="#000000"/></filter></defs>"##,
            r##"<path d="M21 10c0 7-9 13-9 13s-9-6-9-13a9 9 0 0 1 18 0z" fill="{color}" stroke="#ffffff" stroke-width="2" filter="url(#drop-shadow)"/>"##,
            r##"<circle cx="12" cy="10" r="3" fill="#ffffff" stroke="{color}" stroke-width="1"/>"##,
            "</svg>"
        ),
        size = size,
        color = color.to_hex()
    )
}

fn badge_svg(count: usize) -> String {
    format!(
        concat!(
            r#"<svg width="20" height="20" xmlns="http://www.w3.org/2000/svg">"#,
            r##"<circle cx="10" cy="10" r="10" fill="{fill}" stroke="#fff" stroke-width="2"/>"##,
            r#"<text x="10" y="14" text-anchor="middle" fill="white" font-family="Arial, sans-serif" font-size="12" font-weight="bold">{count}</text>"#,
            "</svg>"
        ),
        fill = format!("rgb({}, {}, {})", Color::BADGE.r, Color::BADGE.g, Color::BADGE.b),
        count = count
    )
}

/// Radius of a cluster circle for `count` members: `min(20 + 2 * count, 50)`
pub fn cluster_radius(count: usize) -> f64 {
    (CLUSTER_BASE_RADIUS + CLUSTER_RADIUS_STEP * count as f64).min(CLUSTER_MAX_RADIUS)
}

/// Styles for a pin of `color` labelled `name` holding `unit_count` units
pub fn pin_styles(
    color: Color,
    name: &str,
    unit_count: usize,
    show_labels: bool,
    size: u32,
) -> Vec<RenderStyle> {
    let label = show_labels.then(|| TextStyle {
        text: name.to_string(),
        font: LABEL_FONT.to_string(),
        fill: Color::LABEL.to_hex(),
        stroke: Some(Stroke {
            color: Color::WHITE.to_hex(),
            width: LABEL_HALO_WIDTH,
        }),
        offset_y: LABEL_OFFSET_Y,
    });

    let mut styles = vec![RenderStyle::Pin(PinStyle {
        color,
        svg: pin_svg(&color, size),
        size,
        anchor: [0.5, 1.0],
        label,
    })];

    if unit_count > 1 {
        styles.push(RenderStyle::Badge(BadgeStyle {
            count: unit_count,
            svg: badge_svg(unit_count),
            size: BADGE_SIZE,
            scale: BADGE_SCALE,
            anchor: [0.0, 1.0],
        }));
    }

    styles
}

/// Pin (plus unit badge for multi-unit groups) in the group's dataset colour
pub fn marker_style(group: &LocationGroup, show_labels: bool) -> Vec<RenderStyle> {
    pin_styles(
        Color::from_dataset(group.color()),
        &group.name,
        group.unit_count(),
        show_labels,
        PIN_ICON_SIZE,
    )
}

/// Circle style for a cluster of `count` groups in `color`
pub fn circle_style(color: Color, count: usize) -> RenderStyle {
    RenderStyle::Circle(CircleStyle {
        radius: cluster_radius(count),
        fill: color.rgba(CLUSTER_FILL_ALPHA),
        stroke: Stroke {
            color: color.rgba(CLUSTER_STROKE_ALPHA),
            width: CLUSTER_STROKE_WIDTH,
        },
        text: TextStyle {
            text: count.to_string(),
            font: CLUSTER_FONT.to_string(),
            fill: Color::WHITE.to_hex(),
            stroke: None,
            offset_y: 0.0,
        },
    })
}

/// Cluster circle coloured after its first member group
pub fn cluster_style(members: &[LocationGroup]) -> RenderStyle {
    let color = Color::from_dataset(members.first().and_then(LocationGroup::color));
    circle_style(color, members.len())
}
