use serde::{Deserialize, Serialize};

use crate::style::{Color, FontStyle};

/// A position in surface-local pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<egui::Pos2> for Point {
    fn from(pos: egui::Pos2) -> Self {
        Self::new(pos.x, pos.y)
    }
}

impl From<Point> for egui::Pos2 {
    fn from(point: Point) -> Self {
        egui::pos2(point.x, point.y)
    }
}

/// Every tool the toolbar offers. Only the drawing tools produce actions;
/// `Select` and `Eraser` can be picked but do nothing on the canvas yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Pencil,
    Rectangle,
    Circle,
    Text,
    Select,
    Eraser,
}

impl ToolKind {
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Pencil,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Text,
        ToolKind::Select,
        ToolKind::Eraser,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pencil => "Pencil",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Text => "Text",
            ToolKind::Select => "Select",
            ToolKind::Eraser => "Eraser",
        }
    }

    /// Tools whose gesture is a pointer drag.
    pub fn is_drag_tool(&self) -> bool {
        matches!(self, ToolKind::Pencil | ToolKind::Rectangle | ToolKind::Circle)
    }

    /// Tools that draw a preview on the overlay while dragging.
    pub fn is_shape_tool(&self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::Circle)
    }
}

/// One committed drawing primitive.
///
/// The serialized form is a flat object tagged by `tool`, with the geometry
/// fields named the way saved drawings have always named them (`startX`,
/// `fontStyle`, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum Action {
    /// Open polyline through `points`, in order.
    Pencil {
        #[serde(default)]
        color: Color,
        points: Vec<Point>,
    },
    /// Axis-aligned rectangle; negative extents flip it around the start corner.
    Rectangle {
        #[serde(default)]
        color: Color,
        #[serde(rename = "startX")]
        start_x: f32,
        #[serde(rename = "startY")]
        start_y: f32,
        width: f32,
        height: f32,
    },
    /// Ellipse inscribed in the (possibly flipped) drag rectangle.
    Circle {
        #[serde(default)]
        color: Color,
        #[serde(rename = "startX")]
        start_x: f32,
        #[serde(rename = "startY")]
        start_y: f32,
        width: f32,
        height: f32,
    },
    /// A text run whose baseline starts at `(start_x, start_y)`.
    Text {
        #[serde(default)]
        color: Color,
        #[serde(rename = "startX")]
        start_x: f32,
        #[serde(rename = "startY")]
        start_y: f32,
        text: String,
        #[serde(rename = "fontStyle", default)]
        font_style: FontStyle,
    },
}

/// The ordered, authoritative list of what is drawn. Index order is z-order.
pub type ActionLog = Vec<Action>;

impl Action {
    /// Build a rectangle or circle from a drag gesture. Any other tool yields `None`.
    pub fn shape(tool: ToolKind, color: Color, anchor: Point, current: Point) -> Option<Self> {
        let width = current.x - anchor.x;
        let height = current.y - anchor.y;
        match tool {
            ToolKind::Rectangle => Some(Action::Rectangle {
                color,
                start_x: anchor.x,
                start_y: anchor.y,
                width,
                height,
            }),
            ToolKind::Circle => Some(Action::Circle {
                color,
                start_x: anchor.x,
                start_y: anchor.y,
                width,
                height,
            }),
            _ => None,
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Action::Pencil { .. } => ToolKind::Pencil,
            Action::Rectangle { .. } => ToolKind::Rectangle,
            Action::Circle { .. } => ToolKind::Circle,
            Action::Text { .. } => ToolKind::Text,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Action::Pencil { color, .. }
            | Action::Rectangle { color, .. }
            | Action::Circle { color, .. }
            | Action::Text { color, .. } => *color,
        }
    }
}
