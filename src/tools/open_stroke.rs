use crate::action::{Action, Point};
use crate::style::Color;

/// A pencil stroke that is still being drawn.
///
/// The tool state machine owns this for the duration of the drag and turns
/// it into an immutable [`Action::Pencil`] when the pointer is released. It is
/// never stored in the action log while open.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenStroke {
    points: Vec<Point>,
    color: Color,
}

impl OpenStroke {
    /// Start a stroke at `first`
    pub fn new(color: Color, first: Point) -> Self {
        Self {
            points: vec![first],
            color,
        }
    }

    /// Add a point to the stroke
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Copy of the stroke as it would be committed right now
    pub fn to_action(&self) -> Action {
        Action::Pencil {
            color: self.color,
            points: self.points.clone(),
        }
    }

    /// Close the stroke
    pub fn finish(self) -> Action {
        Action::Pencil {
            color: self.color,
            points: self.points,
        }
    }
}
