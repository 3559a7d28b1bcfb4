use core::fmt;

use crate::coords::Point2D;

/// Shape category carried by a scene placeholder.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
    Line,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
        };
        f.write_str(name)
    }
}

/// Scene placeholder. Not drawn by the render loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Shape {
    pub kind: ShapeKind,
    pub anchor: Point2D,
}

impl Shape {
    /// Creates a shape anchored at the origin.
    #[inline]
    pub const fn new(kind: ShapeKind) -> Self {
        Self { kind, anchor: Point2D::origin() }
    }

    #[inline]
    #[must_use]
    pub const fn at(self, anchor: Point2D) -> Self {
        Self { anchor, ..self }
    }
}
