use super::Shape;

/// Append-only, insertion-ordered list of scene placeholders.
///
/// Nothing in the render loop consumes this list; frame hooks get a read-only view.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ShapeList {
    items: Vec<Shape>,
}

impl ShapeList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a shape. O(1) amortized.
    #[inline]
    pub fn push(&mut self, shape: Shape) {
        self.items.push(shape);
    }

    /// Returns shapes in insertion order.
    #[inline]
    pub fn items(&self) -> &[Shape] {
        &self.items
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.items.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Extend<Shape> for ShapeList {
    fn extend<I: IntoIterator<Item = Shape>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Point2D;
    use crate::scene::ShapeKind;

    #[test]
    fn push_preserves_insertion_order() {
        let mut list = ShapeList::new();
        list.push(Shape::new(ShapeKind::Triangle));
        list.push(Shape::new(ShapeKind::Circle).at(Point2D::new(4, 4)));
        list.push(Shape::new(ShapeKind::Triangle));

        let kinds: Vec<_> = list.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, [ShapeKind::Triangle, ShapeKind::Circle, ShapeKind::Triangle]);
        assert_eq!(list.items()[1].anchor, Point2D::new(4, 4));
    }

    #[test]
    fn new_list_is_empty() {
        let list = ShapeList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn shape_defaults_to_origin() {
        assert_eq!(Shape::new(ShapeKind::Line).anchor, Point2D::origin());
    }
}
