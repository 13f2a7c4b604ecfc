//! Rectangle overlap test
//!
//! Shared by spawn placement and collision avoidance. Edges are inclusive:
//! two rectangles that only touch still count as overlapping.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

/// Reserved "not placed / invisible" position
pub const SENTINEL: Point = Point::zero();

/// Build a rectangle from a top-left corner and a size
pub const fn rect(top_left: Point, size: Size) -> Rectangle {
    Rectangle::new(top_left, size)
}

/// Check whether two rectangles overlap (touching edges included)
pub fn overlaps(a: &Rectangle, b: &Rectangle) -> bool {
    let (aw, ah) = (a.size.width as i32, a.size.height as i32);
    let (bw, bh) = (b.size.width as i32, b.size.height as i32);

    a.top_left.x + aw >= b.top_left.x
        && a.top_left.x <= b.top_left.x + bw
        && a.top_left.y + ah >= b.top_left.y
        && a.top_left.y <= b.top_left.y + bh
}
