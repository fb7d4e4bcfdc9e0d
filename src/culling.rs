/*
 * Culling Module
 *
 * Drops primitives whose bounding box lies entirely outside the visible
 * world rectangle before they are handed to the surface. The rectangle is
 * grown by a margin so shapes straddling the window edge are kept.
 */

use nannou::prelude::*;

use crate::renderer::Primitive;

pub fn expand(rect: Rect, margin: f32) -> Rect {
    Rect::from_corners(
        pt2(rect.left() - margin, rect.bottom() - margin),
        pt2(rect.right() + margin, rect.top() + margin),
    )
}

#[inline]
pub fn is_visible(primitive: &Primitive, visible: Rect) -> bool {
    let (min, max) = primitive.bounds();
    max.x >= visible.left() && min.x <= visible.right() && max.y >= visible.bottom() && min.y <= visible.top()
}

// Indices into `primitives` of everything that overlaps `visible`
pub fn visible_primitives(primitives: &[Primitive], visible: Rect) -> Vec<usize> {
    primitives
        .iter()
        .enumerate()
        .filter(|(_, p)| is_visible(p, visible))
        .map(|(i, _)| i)
        .collect()
}
