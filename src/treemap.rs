//! Squarified treemap layout (Bruls, Huizing, van Wijk).
//!
//! Partitions a rectangle into blocks whose areas are proportional to each
//! node's (optionally log-scaled) size, keeping aspect ratios close to
//! square: nodes are taken in descending weight order, the current strip
//! grows along the short side of the free rectangle while that improves the
//! strip's worst aspect ratio, and flushes otherwise.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// One laid-out block. `node` is the caller's index into whatever node list
/// produced the sizes.
#[derive(Debug, Clone, Copy)]
pub struct TreemapBlock {
    pub rect: Rect,
    /// Transformed weight the block's area is proportional to.
    pub weight: f32,
    pub node: usize,
}

/// Weight transform applied before layout.
pub fn weigh(size: f64, use_log: bool) -> f32 {
    if use_log {
        (1.0 + size).ln() as f32
    } else {
        size as f32
    }
}

struct Item {
    node: usize,
    weight: f32,
    /// Target area inside `bounds` after normalization.
    area: f32,
}

/// Lay out `(node index, size)` entries inside `bounds`. Non-positive sizes
/// are excluded up front; zero surviving nodes yield an empty layout and a
/// single node fills the whole rectangle.
pub fn layout(sizes: &[(usize, f64)], bounds: Rect, use_log: bool) -> Vec<TreemapBlock> {
    if bounds.area() <= 0.0 {
        return Vec::new();
    }

    let mut items: Vec<Item> = sizes
        .iter()
        .filter(|(_, size)| *size > 0.0)
        .map(|&(node, size)| {
            let weight = weigh(size, use_log);
            Item { node, weight, area: weight }
        })
        .collect();
    if items.is_empty() {
        return Vec::new();
    }

    let total: f32 = items.iter().map(|item| item.area).sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let scale = bounds.area() / total;
    for item in &mut items {
        item.area *= scale;
    }
    items.sort_by(|a, b| b.area.partial_cmp(&a.area).unwrap_or(Ordering::Equal));

    let mut blocks = Vec::with_capacity(items.len());
    let mut free = bounds;
    let mut start = 0;
    while start < items.len() {
        let side = free.short_side();
        let mut end = start + 1;
        let mut strip_area = items[start].area;
        let mut worst = worst_ratio(&items[start..end], strip_area, side);
        while end < items.len() {
            let grown_area = strip_area + items[end].area;
            let grown_worst = worst_ratio(&items[start..=end], grown_area, side);
            if grown_worst <= worst {
                strip_area = grown_area;
                worst = grown_worst;
                end += 1;
            } else {
                break;
            }
        }
        free = flush_strip(&items[start..end], strip_area, free, &mut blocks);
        start = end;
    }
    blocks
}

/// Worst aspect ratio across a strip of the given total area spanning the
/// free rectangle's short side.
fn worst_ratio(strip: &[Item], strip_area: f32, side: f32) -> f32 {
    if strip_area <= 0.0 || side <= 0.0 {
        return f32::INFINITY;
    }
    let largest = strip.iter().map(|i| i.area).fold(0.0_f32, f32::max);
    let smallest = strip.iter().map(|i| i.area).fold(f32::INFINITY, f32::min);
    let side_sq = side * side;
    let area_sq = strip_area * strip_area;
    (side_sq * largest / area_sq).max(area_sq / (side_sq * smallest))
}

/// Emit one strip along the short side and return the remaining rectangle.
fn flush_strip(
    strip: &[Item],
    strip_area: f32,
    free: Rect,
    blocks: &mut Vec<TreemapBlock>,
) -> Rect {
    let landscape = free.width >= free.height;
    let side = free.short_side();
    if side <= 0.0 || strip_area <= 0.0 {
        for item in strip {
            blocks.push(TreemapBlock {
                rect: Rect::new(free.x, free.y, 0.0, 0.0),
                weight: item.weight,
                node: item.node,
            });
        }
        return free;
    }

    let thickness = strip_area / side;
    let mut offset = 0.0_f32;
    for item in strip {
        let length = item.area / thickness;
        let rect = if landscape {
            Rect::new(free.x, free.y + offset, thickness, length)
        } else {
            Rect::new(free.x + offset, free.y, length, thickness)
        };
        blocks.push(TreemapBlock { rect, weight: item.weight, node: item.node });
        offset += length;
    }

    if landscape {
        Rect::new(free.x + thickness, free.y, free.width - thickness, free.height)
    } else {
        Rect::new(free.x, free.y + thickness, free.width, free.height - thickness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_area(blocks: &[TreemapBlock]) -> f32 {
        blocks.iter().map(|b| b.rect.area()).sum()
    }

    #[test]
    fn test_areas_match_weight_ratio() {
        let sizes = vec![(0, 50.0), (1, 30.0), (2, 20.0)];
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let blocks = layout(&sizes, bounds, false);
        assert_eq!(blocks.len(), 3);

        for block in &blocks {
            let expected = match block.node {
                0 => 5000.0,
                1 => 3000.0,
                2 => 2000.0,
                other => panic!("unexpected node {}", other),
            };
            let area = block.rect.area();
            assert!(
                (area - expected).abs() / expected < 0.01,
                "node {} area {} should be near {}",
                block.node,
                area,
                expected
            );
        }

        let ratio = total_area(&blocks) / bounds.area();
        assert!(ratio > 0.999 && ratio < 1.001);
    }

    #[test]
    fn test_area_is_conserved() {
        let sizes: Vec<(usize, f64)> =
            (0..17).map(|i| (i, (i as f64 + 1.0) * 3.7)).collect();
        let bounds = Rect::new(10.0, 5.0, 640.0, 360.0);
        for use_log in [false, true] {
            let blocks = layout(&sizes, bounds, use_log);
            assert_eq!(blocks.len(), 17);
            let ratio = total_area(&blocks) / bounds.area();
            assert!(ratio > 0.99 && ratio < 1.01, "ratio was {}", ratio);
        }
    }

    #[test]
    fn test_empty_and_single_node() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 60.0);
        assert!(layout(&[], bounds, false).is_empty());

        let blocks = layout(&[(7, 42.0)], bounds, false);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].node, 7);
        assert!((blocks[0].rect.width - 100.0).abs() < 0.01);
        assert!((blocks[0].rect.height - 60.0).abs() < 0.01);
    }

    #[test]
    fn test_non_positive_sizes_are_excluded() {
        let sizes = vec![(0, 10.0), (1, 0.0), (2, -3.0), (3, 5.0)];
        let blocks = layout(&sizes, Rect::new(0.0, 0.0, 30.0, 30.0), false);
        let nodes: Vec<usize> = blocks.iter().map(|b| b.node).collect();
        assert_eq!(blocks.len(), 2);
        assert!(nodes.contains(&0) && nodes.contains(&3));
    }

    #[test]
    fn test_log_scale_compresses_spread() {
        let sizes = vec![(0, 1000.0), (1, 1.0)];
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let linear = layout(&sizes, bounds, false);
        let logged = layout(&sizes, bounds, true);
        let small_linear = linear.iter().find(|b| b.node == 1).map(|b| b.rect.area());
        let small_logged = logged.iter().find(|b| b.node == 1).map(|b| b.rect.area());
        assert!(small_logged.unwrap() > small_linear.unwrap());
    }

    #[test]
    fn test_equal_weights_swap_keeps_aggregate_area() {
        let forward = vec![(0, 25.0), (1, 25.0), (2, 50.0)];
        let swapped = vec![(1, 25.0), (0, 25.0), (2, 50.0)];
        let bounds = Rect::new(0.0, 0.0, 120.0, 80.0);
        let a = layout(&forward, bounds, false);
        let b = layout(&swapped, bounds, false);
        assert!((total_area(&a) - total_area(&b)).abs() < 0.01);
        let area_of = |blocks: &[TreemapBlock], node: usize| {
            blocks
                .iter()
                .filter(|b| b.node == node)
                .map(|b| b.rect.area())
                .sum::<f32>()
        };
        for node in 0..3 {
            assert!((area_of(&a, node) - area_of(&b, node)).abs() < 0.01);
        }
    }

    #[test]
    fn test_blocks_do_not_overlap() {
        let sizes: Vec<(usize, f64)> = (0..9).map(|i| (i, 10.0 + i as f64)).collect();
        let blocks = layout(&sizes, Rect::new(0.0, 0.0, 90.0, 70.0), false);
        for (i, a) in blocks.iter().enumerate() {
            for b in blocks.iter().skip(i + 1) {
                let overlap_w = (a.rect.x + a.rect.width).min(b.rect.x + b.rect.width)
                    - a.rect.x.max(b.rect.x);
                let overlap_h = (a.rect.y + a.rect.height).min(b.rect.y + b.rect.height)
                    - a.rect.y.max(b.rect.y);
                if overlap_w > 0.01 && overlap_h > 0.01 {
                    panic!(
                        "blocks {} and {} overlap by {}x{}",
                        a.node, b.node, overlap_w, overlap_h
                    );
                }
            }
        }
    }
}
