//! Arena quadtree over node positions for the Barnes-Hut repulsion pass.
//!
//! Cells live in one `Vec` and address their children by index. Every cell
//! owns a contiguous run of `order`, so leaf bodies are a plain slice.

use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_SIZE: usize = 8;
const DEPTH_LIMIT: usize = 12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    /// Smallest padded square around `points`; `None` when empty or when any
    /// coordinate is not finite.
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points.iter().try_fold((first, first), |(min, max), point| {
            (point.x.is_finite() && point.y.is_finite()).then(|| (min.min(*point), max.max(*point)))
        })?;
        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point.x - self.center.x).abs() <= self.half && (point.y - self.center.y).abs() <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    /// Bit 0 is east, bit 1 is south.
    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quarter(self, quadrant: usize) -> Self {
        let step = self.half * 0.5;
        let x = if quadrant & 1 == 0 { -step } else { step };
        let y = if quadrant & 2 == 0 { -step } else { step };
        Self {
            center: self.center + vec2(x, y),
            half: step,
        }
    }
}

#[derive(Clone, Debug)]
pub(super) struct Cell {
    pub(super) square: Square,
    /// Summed charge of every body below the cell.
    pub(super) charge: f32,
    /// Charge-weighted centre of those bodies.
    pub(super) centroid: Vec2,
    pub(super) depth: usize,
    bodies: Range<usize>,
    children: [Option<usize>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = usize> + '_ {
        self.children.iter().flatten().copied()
    }
}

pub(super) struct Quadtree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl Quadtree {
    pub(super) const ROOT: usize = 0;

    /// Builds the tree with every body carrying `charge`.
    pub(super) fn build(positions: &[Vec2], charge: f32) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let mut tree = Self {
            cells: Vec::with_capacity(positions.len() / LEAF_SIZE * 2 + 1),
            order: (0..positions.len()).collect(),
        };
        tree.split(square, 0..positions.len(), 0, positions, charge);
        Some(tree)
    }

    fn split(
        &mut self,
        square: Square,
        bodies: Range<usize>,
        depth: usize,
        positions: &[Vec2],
        charge: f32,
    ) -> usize {
        let id = self.cells.len();
        let members = &mut self.order[bodies.clone()];
        let count = members.len();
        let centroid = members
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index])
            / count.max(1) as f32;
        self.cells.push(Cell {
            square,
            charge: charge * count as f32,
            centroid,
            depth,
            bodies: bodies.clone(),
            children: [None; 4],
        });

        if count <= LEAF_SIZE || depth >= DEPTH_LIMIT {
            return id;
        }

        let mut counts = [0usize; 4];
        for &index in members.iter() {
            counts[square.quadrant(positions[index])] += 1;
        }
        // Coincident bodies never separate; keep them in one leaf.
        if counts.iter().filter(|&&count| count > 0).count() <= 1 {
            return id;
        }
        members.sort_by_key(|&index| square.quadrant(positions[index]));

        let mut start = bodies.start;
        for (quadrant, &count) in counts.iter().enumerate() {
            let end = start + count;
            if count > 0 {
                let child = self.split(square.quarter(quadrant), start..end, depth + 1, positions, charge);
                self.cells[id].children[quadrant] = Some(child);
            }
            start = end;
        }
        id
    }

    pub(super) fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    pub(super) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Node indices below `cell`.
    pub(super) fn bodies(&self, cell: &Cell) -> &[usize] {
        &self.order[cell.bodies.clone()]
    }
}

/// Flattened cell outline for the debug overlay.
#[derive(Clone, Copy, Debug)]
pub struct QuadtreeCell {
    pub center: Vec2,
    pub half_extent: f32,
    pub depth: usize,
    pub is_leaf: bool,
}

/// Cells of the tree the repulsion pass would build for `positions`.
pub fn quadtree_cells(positions: &[Vec2], cells: &mut Vec<QuadtreeCell>) {
    cells.clear();
    let Some(tree) = Quadtree::build(positions, 1.0) else {
        return;
    };
    cells.extend(tree.cells().iter().map(|cell| QuadtreeCell {
        center: cell.square.center,
        half_extent: cell.square.half,
        depth: cell.depth,
        is_leaf: cell.is_leaf(),
    }));
}
