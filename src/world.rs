//! The toroidal grid: cell storage, wrap-around indexing, and the position shuffle used both for
//! initial placement and the optional well-mixed mode.

use crate::atom::Atom;

/// A length-`width*height` grid of optional atoms, indexed `x + y*width` with toroidal wrap.
#[derive(Debug, Clone)]
pub struct World {
    width: i64,
    height: i64,
    cells: Vec<Option<Atom>>,
    /// Scratch buffer shared by the movement and reaction sweeps; has no meaning between sweeps.
    pub claimed: Vec<u8>,
}

impl World {
    pub fn new(width: i64, height: i64) -> Self {
        assert!(width > 0 && height > 0, "world dimensions must be positive");
        let len = (width * height) as usize;
        World {
            width,
            height,
            cells: vec![None; len],
            claimed: vec![0u8; len],
        }
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Maps arbitrary (possibly negative or out-of-range) coordinates to a cell index, wrapping
    /// toroidally in both axes.
    pub fn index(&self, x: i64, y: i64) -> usize {
        let wx = (x % self.width + self.width) % self.width;
        let wy = (y % self.height + self.height) % self.height;
        (wx + wy * self.width) as usize
    }

    /// The wrapped `(x, y)` pair itself, without computing the flat index.
    pub fn wrap(&self, x: i64, y: i64) -> (i64, i64) {
        let wx = (x % self.width + self.width) % self.width;
        let wy = (y % self.height + self.height) % self.height;
        (wx, wy)
    }

    pub fn get(&self, x: i64, y: i64) -> Option<&Atom> {
        self.cells[self.index(x, y)].as_ref()
    }

    pub fn get_mut(&mut self, x: i64, y: i64) -> Option<&mut Atom> {
        let idx = self.index(x, y);
        self.cells[idx].as_mut()
    }

    pub fn cell(&self, idx: usize) -> &Option<Atom> {
        &self.cells[idx]
    }

    pub fn cell_mut(&mut self, idx: usize) -> &mut Option<Atom> {
        &mut self.cells[idx]
    }

    pub fn place(&mut self, x: i64, y: i64, atom: Atom) {
        let idx = self.index(x, y);
        self.cells[idx] = Some(atom);
    }

    pub fn take(&mut self, x: i64, y: i64) -> Option<Atom> {
        let idx = self.index(x, y);
        self.cells[idx].take()
    }

    pub fn iter_occupied(&self) -> impl Iterator<Item = (usize, &Atom)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|a| (i, a)))
    }

    pub fn iter_occupied_mut(&mut self) -> impl Iterator<Item = (usize, &mut Atom)> {
        self.cells
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|a| (i, a)))
    }

    pub fn clear_claims(&mut self) {
        self.claimed.iter_mut().for_each(|c| *c = 0);
    }

    /// Builds a Fisher-Yates permutation of `[0, width*height)` consuming one RNG word per
    /// position but the last. `words` must provide at least `len()-1` entries.
    pub fn shuffle_positions(&self, words: &[u64]) -> Vec<usize> {
        let n = self.len();
        let mut positions: Vec<usize> = (0..n).collect();
        if n < 2 {
            return positions;
        }
        let highest = n - 1;
        for i in 0..highest {
            let lowest = i + 1;
            let range = (highest - lowest + 1) as u64;
            let target = (words[i] % range) as usize + lowest;
            positions.swap(i, target);
        }
        positions
    }

    /// Relocates every atom to the cell `shuffle_positions` assigned it, preserving element
    /// counts but randomizing spatial arrangement (the well-mixed approximation).
    pub fn shuffle_world(&mut self, words: &[u64]) {
        let positions = self.shuffle_positions(words);
        let mut new_cells: Vec<Option<Atom>> = vec![None; self.cells.len()];
        for (old_idx, slot) in self.cells.iter_mut().enumerate() {
            if let Some(mut atom) = slot.take() {
                let new_idx = positions[old_idx];
                atom.x = (new_idx as i64) % self.width;
                atom.y = (new_idx as i64) / self.width;
                new_cells[new_idx] = Some(atom);
            }
        }
        self.cells = new_cells;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0, 0, 3, 3, 0, 0; "origin stays at origin")]
    #[test_case(3, 0, 3, 3, 0, 0; "wraps on x at the right edge")]
    #[test_case(-1, 0, 3, 3, 2, 0; "wraps negative x to the left edge")]
    #[test_case(0, -1, 3, 3, 0, 2; "wraps negative y to the bottom edge")]
    fn wrap_produces_coordinates_in_range(
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        expected_x: i64,
        expected_y: i64,
    ) {
        let world = World::new(w, h);
        assert_eq!(world.wrap(x, y), (expected_x, expected_y));
    }

    #[test]
    fn movement_wraps_from_origin_northwest_to_far_corner() {
        let world = World::new(4, 4);
        assert_eq!(world.wrap(0 - 1, 0 - 1), (3, 3));
    }

    #[test]
    fn reaction_neighbor_east_of_right_edge_is_left_edge() {
        let world = World::new(4, 4);
        assert_eq!(world.wrap(3 + 1, 2), (0, 2));
    }

    #[test]
    fn place_and_take_round_trip() {
        let mut world = World::new(2, 2);
        world.place(1, 1, Atom::new(3, 1, 1));
        let atom = world.take(1, 1).unwrap();
        assert_eq!(atom.element, 3);
        assert!(world.get(1, 1).is_none());
    }

    #[test]
    fn shuffle_preserves_element_count_histogram() {
        let mut world = World::new(3, 3);
        for i in 0..5 {
            world.place(i % 3, i / 3, Atom::new(7, i % 3, i / 3));
        }
        let words: Vec<u64> = (0..8).map(|i| i * 37 + 5).collect();
        world.shuffle_world(&words);
        let count = world.iter_occupied().count();
        assert_eq!(count, 5);
        for (idx, atom) in world.iter_occupied() {
            let (x, y) = world.wrap(atom.x, atom.y);
            assert_eq!(world.index(x, y), idx);
        }
    }
}
