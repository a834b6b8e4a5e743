//! Atom records and the read-only view exposed across the engine boundary.

/// A single atom occupying a grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: u64,
    pub x: i64,
    pub y: i64,
    pub dx_ideal: i64,
    pub dy_ideal: i64,
    pub dx_actual: i64,
    pub dy_actual: i64,
    pub collisions: u64,
    pub tracked: bool,
}

impl Atom {
    pub fn new(element: u64, x: i64, y: i64) -> Self {
        Atom {
            element,
            x,
            y,
            dx_ideal: 0,
            dy_ideal: 0,
            dx_actual: 0,
            dy_actual: 0,
            collisions: 0,
            tracked: false,
        }
    }
}

/// Borrowed, read-only snapshot of an [`Atom`] handed out by `Engine::world_at`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomView<'a> {
    atom: &'a Atom,
}

impl<'a> AtomView<'a> {
    pub(crate) fn new(atom: &'a Atom) -> Self {
        AtomView { atom }
    }

    pub fn element(&self) -> u64 {
        self.atom.element
    }

    pub fn position(&self) -> (i64, i64) {
        (self.atom.x, self.atom.y)
    }

    pub fn ideal_displacement(&self) -> (i64, i64) {
        (self.atom.dx_ideal, self.atom.dy_ideal)
    }

    pub fn actual_displacement(&self) -> (i64, i64) {
        (self.atom.dx_actual, self.atom.dy_actual)
    }

    pub fn collisions(&self) -> u64 {
        self.atom.collisions
    }

    pub fn is_tracked(&self) -> bool {
        self.atom.tracked
    }
}
