//! The movement sweep: one claim/commit pass per iteration that moves every atom at most one
//! cell in one of eight directions, resolving collisions without a global lock.

use crate::world::World;

/// `(dx, dy)` per 3-bit direction code, in the fixed order N, NE, E, SE, S, SW, W, NW.
pub const DIRECTIONS: [(i64, i64); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

fn direction_for(word: u64) -> (i64, i64) {
    DIRECTIONS[(word & 0x7) as usize]
}

/// Runs the full claim/commit movement sweep. `words` supplies one RNG word per cell, indexed
/// the same way as the world.
pub fn sweep(world: &mut World, words: &[u64]) {
    debug_assert!(words.len() >= world.len());
    world.clear_claims();

    let (width, height) = (world.width(), world.height());

    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            if world.cell(idx).is_some() {
                let (dx, dy) = direction_for(words[idx]);
                let dst = world.index(x + dx, y + dy);
                world.claimed[idx] += 1;
                world.claimed[dst] += 1;
            }
        }
    }

    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            if world.cell(idx).is_none() || world.claimed[idx] == 0 {
                continue;
            }
            let (dx, dy) = direction_for(words[idx]);
            let dst = world.index(x + dx, y + dy);

            if let Some(atom) = world.cell_mut(idx).as_mut() {
                atom.dx_ideal += dx;
                atom.dy_ideal += dy;
            }

            if world.claimed[idx] == 1 && world.claimed[dst] == 1 {
                let mut atom = world
                    .cell_mut(idx)
                    .take()
                    .expect("presence checked above");
                let (wx, wy) = world.wrap(x + dx, y + dy);
                atom.dx_actual += dx;
                atom.dy_actual += dy;
                atom.x = wx;
                atom.y = wy;
                *world.cell_mut(dst) = Some(atom);
                // Mark the just-moved atom processed so a later cell in this same pass (its new
                // home) doesn't apply a second delta to it.
                world.claimed[dst] = 0;
            } else {
                if let Some(atom) = world.cell_mut(idx).as_mut() {
                    atom.collisions += 1;
                }
                world.claimed[idx] = 0;
            }
        }
    }
}
