//! The reaction sweep: a claim/commit pass that resolves at most one first- or second-order
//! reaction per cell per iteration, reusing the movement sweep's `claimed` scratch buffer.

use crate::atom::Atom;
use crate::element::ElementRegistry;
use crate::reaction::ReactionTable;
use crate::world::World;

/// `(dx, dy)` per reaction mode: self, then the four "forward" neighbors. Restricting to
/// forward/downward neighbors keeps a reacting pair from claiming each other from both ends.
const MODE_OFFSETS: [(i64, i64); 5] = [(0, 0), (1, 0), (1, 1), (0, 1), (-1, 1)];

fn mode_of(word: u64) -> usize {
    ((word >> 3) % 5) as usize
}

fn alternative_of(word: u64) -> bool {
    (word >> 3) % 2 == 1
}

/// `(word >> 3) / 2^61`, deliberately reusing the same high bits that chose the mode and the
/// product alternative — a documented economy of random bits, not an oversight.
fn probability_sample(word: u64) -> f64 {
    (word >> 3) as f64 / (1u64 << 61) as f64
}

fn effective_key(world: &World, idx: usize, solvent: u64) -> u64 {
    world.cell(idx).as_ref().map(|a| a.element).unwrap_or(solvent)
}

/// Looks up the reaction keyed by `self_key` (first-order) or `self_key * neighbor_key`
/// (second-order) and returns its chosen alternative if populated.
fn resolve<'a>(
    reactions: &'a ReactionTable,
    self_key: u64,
    neighbor_key: Option<u64>,
    alternative: bool,
) -> Option<(&'a [u64], f64)> {
    let key = match neighbor_key {
        Some(n) => self_key * n,
        None => self_key,
    };
    let rxn = reactions.lookup(key)?;
    Some((rxn.products(alternative)?, rxn.prob(alternative)?))
}

/// Runs the full claim/commit reaction sweep, updating `elements.count` for every type change.
pub fn sweep(world: &mut World, elements: &mut ElementRegistry, reactions: &ReactionTable, words: &[u64]) {
    debug_assert!(words.len() >= world.len());
    let solvent = elements.solvent_key();
    claim_pass(world, reactions, words, solvent);
    commit_pass(world, elements, reactions, words, solvent);
}

fn claim_pass(world: &mut World, reactions: &ReactionTable, words: &[u64], solvent: u64) {
    world.clear_claims();
    let (width, height) = (world.width(), world.height());

    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            let word = words[idx];
            let mode = mode_of(word);
            let (ox, oy) = MODE_OFFSETS[mode];

            let self_key = effective_key(world, idx, solvent);
            let neighbor = if mode == 0 {
                None
            } else {
                let nidx = world.index(x + ox, y + oy);
                Some((nidx, effective_key(world, nidx, solvent)))
            };

            let Some((products, prob)) =
                resolve(reactions, self_key, neighbor.map(|(_, k)| k), alternative_of(word))
            else {
                continue;
            };
            if products.is_empty() || probability_sample(word) >= prob {
                continue;
            }

            world.claimed[idx] += 1;
            if let Some((nidx, _)) = neighbor {
                world.claimed[nidx] += 1;
            }
        }
    }
}

fn commit_pass(
    world: &mut World,
    elements: &mut ElementRegistry,
    reactions: &ReactionTable,
    words: &[u64],
    solvent: u64,
) {
    let (width, height) = (world.width(), world.height());

    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            if world.claimed[idx] != 1 {
                continue;
            }
            let word = words[idx];
            let mode = mode_of(word);
            let (ox, oy) = MODE_OFFSETS[mode];

            let self_key = effective_key(world, idx, solvent);
            // `None` here means either "first-order" (mode 0) or "second-order but the neighbor
            // lost its own claim to something else" — in the latter case no reaction commits,
            // matching the original's behavior of leaving the probability at zero rather than
            // falling back to a first-order lookup.
            let neighbor = match mode {
                0 => Some(None),
                _ => {
                    let nidx = world.index(x + ox, y + oy);
                    if world.claimed[nidx] == 1 {
                        Some(Some((nidx, effective_key(world, nidx, solvent))))
                    } else {
                        None
                    }
                }
            };
            let Some(neighbor) = neighbor else { continue };

            let Some((products, prob)) = resolve(
                reactions,
                self_key,
                neighbor.map(|(_, k)| k),
                alternative_of(word),
            ) else {
                continue;
            };
            if probability_sample(word) >= prob {
                continue;
            }

            apply_product(world, elements, idx, x, y, products[0], solvent);
            world.claimed[idx] = 0;
            if let Some((nidx, _)) = neighbor {
                let (nx, ny) = world.wrap(x + ox, y + oy);
                apply_product(world, elements, nidx, nx, ny, products[1], solvent);
                world.claimed[nidx] = 0;
            }
        }
    }
}

/// Installs `new_key` at `idx`, creating or freeing the atom slot as needed and keeping
/// `elements.count` consistent with every type change.
fn apply_product(
    world: &mut World,
    elements: &mut ElementRegistry,
    idx: usize,
    x: i64,
    y: i64,
    new_key: u64,
    solvent: u64,
) {
    if new_key == solvent {
        if let Some(atom) = world.cell_mut(idx).take() {
            elements.adjust_count(atom.element, -1);
        }
        return;
    }
    match world.cell_mut(idx).as_mut() {
        Some(atom) if atom.element == new_key => {}
        Some(atom) => {
            elements.adjust_count(atom.element, -1);
            elements.adjust_count(new_key, 1);
            atom.element = new_key;
        }
        None => {
            *world.cell_mut(idx) = Some(Atom::new(new_key, x, y));
            elements.adjust_count(new_key, 1);
        }
    }
}
