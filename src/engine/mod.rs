//! The engine: owns all mutable simulation state and ties the RNG, registries, world, and
//! diagnostic writers together behind `new`/`iterate`/`finalize`.

mod movement;
mod reactions;

use std::fs;

use crate::atom::{Atom, AtomView};
use crate::config::EngineConfig;
use crate::diagnostics::{self, CensusWriter};
use crate::dsfmt::{Dsfmt, ID_STRING, MIN_ARRAY_SIZE_U64};
use crate::element::{Element, ElementRegistry};
use crate::error::{EngineError, LoadError};
use crate::loader::load_chemistry;
use crate::reaction::ReactionTable;
use crate::world::World;

/// One row of the periodic census: element counts at a given iteration, in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct CensusRow {
    pub iter: u64,
    pub counts: Vec<(String, u64)>,
    pub total: u64,
}

/// Owns the world, periodic table, reaction table, and RNG stream for one simulation run.
pub struct Engine {
    config: EngineConfig,
    elements: ElementRegistry,
    reactions: ReactionTable,
    world: World,
    rng: Dsfmt,
    rng_buf: Vec<u64>,
    current_iter: u64,
    census_writer: Option<CensusWriter>,
    diag_error: Option<eyre::Report>,
}

/// Smallest multiple-of-two buffer length that is both at least `cells` and at least the bulk
/// generator's minimum fill size.
fn rng_buffer_len(cells: usize) -> usize {
    let mut len = cells.max(MIN_ARRAY_SIZE_U64);
    if len % 2 != 0 {
        len += 1;
    }
    len
}

/// Installs the default `A`,`B`,`C`,`D` periodic table, matching `sim-engine.cpp`'s constructor
/// (`for (char symbol = 'A'; symbol <= 'D'; symbol++) ...`), run only when nothing but solvent has
/// been registered.
fn install_default_elements(elements: &mut ElementRegistry) {
    for symbol in ['A', 'B', 'C', 'D'] {
        elements
            .add(&symbol.to_string(), symbol, 0, 0, 0.0)
            .expect("only solvent is registered when this default installs");
    }
}

/// Looks up one of the hardcoded default species by name, the Rust equivalent of the original's
/// `periodicTable[name]` lookup in `Sim::ev` — which silently yields a null `Element*` for an
/// absent name. Here a missing name is reported as a `LoadError` instead of risking a panic later.
fn lookup_default(elements: &ElementRegistry, name: &str) -> Result<u64, LoadError> {
    elements
        .lookup_by_name(name)
        .map(|e| e.key)
        .ok_or_else(|| LoadError::UnknownSpecies {
            line: 0,
            name: name.to_string(),
        })
}

/// Installs the default `A + B -> C + D` reaction, run only when no reaction was loaded —
/// independently of whether the periodic table or initial mix were, matching `sim-engine.cpp`'s
/// `if (rxnsLoaded == 0)` guard.
fn install_default_reaction(
    elements: &ElementRegistry,
    reactions: &mut ReactionTable,
) -> Result<(), LoadError> {
    let a = lookup_default(elements, "A")?;
    let b = lookup_default(elements, "B")?;
    let c = lookup_default(elements, "C")?;
    let d = lookup_default(elements, "D")?;
    reactions
        .add(vec![a, b], vec![c, d], 0.5)
        .expect("key is fresh: default reaction installs only once");
    Ok(())
}

/// Builds the default `{A, B}` initial mix, run only when no `init` record was loaded —
/// independently of the periodic table and reaction table, matching `sim-engine.cpp`'s
/// `if (initsLoaded == 0)` guard.
fn default_initial_mix(elements: &ElementRegistry) -> Result<Vec<u64>, LoadError> {
    Ok(vec![
        lookup_default(elements, "A")?,
        lookup_default(elements, "B")?,
    ])
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Engine, EngineError> {
        config.validate()?;

        let mut elements = ElementRegistry::new();
        let mut reactions = ReactionTable::new();

        let mut initial_mix = if let Some(path) = &config.load_file {
            let source = fs::read_to_string(path).map_err(|source| EngineError::Io {
                path: path.clone(),
                source,
            })?;
            load_chemistry(&source, &mut elements, &mut reactions)?
        } else {
            Vec::new()
        };

        // Each category defaults independently of the others, matching the original engine's
        // separate `elesLoaded`/`rxnsLoaded`/`initsLoaded` guards: a chemistry file can supply its
        // own elements but rely on the default reaction, or vice versa.
        if elements.len() == 1 {
            install_default_elements(&mut elements);
        }
        if reactions.is_empty() {
            install_default_reaction(&elements, &mut reactions)?;
        }
        if initial_mix.is_empty() {
            initial_mix = default_initial_mix(&elements)?;
        }

        let mut world = World::new(config.world_x, config.world_y);
        let mut rng = Dsfmt::init_by_u32(config.seed);
        let mut rng_buf = vec![0u64; rng_buffer_len(world.len())];

        // The very first bulk fill, used below to build the initial position shuffle; this is
        // the fill the rand-file verification dump records.
        rng.fill_u64(&mut rng_buf);
        let mut diag_error = None;
        if let Some(path) = &config.rand_file {
            if let Err(err) = diagnostics::write_rand_dump(path, &rng_buf) {
                diag_error = Some(err);
            }
        }
        let positions = world.shuffle_positions(&rng_buf);

        rng.fill_u64(&mut rng_buf);
        let atom_count = config.clamped_atom_count() as usize;
        for (i, &position) in positions.iter().take(atom_count).enumerate() {
            let x = (position as i64) % world.width();
            let y = (position as i64) / world.width();
            let element_key = initial_mix[(rng_buf[i] as usize) % initial_mix.len()];
            world.place(x, y, Atom::new(element_key, x, y));
            elements.adjust_count(element_key, 1);
        }

        if let Some(path) = &config.config_file {
            if let Err(err) = diagnostics::write_config_echo(path, &config, &elements, &reactions) {
                if diag_error.is_none() {
                    diag_error = Some(err);
                }
            }
        }

        let census_writer = match &config.census_file {
            Some(path) => match CensusWriter::create(path, config.census_interval, &elements) {
                Ok(writer) => Some(writer),
                Err(err) => {
                    if diag_error.is_none() {
                        diag_error = Some(err);
                    }
                    None
                }
            },
            None => None,
        };

        Ok(Engine {
            config,
            elements,
            reactions,
            world,
            rng,
            rng_buf,
            current_iter: 0,
            census_writer,
            diag_error,
        })
    }

    fn record_diag_error(&mut self, result: eyre::Result<()>) {
        if let Err(err) = result {
            if self.diag_error.is_none() {
                self.diag_error = Some(err);
            }
        }
    }

    /// Advances the simulation by one iteration. Returns `false` once `max_iters` has been
    /// reached, without doing any further work.
    pub fn iterate(&mut self) -> bool {
        if self.current_iter >= self.config.max_iters {
            return false;
        }

        if self.config.do_shuffle {
            self.rng.fill_u64(&mut self.rng_buf);
            self.world.shuffle_world(&self.rng_buf);
        }

        self.rng.fill_u64(&mut self.rng_buf);
        movement::sweep(&mut self.world, &self.rng_buf);
        if self.config.do_reactions {
            reactions::sweep(&mut self.world, &mut self.elements, &self.reactions, &self.rng_buf);
        }

        self.current_iter += 1;

        let result = match self.census_writer.as_mut() {
            Some(writer) => writer.maybe_log(self.current_iter, &self.elements, false),
            None => Ok(()),
        };
        self.record_diag_error(result);

        true
    }

    pub fn current_iter(&self) -> u64 {
        self.current_iter
    }

    pub fn world_at(&self, x: i64, y: i64) -> Option<AtomView<'_>> {
        self.world.get(x, y).map(AtomView::new)
    }

    pub fn periodic_table(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Computes the current element-count row, appending it to the census file (if configured)
    /// regardless of the interval — this is the explicit, on-demand counterpart to the
    /// interval-triggered logging `iterate` performs on its own.
    pub fn take_census(&mut self) -> CensusRow {
        let counts: Vec<(String, u64)> = self
            .elements
            .iter_reportable()
            .map(|e| (e.name.clone(), e.count))
            .collect();
        let total = counts.iter().map(|(_, c)| *c).sum();

        let result = match self.census_writer.as_mut() {
            Some(writer) => writer.maybe_log(self.current_iter, &self.elements, true),
            None => Ok(()),
        };
        self.record_diag_error(result);

        CensusRow {
            iter: self.current_iter,
            counts,
            total,
        }
    }

    /// Flushes diagnostic streams and consumes the engine. Any write failure encountered during
    /// the run (including here) is returned, but finalization always completes.
    pub fn finalize(mut self) -> eyre::Result<()> {
        if let Some(path) = self.config.diffusion_file.clone() {
            let atoms: Vec<&Atom> = self.world.iter_occupied().map(|(_, a)| a).collect();
            let result = diagnostics::write_diffusion_dump(&path, &self.elements, atoms.into_iter());
            self.record_diag_error(result);
        }
        if let Some(writer) = self.census_writer.as_mut() {
            let result = writer.maybe_log(self.current_iter, &self.elements, true);
            self.record_diag_error(result);
            let result = writer.flush();
            self.record_diag_error(result);
        }
        match self.diag_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn id_string(&self) -> &'static str {
        ID_STRING
    }
}
