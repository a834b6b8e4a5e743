//! Diagnostic file writers: config echo, periodic census, diffusion dump, and the RNG
//! verification dump. All I/O here is best-effort — failures surface as `eyre::Result` with
//! `.wrap_err(...)` context, the same idiom this crate's configuration loading uses, and never
//! interrupt an in-progress `Engine::iterate`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use eyre::WrapErr;

use crate::atom::Atom;
use crate::config::EngineConfig;
use crate::element::ElementRegistry;
use crate::loader::write_chemistry;
use crate::reaction::ReactionTable;

const COLUMN_WIDTH: usize = 12;

fn write_row(out: &mut impl Write, cells: &[String]) -> std::io::Result<()> {
    for cell in cells {
        write!(out, "{cell:<COLUMN_WIDTH$}")?;
    }
    writeln!(out)
}

/// Writes the config echo: every scalar parameter, then every non-solvent element and reaction
/// in the §4.7 grammar, so the periodic table and reaction table round-trip through the loader.
pub fn write_config_echo(
    path: &Path,
    config: &EngineConfig,
    elements: &ElementRegistry,
    reactions: &ReactionTable,
) -> eyre::Result<()> {
    let file = File::create(path).wrap_err("failed to create config echo file")?;
    let mut out = BufWriter::new(file);

    writeln!(out, "seed {}", config.seed).wrap_err("writing seed")?;
    writeln!(out, "iters {}", config.max_iters).wrap_err("writing max_iters")?;
    writeln!(out, "x {}", config.world_x).wrap_err("writing world_x")?;
    writeln!(out, "y {}", config.world_y).wrap_err("writing world_y")?;
    writeln!(out, "atoms {}", config.atom_count).wrap_err("writing atom_count")?;
    writeln!(out, "reactions {}", if config.do_reactions { "on" } else { "off" })
        .wrap_err("writing reactions flag")?;
    writeln!(out, "shuffle {}", if config.do_shuffle { "on" } else { "off" })
        .wrap_err("writing shuffle flag")?;
    writeln!(out).wrap_err("writing section break")?;

    out.write_all(write_chemistry(elements, reactions).as_bytes())
        .wrap_err("writing periodic table and reaction table")?;

    Ok(())
}

/// Buffered, interval-triggered census writer: one row of element counts every
/// `census_interval` iterations plus a final row at termination.
pub struct CensusWriter {
    out: BufWriter<File>,
    interval: u64,
    last_logged: Option<u64>,
}

impl CensusWriter {
    pub fn create(path: &Path, interval: u64, elements: &ElementRegistry) -> eyre::Result<Self> {
        let file = File::create(path).wrap_err("failed to create census file")?;
        let mut out = BufWriter::new(file);
        let mut header: Vec<String> = vec!["iter".to_string()];
        header.extend(elements.iter_reportable().map(|e| e.name.clone()));
        header.push("total".to_string());
        write_row(&mut out, &header).wrap_err("writing census header")?;
        Ok(CensusWriter {
            out,
            interval: interval.max(1),
            last_logged: None,
        })
    }

    /// Logs a row if `iter` falls on the census interval, or unconditionally when `force` is
    /// set (used for the termination row); never logs the same iteration twice.
    pub fn maybe_log(&mut self, iter: u64, elements: &ElementRegistry, force: bool) -> eyre::Result<()> {
        if self.last_logged == Some(iter) {
            return Ok(());
        }
        if force || iter % self.interval == 0 {
            self.log(iter, elements)?;
            self.last_logged = Some(iter);
        }
        Ok(())
    }

    fn log(&mut self, iter: u64, elements: &ElementRegistry) -> eyre::Result<()> {
        let mut row = vec![iter.to_string()];
        let mut total = 0u64;
        for element in elements.iter_reportable() {
            row.push(element.count.to_string());
            total += element.count;
        }
        row.push(total.to_string());
        write_row(&mut self.out, &row).wrap_err("writing census row")
    }

    pub fn flush(&mut self) -> eyre::Result<()> {
        self.out.flush().wrap_err("flushing census file")
    }
}

/// Writes the one-shot, termination-time per-atom diffusion summary.
pub fn write_diffusion_dump<'a>(
    path: &Path,
    elements: &ElementRegistry,
    atoms: impl Iterator<Item = &'a Atom>,
) -> eyre::Result<()> {
    let file = File::create(path).wrap_err("failed to create diffusion file")?;
    let mut out = BufWriter::new(file);
    write_row(
        &mut out,
        &[
            "type".to_string(),
            "dx_actual".to_string(),
            "dy_actual".to_string(),
            "dx_ideal".to_string(),
            "dy_ideal".to_string(),
            "collisions".to_string(),
        ],
    )
    .wrap_err("writing diffusion header")?;

    for atom in atoms {
        let name = elements
            .lookup_by_key(atom.element)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| atom.element.to_string());
        write_row(
            &mut out,
            &[
                name,
                atom.dx_actual.to_string(),
                atom.dy_actual.to_string(),
                atom.dx_ideal.to_string(),
                atom.dy_ideal.to_string(),
                atom.collisions.to_string(),
            ],
        )
        .wrap_err("writing diffusion row")?;
    }
    Ok(())
}

/// Writes the first 10 raw 64-bit RNG words, one decimal integer per line, for
/// cross-implementation verification.
pub fn write_rand_dump(path: &Path, words: &[u64]) -> eyre::Result<()> {
    let file = File::create(path).wrap_err("failed to create rand dump file")?;
    let mut out = BufWriter::new(file);
    for word in words.iter().take(10) {
        writeln!(out, "{word}").wrap_err("writing rand dump line")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_to_string(path: &Path) -> String {
        let mut s = String::new();
        File::open(path).unwrap().read_to_string(&mut s).unwrap();
        s
    }

    #[test]
    fn config_echo_contains_scalar_params_and_elements() {
        let dir = std::env::temp_dir().join("latticechem-test-config-echo");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.txt");

        let mut elements = ElementRegistry::new();
        elements.add("A", 'A', 0, 0, 0.0).unwrap();
        let reactions = ReactionTable::new();
        let config = EngineConfig::default();

        write_config_echo(&path, &config, &elements, &reactions).unwrap();
        let contents = read_to_string(&path);
        assert!(contents.contains("seed 0"));
        assert!(contents.contains("ele A A 0 0"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn census_header_lists_reportable_elements_then_total() {
        let dir = std::env::temp_dir().join("latticechem-test-census");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("census.txt");

        let mut elements = ElementRegistry::new();
        elements.add("A", 'A', 0, 0, 0.0).unwrap();
        elements.add("B", 'B', 0, 0, 0.0).unwrap();

        let mut writer = CensusWriter::create(&path, 8, &elements).unwrap();
        writer.maybe_log(0, &elements, true).unwrap();
        writer.flush().unwrap();

        let contents = read_to_string(&path);
        let header = contents.lines().next().unwrap();
        assert!(header.contains("iter"));
        assert!(header.contains("A"));
        assert!(header.contains("B"));
        assert!(header.contains("total"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
