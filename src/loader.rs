//! The chemistry grammar: `ele`/`rxn`/`init` records, parsed from a load file and re-emitted
//! (minus `init`) as part of the config echo so the periodic table and reaction table round-trip.

use crate::element::ElementRegistry;
use crate::error::LoadError;
use crate::reaction::ReactionTable;

fn malformed(line: usize, record: &'static str, detail: impl Into<String>) -> LoadError {
    LoadError::MalformedRecord {
        line,
        record,
        detail: detail.into(),
    }
}

/// Parses one side of a reaction (reactants or products) already split on `+` groups, expanding
/// `<count> <name>` groups into `count` repetitions of the element key.
fn parse_side(
    groups: &[&str],
    elements: &ElementRegistry,
    line: usize,
) -> Result<Vec<u64>, LoadError> {
    let mut out = Vec::new();
    for group in groups.split(|&t| t == "+") {
        let (count, name) = match group {
            [name] => (1usize, *name),
            [coeff, name] => {
                let n: usize = coeff
                    .parse()
                    .map_err(|_| malformed(line, "rxn", format!("bad stoichiometric count {coeff:?}")))?;
                (n, *name)
            }
            [] => return Err(malformed(line, "rxn", "empty term between `+`")),
            _ => return Err(malformed(line, "rxn", "too many tokens in one term")),
        };
        let key = elements
            .lookup_by_name(name)
            .ok_or_else(|| LoadError::UnknownSpecies {
                line,
                name: name.to_string(),
            })?
            .key;
        out.extend(std::iter::repeat(key).take(count));
    }
    if out.is_empty() {
        return Err(malformed(line, "rxn", "side has no terms"));
    }
    Ok(out)
}

/// Parses the full chemistry grammar from `source`, populating `elements` and `reactions` and
/// returning the initial element-key multiset declared by the (at most one) `init` record.
pub fn load_chemistry(
    source: &str,
    elements: &mut ElementRegistry,
    reactions: &mut ReactionTable,
) -> Result<Vec<u64>, LoadError> {
    let mut initial_mix: Option<Vec<u64>> = None;

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();

        match tokens[0] {
            "ele" => {
                if tokens.len() != 5 {
                    return Err(malformed(
                        line_no,
                        "ele",
                        "expected `ele <name> <symbol> <color> <charge>`",
                    ));
                }
                let name = tokens[1];
                let symbol = {
                    let mut chars = tokens[2].chars();
                    let c = chars
                        .next()
                        .ok_or_else(|| malformed(line_no, "ele", "empty symbol"))?;
                    if chars.next().is_some() {
                        return Err(malformed(line_no, "ele", "symbol must be one character"));
                    }
                    c
                };
                let color: u32 = tokens[3]
                    .parse()
                    .map_err(|_| malformed(line_no, "ele", format!("bad color {:?}", tokens[3])))?;
                let charge: i32 = tokens[4]
                    .parse()
                    .map_err(|_| malformed(line_no, "ele", format!("bad charge {:?}", tokens[4])))?;
                elements.add(name, symbol, color, charge, 0.0)?;
            }
            "rxn" => {
                if tokens.len() < 4 {
                    return Err(malformed(line_no, "rxn", "record too short"));
                }
                let prob: f64 = tokens[1]
                    .parse()
                    .map_err(|_| malformed(line_no, "rxn", format!("bad probability {:?}", tokens[1])))?;
                let rest = &tokens[2..];
                let arrow = rest
                    .iter()
                    .position(|&t| t == "->")
                    .ok_or_else(|| malformed(line_no, "rxn", "missing `->`"))?;
                let reactant_tokens = &rest[..arrow];
                let product_tokens = &rest[arrow + 1..];

                let mut reactant_keys = parse_side(reactant_tokens, elements, line_no)?;
                let mut product_keys = parse_side(product_tokens, elements, line_no)?;

                let solvent = elements.solvent_key();
                while product_keys.len() > reactant_keys.len() {
                    reactant_keys.push(solvent);
                }
                while reactant_keys.len() > product_keys.len() {
                    product_keys.push(solvent);
                }

                reactions
                    .add(reactant_keys, product_keys, prob)
                    .map_err(|e| match e {
                        LoadError::DuplicateReaction { .. } => {
                            LoadError::DuplicateReaction { line: line_no }
                        }
                        other => other,
                    })?;
            }
            "init" => {
                if initial_mix.is_some() {
                    return Err(LoadError::DuplicateInit { line: line_no });
                }
                if tokens.len() < 2 {
                    return Err(malformed(line_no, "init", "record too short"));
                }
                let n: usize = tokens[1]
                    .parse()
                    .map_err(|_| malformed(line_no, "init", format!("bad count {:?}", tokens[1])))?;
                let names = &tokens[2..];
                if names.len() != n {
                    return Err(malformed(
                        line_no,
                        "init",
                        format!("declared {n} species but listed {}", names.len()),
                    ));
                }
                let mut mix = Vec::with_capacity(n);
                for name in names {
                    let key = elements
                        .lookup_by_name(name)
                        .ok_or_else(|| LoadError::UnknownSpecies {
                            line: line_no,
                            name: name.to_string(),
                        })?
                        .key;
                    mix.push(key);
                }
                initial_mix = Some(mix);
            }
            other => {
                return Err(malformed(
                    line_no,
                    "record",
                    format!("unknown keyword {other:?}"),
                ))
            }
        }
    }

    Ok(initial_mix.unwrap_or_default())
}

/// Groups consecutive-or-not occurrences of the same key, preserving first-occurrence order —
/// the inverse of the stoichiometric expansion `parse_side` performs.
fn group_counts(keys: &[u64]) -> Vec<(u64, usize)> {
    let mut groups: Vec<(u64, usize)> = Vec::new();
    for &key in keys {
        if let Some(last) = groups.iter_mut().find(|(k, _)| *k == key) {
            last.1 += 1;
        } else {
            groups.push((key, 1));
        }
    }
    groups
}

fn format_side(keys: &[u64], elements: &ElementRegistry) -> String {
    group_counts(keys)
        .into_iter()
        .map(|(key, count)| {
            let name = &elements.lookup_by_key(key).expect("key came from a live element").name;
            if count == 1 {
                name.clone()
            } else {
                format!("{count} {name}")
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Emits the periodic table (minus solvent) and reaction table in the `ele`/`rxn` grammar, the
/// half of the config echo that must round-trip through `load_chemistry`.
pub fn write_chemistry(elements: &ElementRegistry, reactions: &ReactionTable) -> String {
    let mut out = String::new();
    for element in elements.iter_reportable() {
        out.push_str(&format!(
            "ele {} {} {} {}\n",
            element.name, element.symbol, element.color, element.charge
        ));
    }
    for reaction in reactions.iter() {
        out.push_str(&format!(
            "rxn {} {} -> {}\n",
            reaction.first_prob,
            format_side(&reaction.reactants, elements),
            format_side(&reaction.first_products, elements),
        ));
        if let (Some(products), Some(prob)) = (&reaction.second_products, reaction.second_prob) {
            out.push_str(&format!(
                "rxn {} {} -> {}\n",
                prob,
                format_side(&reaction.reactants, elements),
                format_side(products, elements),
            ));
        }
    }
    out
}
