//! Black-box scenarios run against the public `Engine` API.

use latticechem::{Engine, EngineConfig};

#[test]
fn s1_empty_world_reports_zero_counts_throughout() {
    let config = EngineConfig {
        world_x: 4,
        world_y: 4,
        atom_count: 0,
        max_iters: 10,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config).unwrap();

    let mut steps = 0;
    while engine.iterate() {
        let census = engine.take_census();
        assert_eq!(census.total, 0);
        steps += 1;
    }

    assert_eq!(steps, 10);
    assert_eq!(engine.current_iter(), 10);
    engine.finalize().unwrap();
}

#[test]
fn s2_single_atom_drifts_without_collision() {
    let config = EngineConfig {
        world_x: 16,
        world_y: 16,
        atom_count: 1,
        do_reactions: false,
        seed: 1,
        max_iters: 1000,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config).unwrap();
    while engine.iterate() {}

    let atoms: Vec<_> = (0..16)
        .flat_map(|y| (0..16).map(move |x| (x, y)))
        .filter_map(|(x, y)| engine.world_at(x, y))
        .collect();
    assert_eq!(atoms.len(), 1);
    assert_eq!(atoms[0].collisions(), 0);
    assert_eq!(atoms[0].ideal_displacement(), atoms[0].actual_displacement());
}

#[test]
fn s4_first_order_decay_empties_the_world_in_one_iteration() {
    let dir = std::env::temp_dir().join("latticechem-scenario-s4");
    std::fs::create_dir_all(&dir).unwrap();
    let load_path = dir.join("chem.txt");
    std::fs::write(&load_path, "ele A A 0 0\nrxn 1.0 A -> Solvent\ninit 1 A\n").unwrap();

    let config = EngineConfig {
        world_x: 8,
        world_y: 8,
        atom_count: 32,
        max_iters: 1,
        seed: 7,
        load_file: Some(load_path),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config).unwrap();
    engine.iterate();

    let census = engine.take_census();
    assert_eq!(census.total, 0);
    assert!(census.counts.iter().all(|(_, count)| *count == 0));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn s5_deterministic_replay_matches_cell_by_cell() {
    let dir = std::env::temp_dir().join("latticechem-scenario-s5");
    std::fs::create_dir_all(&dir).unwrap();
    let load_path = dir.join("chem.txt");
    std::fs::write(
        &load_path,
        "ele A A 0 0\nele B B 0 0\nrxn 0.3 A + B -> A + A\ninit 2 A B\n",
    )
    .unwrap();

    let make = || {
        let config = EngineConfig {
            world_x: 12,
            world_y: 12,
            atom_count: 40,
            max_iters: 100,
            seed: 42,
            load_file: Some(load_path.clone()),
            ..EngineConfig::default()
        };
        Engine::new(config).unwrap()
    };

    let mut a = make();
    let mut b = make();
    while a.iterate() {
        b.iterate();
    }

    for y in 0..12 {
        for x in 0..12 {
            let av = a.world_at(x, y);
            let bv = b.world_at(x, y);
            assert_eq!(av.map(|v| v.element()), bv.map(|v| v.element()));
        }
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn s6_id_string_matches_the_published_dsfmt_parameterization() {
    let engine = Engine::new(EngineConfig {
        world_x: 1,
        world_y: 1,
        atom_count: 0,
        max_iters: 0,
        ..EngineConfig::default()
    })
    .unwrap();
    assert_eq!(
        engine.id_string(),
        "dSFMT-607:2-33-1-7-24:ffcfeef7fdffffff-fdffffb7ffffffff"
    );
}

#[test]
fn atom_count_is_clamped_to_world_capacity_at_construction() {
    let config = EngineConfig {
        world_x: 2,
        world_y: 2,
        atom_count: 1000,
        max_iters: 0,
        ..EngineConfig::default()
    };
    let engine = Engine::new(config).unwrap();
    let occupied = (0..2)
        .flat_map(|y| (0..2).map(move |x| (x, y)))
        .filter(|&(x, y)| engine.world_at(x, y).is_some())
        .count();
    assert_eq!(occupied, 4);
}
