// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use scvdj_core::chain::{ChainRecord, ChainType};
use scvdj_core::store::{CellRecord, RecordStore};
use scvdj_core::VdjControl;
use scvdj_graph::{canonical_key, distance_matrix, neighbor_graph};

fn chain(t: ChainType, aa: &str) -> ChainRecord {
    ChainRecord::new(t, aa)
}

#[test]
fn test_heavy_only_distance() {
    let store = RecordStore::new(vec![
        CellRecord::new(
            "c1",
            vec![chain(ChainType::IGH, "CARS"), chain(ChainType::IGK, "CQQS")],
        ),
        CellRecord::new(
            "c2",
            vec![chain(ChainType::IGH, "CART"), chain(ChainType::IGK, "CQQS")],
        ),
        CellRecord::new("c3", Vec::new()),
    ])
    .unwrap();
    let mut ctl = VdjControl::default();
    ctl.graph_opt.chains = Some(vec![ChainType::IGH]);
    let dm = distance_matrix(&store, &ctl.graph_opt);
    assert_eq!(dm.cells, vec!["c1", "c2"]);
    assert_eq!(dm.keys, vec!["IGH:CARS", "IGH:CART"]);
    assert_eq!(dm.get_by_id("c1", "c2"), Some(Some(1)));
    assert_eq!(dm.get_by_id("c1", "c3"), None);

    let (_, g) = neighbor_graph(&store, &ctl).unwrap();
    assert_eq!(g.k, 1);
    assert_eq!(g.cell_ids(), vec!["c1", "c2"]);
    assert_eq!(g.weight("c1", "c2"), Some(2));
    assert_eq!(g.edge_list(), vec![("c1".to_string(), "c2".to_string(), 2)]);
}

fn repertoire() -> Vec<CellRecord> {
    let heavy = ["CARDYW", "CARDFW", "CAKGGW", "CTRDYW", "CARDYWG", "CASSF"];
    let light = ["CQQYNSW", "CQQYNSF", "CQSYDSS", "CMQALQT"];
    let mut cells = Vec::<CellRecord>::new();
    for i in 0..18 {
        let mut chains = vec![chain(ChainType::IGH, heavy[i % heavy.len()])];
        if i % 3 != 0 {
            chains.push(chain(ChainType::IGK, light[i % light.len()]));
        }
        if i % 4 == 0 {
            chains.push(chain(ChainType::IGH, heavy[(i + 1) % heavy.len()]));
        }
        cells.push(CellRecord::new(&format!("cell{}", i), chains));
    }
    cells.push(CellRecord::new("t1", vec![chain(ChainType::TRB, "CASSLG")]));
    cells
}

#[test]
fn test_chain_order_invariance() {
    let cells = repertoire();
    let mut shuffled = cells.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(123456789);
    for cell in shuffled.iter_mut() {
        cell.chains.shuffle(&mut rng);
    }
    let ctl = VdjControl::default();
    let a = RecordStore::new(cells).unwrap();
    let b = RecordStore::new(shuffled).unwrap();
    for i in 0..a.len() {
        assert_eq!(
            canonical_key(&a.cells()[i].chains, &ctl.graph_opt),
            canonical_key(&b.cells()[i].chains, &ctl.graph_opt)
        );
    }
    let (da, ga) = neighbor_graph(&a, &ctl).unwrap();
    let (db, gb) = neighbor_graph(&b, &ctl).unwrap();
    assert_eq!(da, db);
    assert_eq!(ga.edges(), gb.edges());

    // Symmetric, zero diagonal, no distance to the T cell.

    let n = da.n();
    for i in 0..n {
        assert_eq!(da.get(i, i), Some(0));
        for j in 0..n {
            assert_eq!(da.get(i, j), da.get(j, i));
        }
    }
    assert_eq!(da.get_by_id("cell0", "t1"), Some(None));
}

#[test]
fn test_neighbor_count() {
    let store = RecordStore::new(repertoire()).unwrap();
    let mut ctl = VdjControl::default();
    ctl.graph_opt.k = 3;
    let (dm, g) = neighbor_graph(&store, &ctl).unwrap();
    assert_eq!(g.n_nodes(), dm.n());
    assert_eq!(g.k, 3);
    let t = g.node_position("t1").unwrap();
    assert!(g.edges().iter().all(|e| e.0 != t && e.1 != t));
    ctl.graph_opt.k = 0;
    assert!(neighbor_graph(&store, &ctl).is_err());
}
