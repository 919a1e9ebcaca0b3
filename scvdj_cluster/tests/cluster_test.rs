// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

use scvdj_cluster::cluster_cells;
use scvdj_core::chain::{ChainRecord, ChainType};
use scvdj_core::store::{CellRecord, RecordStore};
use scvdj_core::{VdjControl, VdjError};

fn cell(id: &str, heavy: &str, light: &str) -> CellRecord {
    CellRecord::new(
        id,
        vec![
            ChainRecord::new(ChainType::IGH, heavy),
            ChainRecord::new(ChainType::IGK, light),
        ],
    )
}

// Two clonotype families, each a few cells with near-identical chains, plus a cell without
// chains.

fn families() -> RecordStore {
    RecordStore::new(vec![
        cell("a1", "CARDYYGMDVW", "CQQYNSYPLTF"),
        cell("b1", "CTTEGSSWFDPW", "CQSADSSGTYVF"),
        cell("a2", "CARDYYGMDAW", "CQQYNSYPLTF"),
        cell("a3", "CARDFYGMDVW", "CQQYNSYPLTF"),
        CellRecord::new("n1", Vec::new()),
        cell("b2", "CTTEGSSWFDLW", "CQSADSSGTYVF"),
        cell("a4", "CARDYYGMDVW", "CQQYNSYPITF"),
        cell("b3", "CTTEGSSWYDPW", "CQSADSSGTYVF"),
        cell("b4", "CTTEGSSWFDPW", "CQSADSSGTHVF"),
    ])
    .unwrap()
}

#[test]
fn test_two_families() {
    let mut store = families();
    let mut ctl = VdjControl::default();
    ctl.graph_opt.k = 3;
    let run = cluster_cells(&mut store, &ctl).unwrap();
    assert!(run.warning.is_none());
    assert_eq!(run.assignment.n_clusters(), 2);
    let a = run.assignment.get("a1").unwrap();
    let b = run.assignment.get("b1").unwrap();
    assert_ne!(a, b);
    for id in ["a2", "a3", "a4"].iter() {
        assert_eq!(run.assignment.get(id), Some(a));
    }
    for id in ["b2", "b3", "b4"].iter() {
        assert_eq!(run.assignment.get(id), Some(b));
    }
    assert_eq!(run.assignment.get("n1"), None);
    assert_eq!(store.derived("a1", "cluster"), Some(a));
    assert_eq!(store.derived("n1", "cluster"), None);
    assert_eq!(store.graph("graph").unwrap().n_nodes(), 8);
    assert!(run.modularity > 0.0);

    // Equal sizes, so the family seen first gets label 0.

    assert_eq!(a, "0");

    let summary = serde_json::to_string(&run.summary()).unwrap();
    assert!(summary.contains("\"n_clusters\":2"));
}

#[test]
fn test_deterministic() {
    let mut ctl = VdjControl::default();
    ctl.graph_opt.k = 4;
    let mut s1 = families();
    let mut s2 = families();
    let r1 = cluster_cells(&mut s1, &ctl).unwrap();
    let r2 = cluster_cells(&mut s2, &ctl).unwrap();
    assert_eq!(r1.assignment, r2.assignment);
    assert_eq!(r1.graph.edges(), r2.graph.edges());
    let again = cluster_cells(&mut s1, &ctl).unwrap();
    assert_eq!(r1.assignment, again.assignment);
}

#[test]
fn test_resolution() {
    let mut counts = Vec::<usize>::new();
    for gamma in [0.01, 1.0, 20.0].iter() {
        let mut store = families();
        let mut ctl = VdjControl::default();
        ctl.graph_opt.k = 3;
        ctl.cluster_opt.resolution = *gamma;
        counts.push(cluster_cells(&mut store, &ctl).unwrap().assignment.n_clusters());
    }
    assert!(counts[0] <= counts[1]);
    assert!(counts[1] < counts[2]);

    let mut store = families();
    let mut ctl = VdjControl::default();
    ctl.cluster_opt.resolution = 0.0;
    match cluster_cells(&mut store, &ctl) {
        Err(VdjError::InvalidConfiguration(_)) => {}
        r => panic!("unexpected {:?}", r.map(|x| x.assignment)),
    }
    assert_eq!(store.derived("a1", "cluster"), None);
}

#[test]
fn test_prefixes_are_separate() {
    let mut store = families();
    let mut ctl = VdjControl::default();
    ctl.graph_opt.k = 3;
    ctl.gen_opt.prefix = "heavy_".to_string();
    ctl.graph_opt.chains = Some(vec![ChainType::IGH]);
    cluster_cells(&mut store, &ctl).unwrap();
    ctl.gen_opt.prefix = "light_".to_string();
    ctl.graph_opt.chains = Some(vec![ChainType::IGK]);
    cluster_cells(&mut store, &ctl).unwrap();
    assert!(store.derived("a1", "heavy_cluster").is_some());
    assert!(store.derived("a1", "light_cluster").is_some());
    assert!(store.graph("heavy_graph").is_some());
    assert!(store.graph("light_graph").is_some());
    assert!(store.graph("graph").is_none());
}

#[test]
fn test_empty_graph() {
    let mut store = families();
    let mut ctl = VdjControl::default();
    ctl.graph_opt.chains = Some(vec![ChainType::TRB]);
    let run = cluster_cells(&mut store, &ctl).unwrap();
    assert_eq!(run.warning, Some(VdjError::EmptyGraph));
    assert!(run.assignment.labels.iter().all(|x| x.1.is_none()));
    assert_eq!(run.assignment.n_clusters(), 0);
    assert_eq!(run.graph.n_nodes(), 0);
}

#[test]
fn test_bad_config_commits_nothing() {
    let mut store = families();
    let mut ctl = VdjControl::default();
    ctl.graph_opt.k = 0;
    match cluster_cells(&mut store, &ctl) {
        Err(VdjError::InvalidConfiguration(_)) => {}
        r => panic!("unexpected {:?}", r.map(|x| x.assignment)),
    }
    let mut ctl = VdjControl::default();
    ctl.graph_opt.chains = Some(Vec::new());
    match cluster_cells(&mut store, &ctl) {
        Err(VdjError::InvalidConfiguration(_)) => {}
        r => panic!("unexpected {:?}", r.map(|x| x.assignment)),
    }
    assert!(!store.has_column("cluster"));
    assert!(store.graph("graph").is_none());
}
