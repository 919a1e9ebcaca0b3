// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

use scvdj_core::import::TableRow;
use scvdj_core::store::RecordStore;
use scvdj_core::{VdjControl, VdjError};
use scvdj_stats::{abundance, annotate_clone_sizes, diversity, overlap, overlap_with};

fn row(id: &str, sample: &str, clone: &str) -> TableRow {
    if clone == "NA" {
        return TableRow::new(id).col("chain_type", "NA").col("sample", sample);
    }
    TableRow::new(id)
        .col("chain_type", "IGH;IGK")
        .col("cdr3_aa", "CARS;CQQS")
        .col("clonotype_id", &format!("{};{}", clone, clone))
        .col("sample", sample)
}

// s1: k1 k1 k2 + one cell without chains; s2: k1 k3; s3: k4 k4 k4; s4: only a cell without
// chains; plus a cell with no sample.

fn store() -> RecordStore {
    let rows = vec![
        row("a", "s1", "k1"),
        row("b", "s1", "k1"),
        row("c", "s1", "k2"),
        row("d", "s1", "NA"),
        row("e", "s2", "k1"),
        row("f", "s2", "k3"),
        row("g", "s3", "k4"),
        row("h", "s3", "k4"),
        row("i", "s3", "k4"),
        row("j", "s4", "NA"),
        row("k", "NA", "k5"),
    ];
    RecordStore::from_table(&rows).unwrap()
}

fn by_sample() -> VdjControl {
    let mut ctl = VdjControl::default();
    ctl.stats_opt.group_col = Some("sample".to_string());
    ctl
}

#[test]
fn test_abundance() {
    let store = store();
    let a = abundance(&store, &by_sample()).unwrap();
    let groups = a.iter().map(|x| x.group.as_str()).collect::<Vec<_>>();
    assert_eq!(groups, vec!["s1", "s2", "s3", "s4"]);
    assert_eq!(a[0].n_cells, 4);
    assert_eq!(a[0].n_classified, 3);
    assert_eq!(a[0].clones[0].clonotype, "k1");
    assert_eq!(a[0].clones[0].count, 2);
    assert!((a[0].clones[1].percent - 100.0 / 3.0).abs() < 1.0e-9);
    assert!(a[3].clones.is_empty());

    let all = abundance(&store, &VdjControl::default()).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].n_cells, 11);
    assert_eq!(all[0].clones[0].clonotype, "k1");
    assert_eq!(all[0].clones[0].count, 3);

    let json = serde_json::to_string(&a).unwrap();
    assert!(json.contains("\"clonotype\":\"k4\""));
}

#[test]
fn test_diversity() {
    let store = store();
    let d = diversity(&store, &by_sample()).unwrap();
    assert!((d[1].inverse_simpson.unwrap() - 2.0).abs() < 1.0e-9);
    assert_eq!(d[2].inverse_simpson, Some(1.0));
    assert_eq!(d[2].n_clonotypes, 1);
    assert_eq!(d[3].inverse_simpson, None);
    let x = d[0].inverse_simpson.unwrap();
    assert!(x >= 1.0 && x <= d[0].n_clonotypes as f64);
}

#[test]
fn test_overlap() {
    let store = store();
    let m = overlap(&store, &by_sample()).unwrap();
    assert_eq!(m.groups, vec!["s1", "s2", "s3", "s4"]);
    for i in 0..4 {
        for j in 0..4 {
            assert_eq!(m.jaccard[i][j], m.jaccard[j][i]);
            if let Some(x) = m.jaccard[i][j] {
                assert!((0.0..=1.0).contains(&x));
            }
        }
    }
    assert_eq!(m.jaccard[0][0], Some(1.0));
    assert!((m.jaccard[0][1].unwrap() - 1.0 / 3.0).abs() < 1.0e-9);
    assert_eq!(m.jaccard[0][2], Some(0.0));
    assert_eq!(m.jaccard[0][3], None);
    assert_eq!(m.jaccard[3][3], None);

    let rows = overlap_with(&store, &by_sample(), "s2").unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].group, "s1");
    assert_eq!(rows[0].jaccard, m.jaccard[1][0]);
    match overlap_with(&store, &by_sample(), "s9") {
        Err(VdjError::InvalidConfiguration(_)) => {}
        r => panic!("unexpected {:?}", r),
    }
    let mut ctl = by_sample();
    ctl.stats_opt.group_col = Some("donor".to_string());
    assert!(overlap(&store, &ctl).is_err());
}

#[test]
fn test_clone_sizes() {
    let mut store = store();
    let mut ctl = by_sample();
    ctl.gen_opt.prefix = "x_".to_string();
    annotate_clone_sizes(&mut store, &ctl).unwrap();
    assert_eq!(store.derived("a", "x_clone_freq"), Some("2"));
    assert_eq!(store.derived("e", "x_clone_freq"), Some("1"));
    assert_eq!(store.derived("e", "x_clone_frac"), Some("0.5"));
    assert_eq!(store.derived("g", "x_clone_frac"), Some("1"));
    assert_eq!(store.derived("d", "x_clone_freq"), None);
    assert_eq!(store.derived("k", "x_clone_freq"), None);

    annotate_clone_sizes(&mut store, &VdjControl::default()).unwrap();
    assert_eq!(store.derived("a", "clone_freq"), Some("3"));
    assert_eq!(store.derived("k", "clone_freq"), Some("1"));
    assert_eq!(store.derived("a", "x_clone_freq"), Some("2"));
}

#[test]
fn test_bad_config() {
    let mut store = store();
    let mut ctl = by_sample();
    ctl.cluster_opt.resolution = -1.0;
    match abundance(&store, &ctl) {
        Err(VdjError::InvalidConfiguration(_)) => {}
        r => panic!("unexpected {:?}", r),
    }
    assert!(annotate_clone_sizes(&mut store, &ctl).is_err());
    assert!(!store.has_column("clone_freq"));
}
