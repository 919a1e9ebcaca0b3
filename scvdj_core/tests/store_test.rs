// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

use scvdj_core::chain::{ChainAttr, ChainType};
use scvdj_core::import::{read_contig_json, TableRow};
use scvdj_core::store::RecordStore;
use scvdj_core::VdjError;

fn table() -> Vec<TableRow> {
    vec![
        TableRow::new("c1")
            .col("chain_type", "IGH;IGK")
            .col("cdr3_aa", "CARS;CQQS")
            .col("v_gene", "IGHV1-2;IGKV3-20")
            .col("d_gene", "IGHD3-10;NA")
            .col("umis", "12;4")
            .col("sample", "s1"),
        TableRow::new("c2")
            .col("chain_type", "IGH")
            .col("cdr3_aa", "CART")
            .col("v_gene", "IGHV1-2")
            .col("d_gene", "NA")
            .col("umis", "3")
            .col("sample", "s2"),
        TableRow::new("c3")
            .col("chain_type", "NA")
            .col("cdr3_aa", "NA")
            .col("v_gene", "NA")
            .col("d_gene", "NA")
            .col("umis", "NA")
            .col("sample", "s1"),
    ]
}

#[test]
fn test_import_table() {
    let store = RecordStore::from_table(&table()).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.n_vdj(), 2);
    let c1 = store.get_chains("c1").unwrap();
    assert_eq!(c1.len(), 2);
    assert_eq!(c1[0].chain_type, ChainType::IGH);
    assert_eq!(c1[1].cdr3_aa, "CQQS");
    assert_eq!(c1[0].d_gene, Some("IGHD3-10".to_string()));
    assert_eq!(c1[1].d_gene, None);
    assert_eq!(c1[0].umis, 12);
    assert!(store.get_chains("c3").unwrap().is_empty());
    assert_eq!(store.derived("c1", "n_chains"), Some("2"));
    assert_eq!(store.derived("c3", "n_chains"), None);

    // Every chain column has one entry per chain.

    for cell in store.cells().iter() {
        let n = cell.n_chains();
        assert_eq!(cell.chain_values(ChainAttr::ChainType).len(), n);
        assert_eq!(cell.chain_values(ChainAttr::Cdr3Aa).len(), n);
        assert_eq!(cell.chain_values(ChainAttr::Umis).len(), n);
    }
    assert_eq!(store.column_value(0, "d_gene"), Some("IGHD3-10;NA".to_string()));
    assert_eq!(store.column_value(2, "cdr3_aa"), None);
    assert_eq!(store.column_value(1, "sample"), Some("s2".to_string()));
    assert!(store.has_column("sample"));
    assert!(!store.has_column("donor"));
}

#[test]
fn test_reject_malformed() {
    let rows = vec![
        TableRow::new("c1").col("chain_type", "IGH;IGK").col("cdr3_aa", "CARS;CQQS"),
        TableRow::new("c9").col("chain_type", "IGH;IGK").col("cdr3_aa", "CARS"),
    ];
    match RecordStore::from_table(&rows) {
        Err(VdjError::MalformedRecord { cell, column, .. }) => {
            assert_eq!(cell, "c9");
            assert_eq!(column, "cdr3_aa");
        }
        x => panic!("unexpected {:?}", x),
    }
    let rows = vec![TableRow::new("c1").col("chain_type", "IGH").col("umis", "many")];
    match RecordStore::from_table(&rows) {
        Err(VdjError::MalformedRecord { column, .. }) => assert_eq!(column, "umis"),
        x => panic!("unexpected {:?}", x),
    }
    let rows = vec![TableRow::new("c1"), TableRow::new("c1")];
    match RecordStore::from_table(&rows) {
        Err(VdjError::MalformedRecord { column, .. }) => assert_eq!(column, "cell_id"),
        x => panic!("unexpected {:?}", x),
    }
}

#[test]
fn test_filter_and_derive() {
    let mut store = RecordStore::from_table(&table()).unwrap();
    {
        let view = store.filter_cells(|id| id != "c2");
        assert_eq!(view.cell_ids(), vec!["c1", "c3"]);
        assert!(view.contains("c3"));
        assert!(!view.contains("c2"));
        let sub = store.restrict(&view);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.get_chains("c1").unwrap().len(), 2);
        assert!(sub.get_chains("c2").is_err());
    }
    store.set_derived("c2", "tag", Some("x".to_string())).unwrap();
    assert_eq!(store.derived("c2", "tag"), Some("x"));
    assert!(store.set_derived("c7", "tag", None).is_err());
    assert!(store.commit("tag", vec![None]).is_err());
    assert_eq!(store.derived("c2", "tag"), Some("x"));
    store
        .commit("tag", vec![Some("a".to_string()), None, Some("c".to_string())])
        .unwrap();
    assert_eq!(store.derived("c2", "tag"), None);
    assert_eq!(store.column_value(0, "tag"), Some("a".to_string()));
}

#[test]
fn test_table_round_trip() {
    let store = RecordStore::from_table(&table()).unwrap();
    let rows = store.to_table();
    let again = RecordStore::from_table(&rows).unwrap();
    for i in 0..store.len() {
        assert_eq!(store.cells()[i].chains, again.cells()[i].chains);
        assert_eq!(
            store.column_value(i, "sample"),
            again.column_value(i, "sample")
        );
    }
}

#[test]
fn test_import_contigs() {
    let json = r###"[
        {"barcode": "AAAC-1", "contig_id": "AAAC-1_contig_1", "chain": "IGK",
         "v_gene": "IGKV3-20", "d_gene": "None", "productive": true, "cdr3": "CQQS",
         "reads": 800, "umis": 9, "raw_clonotype_id": "clonotype1"},
        {"barcode": "AAAC-1", "contig_id": "AAAC-1_contig_2", "chain": "IGH",
         "v_gene": "IGHV1-2", "productive": true, "cdr3": "CARS",
         "reads": 1500, "umis": 20, "raw_clonotype_id": "clonotype1"},
        {"barcode": "AAAC-1", "contig_id": "AAAC-1_contig_3", "chain": "Multi",
         "productive": false},
        {"barcode": "GGGT-1", "contig_id": "GGGT-1_contig_1", "chain": "TRB",
         "productive": true, "cdr3": "CASS"}
    ]"###;
    let contigs = read_contig_json(json).unwrap();
    assert_eq!(contigs.len(), 4);
    assert_eq!(contigs[2].chain, ChainType::Other);
    let rows = vec![TableRow::new("AAAC-1").col("sample", "s1"), TableRow::new("CCCA-1")];
    let store = RecordStore::from_contigs(&rows, &contigs, true).unwrap();
    assert_eq!(store.len(), 2);
    let chains = store.get_chains("AAAC-1").unwrap();
    assert_eq!(chains.len(), 2);
    assert_eq!(chains[0].chain_type, ChainType::IGK);
    assert_eq!(chains[0].d_gene, None);
    assert_eq!(chains[1].umis, 20);
    assert_eq!(chains[1].clonotype_id, "clonotype1");
    assert!(store.get_chains("CCCA-1").unwrap().is_empty());

    let store = RecordStore::from_contigs(&rows, &contigs, false).unwrap();
    assert_eq!(store.get_chains("AAAC-1").unwrap().len(), 3);
    assert!(read_contig_json("[{\"chain\": \"IGH\"}]").is_err());
}
