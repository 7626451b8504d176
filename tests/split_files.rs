#[path = "common/mod.rs"]
mod common;

use common::*;
use sparql_dump::SparqlDump;

#[test]
fn one_file_per_batch_named_by_offset() {
    let tmp = tempfile::tempdir().unwrap();
    let endpoint = FakeEndpoint::with_total(120);

    let outcome = SparqlDump::new()
        .endpoint("http://fake.test/sparql")
        .where_clause("?s ?p ?o")
        .batch_size(50)
        .split_files(true)
        .file_prefix("dump")
        .output_dir(tmp.path().join("dumps"))
        .progress(false)
        .run_with(&endpoint)
        .unwrap();

    assert_eq!(outcome.batches_attempted, 3);
    let dumps = tmp.path().join("dumps");
    assert_eq!(
        dir_file_names(&dumps),
        vec!["dump0.nt", "dump100.nt", "dump50.nt"]
    );

    // No two batches share a file, and each file holds exactly its slice.
    assert_eq!(read_nt_lines(&dumps.join("dump0.nt")).len(), 50);
    assert_eq!(read_nt_lines(&dumps.join("dump50.nt")).len(), 50);
    assert_eq!(read_nt_lines(&dumps.join("dump100.nt")).len(), 20);

    let second = parse_nt_file(&dumps.join("dump50.nt"));
    assert_eq!(second[0], FakeEndpoint::triple_at(50));
    assert_eq!(second[49], FakeEndpoint::triple_at(99));
}

/// A failed batch still opened its file first, so the file count equals the
/// attempted iteration count. The failed page's file stays behind as-is.
#[test]
fn failed_batch_leaves_its_file_behind() {
    let tmp = tempfile::tempdir().unwrap();
    let endpoint = FakeEndpoint::with_total(120).failing_at(&[50]);

    let outcome = SparqlDump::new()
        .endpoint("http://fake.test/sparql")
        .where_clause("?s ?p ?o")
        .batch_size(50)
        .split_files(true)
        .file_prefix("dump")
        .output_dir(tmp.path().join("dumps"))
        .progress(false)
        .run_with(&endpoint)
        .unwrap();

    assert_eq!(outcome.batches_attempted, 3);
    assert_eq!(outcome.batches_failed, 1);

    let dumps = tmp.path().join("dumps");
    assert_eq!(
        dir_file_names(&dumps),
        vec!["dump0.nt", "dump100.nt", "dump50.nt"]
    );
    // The endpoint failed before streaming anything for that page.
    assert!(read_nt_lines(&dumps.join("dump50.nt")).is_empty());
    assert_eq!(read_nt_lines(&dumps.join("dump100.nt")).len(), 20);
}

#[test]
fn starting_offset_shows_up_in_file_names() {
    let tmp = tempfile::tempdir().unwrap();
    let endpoint = FakeEndpoint::with_total(120);

    SparqlDump::new()
        .endpoint("http://fake.test/sparql")
        .where_clause("?s ?p ?o")
        .batch_size(50)
        .offset(50)
        .split_files(true)
        .file_prefix("dump")
        .output_dir(tmp.path().join("dumps"))
        .progress(false)
        .run_with(&endpoint)
        .unwrap();

    assert_eq!(
        dir_file_names(&tmp.path().join("dumps")),
        vec!["dump100.nt", "dump50.nt"]
    );
}
