#![cfg(test)]

use std::fs;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::LevelFilter;
use rstest::rstest;
use strata::compare::Operator;
use strata::dtype::{ColumnDetails, DType, Nullability};
use strata::file::{BinaryTableReader, BinaryTableWriter, read_schema, read_utf8_column};
use strata::source::{BatchSource, BatchSourceExt};
use strata::tabular::{CsvReadOptions, TabularFileReader};
use strata::{Scalar, init_logging};

const PEOPLE: &str = "\
name,city,team
ann,Oslo,red
bob,Lyon,blue
cyd,,red
dee,Bern,green
eve,\"Kyiv, UA\",red
";

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn column(root: &Path, name: &str) -> Vec<String> {
    read_utf8_column(root, name)
        .unwrap()
        .into_iter()
        .map(|value| String::from_utf8(value.to_vec()).unwrap())
        .collect()
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(64)]
fn csv_filter_write_read_back(#[case] batch_size: usize) {
    init_logging(LevelFilter::Trace);
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "people.csv", PEOPLE);
    let table = dir.path().join("table");

    let source = TabularFileReader::open(&csv, CsvReadOptions::default())
        .unwrap()
        .filter("team", Operator::Eq, Scalar::utf8("red").unwrap())
        .unwrap();
    let mut writer = BinaryTableWriter::try_new(source, &table).unwrap();
    assert_eq!(writer.run(batch_size).unwrap(), 3);
    assert_eq!(writer.next(batch_size).unwrap(), 0);
    writer.dispose().unwrap();

    let schema = read_schema(&table).unwrap();
    assert_eq!(
        schema.iter().map(ColumnDetails::name).collect_vec(),
        vec!["name", "city", "team"]
    );
    assert!(
        schema
            .iter()
            .all(|c| *c.dtype() == DType::Utf8(Nullability::NonNullable))
    );
    assert_eq!(column(&table, "name"), vec!["ann", "cyd", "eve"]);
    assert_eq!(column(&table, "city"), vec!["Oslo", "", "Kyiv, UA"]);

    let mut reader = BinaryTableReader::open(&table).unwrap();
    let city = reader.column_getter(1).unwrap();
    assert_eq!(reader.next(10).unwrap(), 3);
    assert_eq!(
        reader
            .batch(city)
            .unwrap()
            .utf8_values()
            .unwrap()
            .map(<[u8]>::to_vec)
            .collect_vec(),
        vec![b"Oslo".to_vec(), Vec::new(), b"Kyiv, UA".to_vec()]
    );
    assert_eq!(reader.next(10).unwrap(), 0);
}

#[test]
fn string_operators_filter_tsv() {
    let dir = tempfile::tempdir().unwrap();
    let tsv = write_csv(
        dir.path(),
        "words.tsv",
        "word\tnote\nstrata\ta\nstream\t\nstone\tc\0d\nlayer\t\n",
    );

    let mut source = TabularFileReader::open(&tsv, CsvReadOptions::default())
        .unwrap()
        .filter("word", Operator::StartsWith, Scalar::utf8("st").unwrap())
        .unwrap()
        .filter("word", Operator::Contains, Scalar::utf8("r").unwrap())
        .unwrap();
    let word = source.column_getter(0).unwrap();
    let mut words = Vec::new();
    while source.next(2).unwrap() > 0 {
        words.extend(
            source
                .batch(word)
                .unwrap()
                .utf8_values()
                .unwrap()
                .map(|w| String::from_utf8_lossy(w).into_owned()),
        );
    }
    assert_eq!(words, vec!["strata", "stream"]);
}

#[test]
fn empty_and_nul_values_round_trip_through_a_table() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "raw.csv", "v\n\"\"\na\0b\n\"\0\"\n\nxyz\n");
    let table = dir.path().join("table");

    let source = TabularFileReader::open(&csv, CsvReadOptions::default()).unwrap();
    let mut writer = BinaryTableWriter::try_new(source, &table).unwrap();
    let rows = writer.run(2).unwrap();
    drop(writer);

    let values = column(&table, "v");
    assert_eq!(values.len(), rows);
    assert_eq!(values, vec!["", "a\0b", "\0", "xyz"]);
}

#[test]
fn rewriting_after_reset_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "people.csv", PEOPLE);
    let table = dir.path().join("table");

    let mut writer = BinaryTableWriter::try_new(
        TabularFileReader::open(&csv, CsvReadOptions::default()).unwrap(),
        &table,
    )
    .unwrap();
    assert_eq!(writer.next(3).unwrap(), 3);
    writer.reset().unwrap();
    assert_eq!(writer.run(4).unwrap(), 5);
    writer.dispose().unwrap();
    writer.dispose().unwrap();

    assert_eq!(
        column(&table, "name"),
        vec!["ann", "bob", "cyd", "dee", "eve"]
    );
}

#[test]
fn mismatched_filter_value_fails_before_pulling() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "people.csv", PEOPLE);
    let source = TabularFileReader::open(&csv, CsvReadOptions::default()).unwrap();
    let err = source
        .filter("team", Operator::Eq, Scalar::primitive(1i32))
        .unwrap_err();
    assert!(err.to_string().contains("expected type"));
}

#[rstest]
#[case("a,a\nxxxx,y\nzzzz,w\n")]
#[case("../escaped\nx\n")]
fn headers_that_are_not_column_names_fail_the_write(#[case] contents: &str) {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_csv(dir.path(), "bad.csv", contents);
    let table = dir.path().join("table");

    let source = TabularFileReader::open(&csv, CsvReadOptions::default()).unwrap();
    assert!(BinaryTableWriter::try_new(source, &table).is_err());
    assert!(!table.exists());
    assert!(!dir.path().join("escaped").exists());
}
