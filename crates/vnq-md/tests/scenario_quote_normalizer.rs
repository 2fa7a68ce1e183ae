//! Column fallback chain for quote normalization.
//!
//! GREEN when:
//! - dates come from `time`, else `date`, else the stringified row index
//! - closes come from `close`, else `close_price`, else `closePrice`, else the last column
//! - dates and closes always have the same length
//! - an empty table normalizes to empty sequences

use serde_json::json;
use vnq_md::quote::{resolve_close_source, CloseSource};
use vnq_md::{normalize, Cell, Frame};

fn frame(names: &[&str], rows: Vec<Vec<Cell>>) -> Frame {
    Frame::from_rows(names, rows).expect("rectangular rows")
}

#[test]
fn ohlc_table_with_time_column() {
    let f = frame(
        &["time", "open", "high", "low", "close"],
        vec![vec![
            "2024-01-02".into(),
            10.0.into(),
            10.5.into(),
            9.8.into(),
            10.2.into(),
        ]],
    );

    let q = normalize("ACB", &f);
    assert_eq!(
        serde_json::to_value(&q).unwrap(),
        json!({"symbol": "ACB", "dates": ["2024-01-02"], "closes": [10.2]})
    );
}

#[test]
fn date_and_close_price_camel_case() {
    let f = frame(
        &["date", "closePrice"],
        vec![vec!["2024-03-01".into(), 55.5.into()]],
    );

    let q = normalize("VNM", &f);
    assert_eq!(q.dates(), &["2024-03-01".to_string()]);
    assert_eq!(q.closes(), &[Some(55.5)]);
}

#[test]
fn close_price_snake_case_beats_camel_case() {
    let f = frame(
        &["date", "closePrice", "close_price"],
        vec![vec!["2024-03-01".into(), 1.0.into(), 2.0.into()]],
    );
    assert_eq!(normalize("VNM", &f).closes(), &[Some(2.0)]);
}

#[test]
fn neither_date_column_uses_row_index() {
    let f = frame(
        &["open", "close"],
        vec![
            vec![1.0.into(), 1.5.into()],
            vec![2.0.into(), 2.5.into()],
            vec![3.0.into(), 3.5.into()],
        ],
    );
    let q = normalize("ACB", &f);
    assert_eq!(q.dates(), &["0".to_string(), "1".to_string(), "2".to_string()]);
    assert_eq!(q.closes(), &[Some(1.5), Some(2.5), Some(3.5)]);
}

#[test]
fn no_close_column_uses_last_column_values() {
    let f = frame(
        &["time", "open", "turnover"],
        vec![
            vec!["2024-01-02".into(), 1.0.into(), 900_i64.into()],
            vec!["2024-01-03".into(), 2.0.into(), 950_i64.into()],
        ],
    );
    assert_eq!(resolve_close_source(&f), CloseSource::LastColumn("turnover"));
    let q = normalize("ACB", &f);
    assert_eq!(q.closes(), &[Some(900.0), Some(950.0)]);
}

#[test]
fn last_column_fallback_ignores_earlier_namesakes() {
    let f = frame(
        &["v", "open", "v"],
        vec![
            vec![1.0.into(), 2.0.into(), 3.0.into()],
            vec![4.0.into(), 5.0.into(), 6.0.into()],
        ],
    );
    assert_eq!(resolve_close_source(&f), CloseSource::LastColumn("v"));
    assert_eq!(normalize("ACB", &f).closes(), &[Some(3.0), Some(6.0)]);
}

#[test]
fn empty_table_gives_empty_sequences() {
    let q = normalize("ACB", &Frame::empty(&["time", "close"]));
    let v = serde_json::to_value(&q).unwrap();
    assert_eq!(v["dates"], json!([]));
    assert_eq!(v["closes"], json!([]));

    let q = normalize("ACB", &Frame::default());
    assert!(q.is_empty());
}

#[test]
fn lengths_match_for_every_column_layout() {
    let names = ["time", "date", "close", "close_price", "closePrice", "volume"];
    let rows = 4;

    // Every non-empty subset of the candidate names, in a fixed order.
    for mask in 1u32..(1 << names.len()) {
        let picked: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, n)| *n)
            .collect();

        let data: Vec<Vec<Cell>> = (0..rows)
            .map(|r| picked.iter().map(|_| Cell::Float(r as f64)).collect())
            .collect();
        let f = frame(&picked, data);
        let q = normalize("ACB", &f);

        assert_eq!(q.dates().len(), rows, "layout {picked:?}");
        assert_eq!(q.closes().len(), rows, "layout {picked:?}");
    }
}
