//! Stable ascending sort of table rows by column E.

use polars::prelude::{AnyValue, DataFrame, PlSmallStr, SortMultipleOptions};

use crate::conf::{C_COL_SORT_KEY_LETTER, N_IDX_COL_SORT_KEY};
use crate::spec::{EnumKeyCompareMode, SortSheetError, SpecSortReport};
use crate::table::{C_COL_KEY, C_COL_ROW_IDX, SpecSheetTable};

/// Sort rows ascending by the fifth column, keeping ties in input order.
///
/// - Fails with [`SortSheetError::Schema`] when the table has fewer than five
///   columns.
/// - Nulls sort before every non-null value.
/// - Numeric/date/boolean/text columns use their natural order; a column
///   mixing value kinds is ordered by cell text. Cell values themselves are
///   never changed.
///
/// The input table is left untouched.
pub fn sort_by_column_e(
    table: &SpecSheetTable,
) -> Result<(SpecSheetTable, SpecSortReport), SortSheetError> {
    let n_width = table.width();
    if n_width <= N_IDX_COL_SORT_KEY {
        return Err(SortSheetError::Schema { n_cols: n_width });
    }

    let l_colnames = table.column_names();
    let c_key_name = l_colnames[N_IDX_COL_SORT_KEY].clone();
    let (df_key, rule_compare) = table.derive_key_frame(N_IDX_COL_SORT_KEY)?;

    let mut report = SpecSortReport {
        n_rows: table.height(),
        n_cols: n_width,
        sort_column_name: c_key_name.clone(),
        rule_compare,
        ..Default::default()
    };
    if rule_compare == EnumKeyCompareMode::Text {
        report.warn(format!(
            "Column {C_COL_SORT_KEY_LETTER} ({c_key_name:?}) mixes value types; rows were ordered by cell text."
        ));
    }

    let df_sorted = df_key
        .sort(
            vec![PlSmallStr::from(C_COL_KEY)],
            SortMultipleOptions::default()
                .with_order_descending(false)
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .map_err(|err| SortSheetError::Table(format!("Failed to sort by {c_key_name:?}: {err}")))?;
    let l_idx_rows = derive_row_order(&df_sorted)?;

    log::debug!(
        "Sorted {} rows by column {C_COL_SORT_KEY_LETTER} ({c_key_name:?}, compare={})",
        report.n_rows,
        report.rule_compare
    );
    Ok((table.take_rows(&l_idx_rows)?, report))
}

fn derive_row_order(df_sorted: &DataFrame) -> Result<Vec<usize>, SortSheetError> {
    let col_idx_row = df_sorted
        .column(C_COL_ROW_IDX)
        .map_err(|err| SortSheetError::Table(err.to_string()))?;
    (0..df_sorted.height())
        .map(|n_pos| {
            match col_idx_row
                .get(n_pos)
                .map_err(|err| SortSheetError::Table(err.to_string()))?
            {
                AnyValue::Int64(n_idx) => usize::try_from(n_idx)
                    .map_err(|_| SortSheetError::Table(format!("invalid row index: {n_idx}"))),
                other => Err(SortSheetError::Table(format!(
                    "unexpected row index value: {other}"
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::EnumCellValue;

    fn s(v: &str) -> EnumCellValue {
        EnumCellValue::String(v.to_string())
    }

    fn n(v: f64) -> EnumCellValue {
        EnumCellValue::Number(v)
    }

    fn headers(n_cols: usize) -> Vec<String> {
        (0..n_cols).map(|idx| format!("c{idx}")).collect()
    }

    fn row(tag: &str, key: EnumCellValue) -> Vec<EnumCellValue> {
        vec![s(tag), EnumCellValue::None, n(1.0), s("const"), key]
    }

    fn tags(table: &SpecSheetTable) -> Vec<String> {
        table
            .column_values(0)
            .unwrap()
            .into_iter()
            .map(|value| match value {
                EnumCellValue::String(s) => s,
                other => panic!("unexpected tag {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_sorts_example_ascending() {
        let table = SpecSheetTable::from_rows(
            &headers(5),
            &[row("x", n(30.0)), row("y", n(10.0)), row("z", n(20.0))],
        )
        .unwrap();

        let (table_sorted, report) = sort_by_column_e(&table).unwrap();
        assert_eq!(tags(&table_sorted), vec!["y", "z", "x"]);
        assert_eq!(report.sort_column_name, "c4");
        assert_eq!(report.rule_compare, EnumKeyCompareMode::Native);
        assert!(report.warnings.is_empty());

        // input untouched
        assert_eq!(tags(&table), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let table = SpecSheetTable::from_rows(
            &headers(5),
            &[
                row("a", n(2.0)),
                row("b", n(1.0)),
                row("c", n(2.0)),
                row("d", n(1.0)),
                row("e", n(2.0)),
                row("f", n(1.0)),
            ],
        )
        .unwrap();

        let (table_sorted, _) = sort_by_column_e(&table).unwrap();
        assert_eq!(tags(&table_sorted), vec!["b", "d", "f", "a", "c", "e"]);
    }

    #[test]
    fn test_nulls_sort_first() {
        let table = SpecSheetTable::from_rows(
            &headers(5),
            &[
                row("a", s("m")),
                row("b", EnumCellValue::None),
                row("c", s("b")),
                row("d", EnumCellValue::None),
            ],
        )
        .unwrap();

        let (table_sorted, _) = sort_by_column_e(&table).unwrap();
        assert_eq!(tags(&table_sorted), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_mixed_key_falls_back_to_text() {
        let table = SpecSheetTable::from_rows(
            &headers(5),
            &[row("a", n(9.0)), row("b", s("apple")), row("c", n(10.0))],
        )
        .unwrap();

        let (table_sorted, report) = sort_by_column_e(&table).unwrap();
        assert_eq!(tags(&table_sorted), vec!["c", "a", "b"]);
        assert_eq!(report.rule_compare, EnumKeyCompareMode::Text);
        assert_eq!(report.warnings.len(), 1);

        // text order only; the cells keep their loaded values
        assert_eq!(
            table_sorted.column_values(4).unwrap(),
            vec![n(10.0), n(9.0), s("apple")]
        );
    }

    #[test]
    fn test_mixed_non_key_column_is_preserved() {
        let l_rows = vec![
            vec![s("a"), n(123.0), s("-"), s("-"), n(2.0)],
            vec![s("b"), s("abc"), s("-"), s("-"), n(1.0)],
        ];
        let table = SpecSheetTable::from_rows(&headers(5), &l_rows).unwrap();

        let (table_sorted, report) = sort_by_column_e(&table).unwrap();
        assert_eq!(report.rule_compare, EnumKeyCompareMode::Native);
        assert_eq!(table_sorted.column_values(1).unwrap(), vec![s("abc"), n(123.0)]);
    }

    #[test]
    fn test_dates_sort_chronologically() {
        let dt = |y: i32, m: u32, d: u32, h: u32| {
            EnumCellValue::DateTime(
                chrono::NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(h, 0, 0)
                    .unwrap(),
            )
        };
        let table = SpecSheetTable::from_rows(
            &headers(5),
            &[
                row("a", dt(2024, 3, 1, 0)),
                row("b", dt(1999, 12, 31, 23)),
                row("c", dt(2024, 1, 15, 9)),
                row("d", EnumCellValue::None),
                row("e", dt(2024, 1, 15, 8)),
            ],
        )
        .unwrap();

        let (table_sorted, report) = sort_by_column_e(&table).unwrap();
        assert_eq!(tags(&table_sorted), vec!["d", "b", "e", "c", "a"]);
        assert_eq!(report.rule_compare, EnumKeyCompareMode::Native);
        assert_eq!(table_sorted.value(1, 4).unwrap(), dt(1999, 12, 31, 23));
    }

    #[test]
    fn test_ascending_and_permutation_properties() {
        let l_keys = [5.0, -1.0, 3.5, 3.5, 0.0, 12.0, -1.0, 7.25];
        let l_rows: Vec<Vec<EnumCellValue>> = l_keys
            .iter()
            .enumerate()
            .map(|(idx, key)| row(&format!("r{idx}"), n(*key)))
            .collect();
        let table = SpecSheetTable::from_rows(&headers(5), &l_rows).unwrap();

        let (table_sorted, _) = sort_by_column_e(&table).unwrap();
        let l_rows_sorted = table_sorted.rows().unwrap();

        let l_keys_sorted: Vec<f64> = l_rows_sorted
            .iter()
            .map(|r| match r[4] {
                EnumCellValue::Number(v) => v,
                _ => panic!("numeric key expected"),
            })
            .collect();
        assert!(l_keys_sorted.windows(2).all(|w| w[0] <= w[1]));

        let mut l_in: Vec<String> = table
            .rows()
            .unwrap()
            .iter()
            .map(|r| format!("{r:?}"))
            .collect();
        let mut l_out: Vec<String> = l_rows_sorted.iter().map(|r| format!("{r:?}")).collect();
        l_in.sort();
        l_out.sort();
        assert_eq!(l_in, l_out);
    }

    #[test]
    fn test_rejects_tables_with_four_columns() {
        let table = SpecSheetTable::from_rows(
            &headers(4),
            &[vec![s("a"), s("b"), s("c"), s("d")]],
        )
        .unwrap();

        let err = sort_by_column_e(&table).unwrap_err();
        assert!(matches!(err, SortSheetError::Schema { n_cols: 4 }));
    }

    #[test]
    fn test_column_identity_is_positional() {
        let l_headers = vec![
            "Score".to_string(),
            "b".to_string(),
            "c".to_string(),
            "d".to_string(),
            "Name".to_string(),
        ];
        let table = SpecSheetTable::from_rows(
            &l_headers,
            &[
                vec![n(1.0), s("-"), s("-"), s("-"), s("zeta")],
                vec![n(2.0), s("-"), s("-"), s("-"), s("alpha")],
            ],
        )
        .unwrap();

        let (table_sorted, report) = sort_by_column_e(&table).unwrap();
        assert_eq!(report.sort_column_name, "Name");
        assert_eq!(table_sorted.value(0, 0).unwrap(), n(2.0));
        assert_eq!(table_sorted.column_names(), l_headers);
    }
}
