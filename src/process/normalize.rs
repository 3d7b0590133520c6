//! Derives the mass-normalized capacity column from a validated table and
//! mass. Deterministic and order-preserving; the only side effect is a
//! diagnostic preview of the last few rows.

use tracing::{debug, instrument};

use crate::error::NormalizeError;
use crate::process::table::{CellValue, RawTable};

/// Name of the derived column.
pub const NORMALIZED_COLUMN: &str = "Normalized Capacity (mAh/g)";

/// Rows shown in the diagnostic preview.
const PREVIEW_ROWS: usize = 3;

/// Append (or recompute) `Normalized Capacity (mAh/g)`:
/// `capacity_mAh / (mass_mg / 1000)` per row.
///
/// `mass_mg` must come from a passing [`crate::process::validate`] run, which
/// guarantees it is strictly positive. Capacity cells are coerced again here;
/// a cell that is missing, non-numeric, negative, or NaN after coercion fails
/// with `InvalidCapacity` rather than propagating a malformed value.
#[instrument(level = "debug", skip(table), fields(rows = table.row_count()))]
pub fn add_normalized_capacity(
    mut table: RawTable,
    mass_mg: f64,
    capacity_col: &str,
) -> Result<RawTable, NormalizeError> {
    let capacity_index =
        table
            .column_index(capacity_col)
            .ok_or_else(|| NormalizeError::InvalidCapacity {
                row: 0,
                value: String::new(),
                reason: format!("column '{capacity_col}' not present"),
            })?;

    let mass_g = mass_mg / 1000.0;

    let mut normalized = Vec::with_capacity(table.row_count());
    for (row, cell) in table.column(capacity_index).enumerate() {
        let capacity = cell
            .as_f64()
            .ok_or_else(|| NormalizeError::InvalidCapacity {
                row,
                value: cell.to_string(),
                reason: "not numeric after coercion".to_string(),
            })?;
        if !(capacity >= 0.0) {
            return Err(NormalizeError::InvalidCapacity {
                row,
                value: cell.to_string(),
                reason: "negative or NaN".to_string(),
            });
        }
        normalized.push(CellValue::Number(capacity / mass_g));
    }

    table.set_column(NORMALIZED_COLUMN, normalized);
    preview_tail(&table, capacity_index, mass_g);

    Ok(table)
}

/// Log the last few capacity/normalized pairs, like the interactive preview
/// analysts use to sanity-check a run.
fn preview_tail(table: &RawTable, capacity_index: usize, mass_g: f64) {
    let Some(normalized_index) = table.column_index(NORMALIZED_COLUMN) else {
        return;
    };
    debug!(mass_g, "using WE active material mass");
    let start = table.row_count().saturating_sub(PREVIEW_ROWS);
    for (offset, row) in table.rows()[start..].iter().enumerate() {
        debug!(
            row = start + offset,
            capacity = %row[capacity_index],
            normalized = %row[normalized_index],
            "normalized capacity preview"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::table::parse_tab_table;

    #[test]
    fn round_trip_arithmetic_is_exact() {
        let table = parse_tab_table("Capacity/mA.h\n5\n").unwrap();
        let table = add_normalized_capacity(table, 250.0, "Capacity/mA.h").unwrap();

        let index = table.column_index(NORMALIZED_COLUMN).unwrap();
        assert_eq!(table.rows()[0][index], CellValue::Number(20.0));
    }

    #[test]
    fn appends_column_and_preserves_order() {
        let table = parse_tab_table("Time/s\tCapacity/mA.h\n1\t1\n2\t2\n3\t4\n").unwrap();
        let table = add_normalized_capacity(table, 500.0, "Capacity/mA.h").unwrap();

        assert_eq!(
            table.headers(),
            ["Time/s", "Capacity/mA.h", NORMALIZED_COLUMN]
        );
        let index = table.column_index(NORMALIZED_COLUMN).unwrap();
        let values: Vec<f64> = table.column(index).map(|c| c.as_f64().unwrap()).collect();
        assert_eq!(values, [2.0, 4.0, 8.0]);
    }

    #[test]
    fn deterministic_and_idempotent() {
        let table = parse_tab_table("Capacity/mA.h\n1\n2\n").unwrap();

        let once = add_normalized_capacity(table.clone(), 250.0, "Capacity/mA.h").unwrap();
        let again = add_normalized_capacity(table, 250.0, "Capacity/mA.h").unwrap();
        assert_eq!(once, again);

        // Re-running on an already augmented table recomputes in place.
        let twice = add_normalized_capacity(once.clone(), 250.0, "Capacity/mA.h").unwrap();
        assert_eq!(twice, once);
        assert_eq!(
            twice
                .headers()
                .iter()
                .filter(|h| *h == NORMALIZED_COLUMN)
                .count(),
            1
        );
    }

    #[test]
    fn negative_capacity_fails() {
        let table = parse_tab_table("Capacity/mA.h\n0.5\n-0.1\n").unwrap();
        let err = add_normalized_capacity(table, 250.0, "Capacity/mA.h").unwrap_err();
        match err {
            NormalizeError::InvalidCapacity { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "-0.1");
            }
        }
    }

    #[test]
    fn non_numeric_capacity_fails_late_check() {
        use crate::process::table::RawTable;

        let table = RawTable::new(
            vec!["Capacity/mA.h".to_string()],
            vec![vec![CellValue::Text("n/a".to_string())]],
        );
        let err = add_normalized_capacity(table, 250.0, "Capacity/mA.h").unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidCapacity { row: 0, .. }));
    }

    #[test]
    fn zero_capacity_is_allowed() {
        let table = parse_tab_table("Capacity/mA.h\n0\n").unwrap();
        let table = add_normalized_capacity(table, 250.0, "Capacity/mA.h").unwrap();
        let index = table.column_index(NORMALIZED_COLUMN).unwrap();
        assert_eq!(table.rows()[0][index], CellValue::Number(0.0));
    }
}
