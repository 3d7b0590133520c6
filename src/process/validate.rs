//! Pre-normalization checks. Both checks are pure and fail-fast: the first
//! failure aborts the whole operation for that cell, and nothing is ever
//! partially validated.

use crate::config::Columns;
use crate::error::ValidationError;
use crate::meta::MetadataRecord;
use crate::process::table::RawTable;

/// The configured capacity column must exist and every cell in it must
/// coerce to a number.
pub fn check_capacity_column(
    table: &RawTable,
    capacity_col: &str,
) -> Result<(), ValidationError> {
    let index = table
        .column_index(capacity_col)
        .ok_or_else(|| ValidationError::MissingColumn {
            column: capacity_col.to_string(),
            available: table.headers().to_vec(),
        })?;

    for (row, cell) in table.column(index).enumerate() {
        if cell.as_f64().is_none() {
            return Err(ValidationError::NonNumericData {
                column: capacity_col.to_string(),
                row,
                value: cell.to_string(),
            });
        }
    }

    Ok(())
}

/// The configured mass field must exist, parse as a number after trimming,
/// and be strictly positive. Returns the mass in mg on success.
pub fn check_mass_field(
    metadata: &MetadataRecord,
    mass_field: &str,
) -> Result<f64, ValidationError> {
    let raw = metadata
        .get(mass_field)
        .ok_or_else(|| ValidationError::MissingField {
            field: mass_field.to_string(),
        })?;

    let mass_mg: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::NonNumericMass {
            field: mass_field.to_string(),
            value: raw.to_string(),
        })?;

    // NaN must not slip through the sign check.
    if !(mass_mg > 0.0) {
        return Err(ValidationError::NonPositiveMass {
            field: mass_field.to_string(),
            value: mass_mg,
        });
    }

    Ok(mass_mg)
}

/// Run the raw-table check, then the metadata check. Returns the validated
/// mass in mg for the normalizer.
pub fn validate(
    table: &RawTable,
    metadata: &MetadataRecord,
    columns: &Columns,
) -> Result<f64, ValidationError> {
    check_capacity_column(table, &columns.capacity)?;
    check_mass_field(metadata, &columns.mass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::table::{parse_tab_table, CellValue};

    fn metadata(pairs: &[(&str, &str)]) -> MetadataRecord {
        MetadataRecord::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn missing_capacity_column_names_it_and_lists_available() {
        let table = parse_tab_table("Time/s\tVoltage/V\n1\t3.2\n").unwrap();
        let err = check_capacity_column(&table, "Capacity/mA.h").unwrap_err();
        match err {
            ValidationError::MissingColumn { column, available } => {
                assert_eq!(column, "Capacity/mA.h");
                assert_eq!(available, ["Time/s", "Voltage/V"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_capacity_cell_is_located() {
        let table = parse_tab_table("Capacity/mA.h\n0.5\nbad\n").unwrap();
        let err = check_capacity_column(&table, "Capacity/mA.h").unwrap_err();
        match err {
            ValidationError::NonNumericData { row, value, .. } => {
                assert_eq!(row, 1);
                assert_eq!(value, "bad");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn numeric_text_cells_pass_coercion() {
        let mut rows = Vec::new();
        rows.push(vec![CellValue::Text(" 0.5 ".to_string())]);
        let table = RawTable::new(vec!["Capacity/mA.h".to_string()], rows);
        assert!(check_capacity_column(&table, "Capacity/mA.h").is_ok());
    }

    #[test]
    fn missing_mass_field() {
        let meta = metadata(&[("Cell ID", "MEN0001")]);
        let err = check_mass_field(&meta, "WE Active Material Mass (mg)").unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { field }
            if field == "WE Active Material Mass (mg)"));
    }

    #[test]
    fn non_numeric_mass() {
        let meta = metadata(&[("WE Active Material Mass (mg)", "a lot")]);
        let err = check_mass_field(&meta, "WE Active Material Mass (mg)").unwrap_err();
        assert!(matches!(err, ValidationError::NonNumericMass { value, .. }
            if value == "a lot"));
    }

    #[test]
    fn zero_and_negative_mass_are_rejected() {
        for bad in ["0", "-5", "0.0"] {
            let meta = metadata(&[("WE Active Material Mass (mg)", bad)]);
            let err = check_mass_field(&meta, "WE Active Material Mass (mg)").unwrap_err();
            assert!(matches!(err, ValidationError::NonPositiveMass { .. }), "{bad}");
        }
    }

    #[test]
    fn mass_is_trimmed_before_parsing() {
        let meta = metadata(&[("WE Active Material Mass (mg)", " 250 ")]);
        assert_eq!(
            check_mass_field(&meta, "WE Active Material Mass (mg)").unwrap(),
            250.0
        );
    }

    #[test]
    fn validate_runs_table_check_first() {
        let table = parse_tab_table("Voltage/V\n3.2\n").unwrap();
        let meta = metadata(&[("WE Active Material Mass (mg)", "not a number")]);
        let err = validate(&table, &meta, &Columns::default()).unwrap_err();
        assert!(matches!(err, ValidationError::MissingColumn { .. }));
    }

    #[test]
    fn validate_returns_mass_on_success() {
        let table = parse_tab_table("Capacity/mA.h\n5\n").unwrap();
        let meta = metadata(&[("WE Active Material Mass (mg)", "250")]);
        assert_eq!(validate(&table, &meta, &Columns::default()).unwrap(), 250.0);
    }
}
