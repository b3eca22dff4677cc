use std::collections::HashMap;
use std::io::Read;

use rust_decimal::Decimal;

use crate::constants::{
    FULL_ALLOCATION, GT_RETIRE_AGE_HEADER, LT_RETIRE_AGE_HEADER, MAX_RETIRE_AGE_OFFSET,
    MIN_RETIRE_AGE_OFFSET, PERCENT_TOLERANCE,
};
use crate::errors::{ImportError, Result};
use crate::rulesets::percent::parse_percent;
use crate::rulesets::rulesets_model::GlidepathBand;

/// What a non-bound CSV column carries. Class and category names match
/// case-sensitively; whitespace around the colon separator is tolerated, so
/// "Stocks : Large Cap" and "Stocks:Large Cap" are the same column.
#[derive(Debug)]
enum ColumnKind {
    Class(String),
    Category { class: String, category: String },
}

#[derive(Debug)]
struct HeaderLayout {
    gt_idx: usize,
    lt_idx: usize,
    columns: Vec<(usize, ColumnKind)>,
}

fn parse_header(headers: &csv::StringRecord) -> Result<HeaderLayout> {
    let mut gt_idx = None;
    let mut lt_idx = None;
    let mut columns = Vec::new();

    for (idx, raw) in headers.iter().enumerate() {
        let header = raw.trim();
        if header == GT_RETIRE_AGE_HEADER {
            gt_idx = Some(idx);
        } else if header == LT_RETIRE_AGE_HEADER {
            lt_idx = Some(idx);
        } else if let Some((class, category)) = header.split_once(':') {
            let class = class.trim();
            let category = category.trim();
            if class.is_empty() || category.is_empty() {
                return Err(ImportError::MalformedInput(format!(
                    "Invalid column header '{}'",
                    header
                ))
                .into());
            }
            columns.push((
                idx,
                ColumnKind::Category {
                    class: class.to_string(),
                    category: category.to_string(),
                },
            ));
        } else if !header.is_empty() {
            columns.push((idx, ColumnKind::Class(header.to_string())));
        }
    }

    match (gt_idx, lt_idx) {
        (Some(gt_idx), Some(lt_idx)) => Ok(HeaderLayout {
            gt_idx,
            lt_idx,
            columns,
        }),
        _ => Err(ImportError::MalformedInput(format!(
            "Missing required columns: {} and {}",
            GT_RETIRE_AGE_HEADER, LT_RETIRE_AGE_HEADER
        ))
        .into()),
    }
}

fn parse_bound(cell: &str, row: usize, header: &str) -> Result<i32> {
    let value: i32 = cell.trim().parse().map_err(|_| {
        ImportError::MalformedInput(format!(
            "Row {}: '{}' is not a valid integer for column '{}'",
            row, cell, header
        ))
    })?;
    Ok(value.clamp(MIN_RETIRE_AGE_OFFSET, MAX_RETIRE_AGE_OFFSET))
}

/// Parse tabular input into validated age bands.
///
/// Errors surface in input row order, then column order within a row.
/// Nothing is persisted here; the caller writes the result in one
/// transaction or not at all.
pub fn parse_and_validate<R: Read>(input: R) -> Result<Vec<GlidepathBand>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);

    let layout = parse_header(reader.headers()?)?;

    let mut bands = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        let gt = parse_bound(cell(layout.gt_idx), row, GT_RETIRE_AGE_HEADER)?;
        let lt = parse_bound(cell(layout.lt_idx), row, LT_RETIRE_AGE_HEADER)?;
        if gt >= lt {
            return Err(ImportError::Coverage(format!(
                "Row {}: {} {} must be less than {} {}",
                row, GT_RETIRE_AGE_HEADER, gt, LT_RETIRE_AGE_HEADER, lt
            ))
            .into());
        }

        let mut class_allocations = Vec::new();
        let mut category_allocations = Vec::new();
        for (idx, kind) in &layout.columns {
            let raw = cell(*idx);
            let pct = parse_percent(raw).ok_or_else(|| {
                let name = match kind {
                    ColumnKind::Class(class) => class.clone(),
                    ColumnKind::Category { class, category } => {
                        format!("{}:{}", class, category)
                    }
                };
                ImportError::MalformedInput(format!(
                    "Row {}, column '{}': '{}' is not a valid percentage",
                    row, name, raw
                ))
            })?;
            if pct.is_zero() {
                continue;
            }
            match kind {
                ColumnKind::Class(class) => class_allocations.push((class.clone(), pct)),
                ColumnKind::Category { class, category } => {
                    category_allocations.push((class.clone(), category.clone(), pct))
                }
            }
        }

        bands.push(GlidepathBand {
            gt_retire_age: gt,
            lt_retire_age: lt,
            class_allocations,
            category_allocations,
        });
    }

    if bands.is_empty() {
        return Err(ImportError::MalformedInput("No data rows found".to_string()).into());
    }

    validate_coverage(&bands)?;
    validate_allocations(&bands)?;
    Ok(bands)
}

/// Sorted by lower bound, the bands must partition [-100, 100] exactly.
fn validate_coverage(bands: &[GlidepathBand]) -> Result<()> {
    let mut sorted: Vec<&GlidepathBand> = bands.iter().collect();
    sorted.sort_by_key(|b| b.gt_retire_age);

    let first = sorted[0];
    if first.gt_retire_age != MIN_RETIRE_AGE_OFFSET {
        return Err(ImportError::Coverage(format!(
            "Bands start at {} instead of {}",
            first.gt_retire_age, MIN_RETIRE_AGE_OFFSET
        ))
        .into());
    }
    let last = sorted[sorted.len() - 1];
    if last.lt_retire_age != MAX_RETIRE_AGE_OFFSET {
        return Err(ImportError::Coverage(format!(
            "Bands end at {} instead of {}",
            last.lt_retire_age, MAX_RETIRE_AGE_OFFSET
        ))
        .into());
    }
    for pair in sorted.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if next.gt_retire_age > prev.lt_retire_age {
            return Err(ImportError::Coverage(format!(
                "Gap between {} and {}",
                prev.lt_retire_age, next.gt_retire_age
            ))
            .into());
        }
        if next.gt_retire_age < prev.lt_retire_age {
            return Err(ImportError::Coverage(format!(
                "Band starting at {} overlaps band ending at {}",
                next.gt_retire_age, prev.lt_retire_age
            ))
            .into());
        }
    }
    Ok(())
}

fn validate_allocations(bands: &[GlidepathBand]) -> Result<()> {
    for (i, band) in bands.iter().enumerate() {
        let row = i + 1;

        // Category percentages must reconcile with the class percentage for
        // every class that has category data in this row. Classes are checked
        // in first-appearance column order.
        let mut class_order: Vec<&str> = Vec::new();
        let mut category_totals: HashMap<&str, Decimal> = HashMap::new();
        for (class, _, pct) in &band.category_allocations {
            if !category_totals.contains_key(class.as_str()) {
                class_order.push(class);
            }
            *category_totals.entry(class).or_insert(Decimal::ZERO) += *pct;
        }
        for class in class_order {
            let category_total = category_totals[class];
            let class_total = band
                .class_allocations
                .iter()
                .find(|(name, _)| name == class)
                .map(|(_, pct)| *pct)
                .unwrap_or(Decimal::ZERO);
            if (category_total - class_total).abs() > PERCENT_TOLERANCE {
                return Err(ImportError::AllocationMismatch {
                    row,
                    class_name: class.to_string(),
                    category_total,
                    class_total,
                }
                .into());
            }
        }

        let total: Decimal = band.class_allocations.iter().map(|(_, pct)| *pct).sum();
        if (total - FULL_ALLOCATION).abs() > PERCENT_TOLERANCE {
            return Err(ImportError::TotalAllocation { row, total }.into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;

    fn import(csv: &str) -> Result<Vec<GlidepathBand>> {
        parse_and_validate(csv.as_bytes())
    }

    fn import_err(csv: &str) -> ImportError {
        match import(csv) {
            Err(Error::Import(e)) => e,
            other => panic!("expected import error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn imports_two_bands_covering_the_axis() {
        let bands = import(
            "gt-retire-age,lt-retire-age,Stocks,Bonds\n\
             -100,0,70,30\n\
             0,100,30,70\n",
        )
        .unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[0].gt_retire_age, -100);
        assert_eq!(bands[0].lt_retire_age, 0);
        assert_eq!(
            bands[0].class_allocations,
            vec![("Stocks".to_string(), dec!(70)), ("Bonds".to_string(), dec!(30))]
        );
    }

    #[test]
    fn bounds_are_clamped_to_the_axis() {
        let bands = import(
            "gt-retire-age,lt-retire-age,Stocks\n\
             -500,0,100\n\
             0,500,100\n",
        )
        .unwrap();
        assert_eq!(bands[0].gt_retire_age, -100);
        assert_eq!(bands[1].lt_retire_age, 100);
    }

    #[test]
    fn missing_bound_column_is_malformed() {
        let err = import("gt-retire-age,Stocks\n-100,100\n");
        assert!(matches!(
            err,
            Err(Error::Import(ImportError::MalformedInput(_)))
        ));
    }

    #[test]
    fn non_integer_bound_is_malformed() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks\n\
             low,100,100\n",
        );
        assert!(matches!(err, ImportError::MalformedInput(_)));
    }

    #[test]
    fn non_numeric_percentage_is_malformed() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks\n\
             -100,100,lots\n",
        );
        assert!(matches!(err, ImportError::MalformedInput(_)));
    }

    #[test]
    fn gap_between_bands_fails_coverage() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks,Bonds\n\
             -100,0,70,30\n\
             10,100,30,70\n",
        );
        assert!(matches!(err, ImportError::Coverage(_)));
    }

    #[test]
    fn overlapping_bands_fail_coverage() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks,Bonds\n\
             -100,10,70,30\n\
             0,100,30,70\n",
        );
        assert!(matches!(err, ImportError::Coverage(_)));
    }

    #[test]
    fn wrong_outer_bounds_fail_coverage() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks\n\
             -90,100,100\n",
        );
        assert!(matches!(err, ImportError::Coverage(_)));

        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks\n\
             -100,90,100\n",
        );
        assert!(matches!(err, ImportError::Coverage(_)));
    }

    #[test]
    fn inverted_band_fails_coverage() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks\n\
             50,-50,100\n",
        );
        assert!(matches!(err, ImportError::Coverage(_)));
    }

    #[test]
    fn category_sum_must_match_class_percentage() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks,Bonds,Stocks:Large Cap\n\
             -100,100,50,50,60\n",
        );
        match err {
            ImportError::AllocationMismatch {
                row,
                class_name,
                category_total,
                class_total,
            } => {
                assert_eq!(row, 1);
                assert_eq!(class_name, "Stocks");
                assert_eq!(category_total, dec!(60));
                assert_eq!(class_total, dec!(50));
            }
            other => panic!("expected AllocationMismatch, got {:?}", other),
        }
    }

    #[test]
    fn matching_categories_within_tolerance_pass() {
        let bands = import(
            "gt-retire-age,lt-retire-age,Stocks,Bonds,Stocks:Large Cap,Stocks:Small Cap\n\
             -100,0,70,30,50,20\n\
             0,100,30,70,15,15\n",
        )
        .unwrap();
        assert_eq!(bands[0].category_allocations.len(), 2);
    }

    #[test]
    fn whitespace_around_colon_is_tolerated() {
        let bands = import(
            "gt-retire-age,lt-retire-age,Stocks,Stocks : Large Cap\n\
             -100,100,100,100\n",
        )
        .unwrap();
        assert_eq!(
            bands[0].category_allocations,
            vec![("Stocks".to_string(), "Large Cap".to_string(), dec!(100))]
        );
    }

    #[test]
    fn class_total_must_be_one_hundred() {
        let err = import_err(
            "gt-retire-age,lt-retire-age,Stocks,Bonds\n\
             -100,0,70,30\n\
             0,100,30,30\n",
        );
        match err {
            ImportError::TotalAllocation { row, total } => {
                assert_eq!(row, 2);
                assert_eq!(total, dec!(60));
            }
            other => panic!("expected TotalAllocation, got {:?}", other),
        }
    }

    #[test]
    fn rounding_tolerance_accepts_thirds() {
        // 33.33 * 3 = 99.99, inside the 0.01 tolerance.
        let bands = import(
            "gt-retire-age,lt-retire-age,Stocks,Bonds,Crypto\n\
             -100,100,33.333,33.333,33.333\n",
        )
        .unwrap();
        assert_eq!(bands[0].class_allocations.len(), 3);
    }

    #[test]
    fn empty_file_is_malformed() {
        let err = import_err("gt-retire-age,lt-retire-age,Stocks\n");
        assert!(matches!(err, ImportError::MalformedInput(_)));
    }
}
