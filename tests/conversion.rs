use std::fs;
use std::path::Path;

use results_export::ToolError;
use results_export::catalog::{ConversionSpec, default_catalog};
use results_export::convert::{convert_catalog, convert_sheet};
use rust_xlsxwriter::{Format, Workbook};
use tempfile::tempdir;

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

use Cell::{Blank, Number, Text};

fn write_fixture(path: &Path, sheets: &[(&str, Vec<Vec<Cell<'_>>>)]) {
    let mut workbook = Workbook::new();
    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).expect("sheet named");
        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (row_idx, col_idx) = (row_idx as u32, col_idx as u16);
                match cell {
                    Text(value) => {
                        worksheet
                            .write_string(row_idx, col_idx, *value)
                            .expect("string written");
                    }
                    Number(value) => {
                        worksheet
                            .write_number(row_idx, col_idx, *value)
                            .expect("number written");
                    }
                    Blank => {}
                }
            }
        }
    }
    workbook.save(path).expect("workbook saved");
}

fn header_row(spec: &ConversionSpec) -> Vec<Cell<'_>> {
    spec.column_map
        .iter()
        .map(|(source, _)| Text(source.as_str()))
        .collect()
}

fn idp_map() -> Vec<(String, String)> {
    vec![
        ("CMR IDP".to_string(), "cmr_trait".to_string()),
        ("BMR IDP".to_string(), "bmr_trait".to_string()),
    ]
}

#[test]
fn duplicate_rows_collapse_after_trimming() {
    let dir = tempdir().expect("temporary directory");
    let xlsx = dir.path().join("results.xlsx");
    write_fixture(
        &xlsx,
        &[(
            "mri_associations",
            vec![
                vec![Text("Site"), Text("CMR IDP "), Text("BMR IDP"), Text("Notes")],
                vec![Text("A"), Text(" LV mass "), Text("WMH volume"), Text("first")],
                vec![Text("B"), Text("LV mass"), Text("  WMH volume"), Text("second")],
            ],
        )],
    );

    let output_dir = dir.path().join("public/data");
    let outcome = convert_sheet(
        &xlsx,
        "mri_associations",
        &output_dir,
        &idp_map(),
        "mri_association.csv",
    )
    .expect("sheet converted");

    assert_eq!(outcome.path, output_dir.join("mri_association.csv"));
    assert_eq!(outcome.duplicates_removed, 1);
    assert_eq!(outcome.rows_written, 1);
    let written = fs::read_to_string(&outcome.path).expect("CSV read");
    assert_eq!(written, "cmr_trait,bmr_trait\nLV mass,WMH volume\n");
}

#[test]
fn missing_columns_are_named_and_nothing_is_written() {
    let dir = tempdir().expect("temporary directory");
    let xlsx = dir.path().join("results.xlsx");
    write_fixture(
        &xlsx,
        &[(
            "mri_associations",
            vec![
                vec![Text("CMR IDP"), Text("P value")],
                vec![Text("LV mass"), Number(0.01)],
            ],
        )],
    );

    let output_dir = dir.path().join("out");
    let error = convert_sheet(
        &xlsx,
        "mri_associations",
        &output_dir,
        &[
            ("CMR IDP category".to_string(), "cmr_category".to_string()),
            ("CMR IDP".to_string(), "cmr_trait".to_string()),
            ("BMR IDP".to_string(), "bmr_trait".to_string()),
        ],
        "mri_association.csv",
    )
    .unwrap_err();

    assert_eq!(
        error.to_string(),
        "Sheet 'mri_associations' missing columns: CMR IDP category, BMR IDP"
    );
    assert!(!output_dir.join("mri_association.csv").exists());
}

#[test]
fn missing_sheet_is_reported() {
    let dir = tempdir().expect("temporary directory");
    let xlsx = dir.path().join("results.xlsx");
    write_fixture(&xlsx, &[("other", vec![vec![Text("CMR IDP")]])]);

    let error = convert_sheet(&xlsx, "mri_associations", dir.path(), &idp_map(), "x.csv")
        .unwrap_err();
    assert!(matches!(error, ToolError::MissingSheet(name) if name == "mri_associations"));
}

#[test]
fn default_catalog_writes_every_sheet_in_order() {
    let dir = tempdir().expect("temporary directory");
    let xlsx = dir.path().join("results.xlsx");
    let catalog = default_catalog();

    let sheets: Vec<(&str, Vec<Vec<Cell>>)> = catalog
        .iter()
        .map(|spec| {
            let data_row = (0..spec.column_map.len())
                .map(|idx| if idx == 0 { Text(" value ") } else { Number(idx as f64 * 0.5) })
                .collect();
            (spec.sheet_name.as_str(), vec![header_row(spec), data_row])
        })
        .collect();
    write_fixture(&xlsx, &sheets);

    let output_dir = dir.path().join("public/data");
    let outcomes = convert_catalog(&xlsx, &output_dir, &catalog).expect("catalog converted");

    assert_eq!(outcomes.len(), catalog.len());
    for (spec, outcome) in catalog.iter().zip(&outcomes) {
        assert_eq!(outcome.path, output_dir.join(&spec.output_filename));
        let written = fs::read_to_string(&outcome.path).expect("CSV read");
        let mut lines = written.lines();
        let header: Vec<&str> = lines.next().expect("header line").split(',').collect();
        let targets: Vec<&str> = spec.target_columns().collect();
        assert_eq!(header, targets);
        let first_field = lines.next().expect("data line").split(',').next();
        assert_eq!(first_field, Some("value"));
    }

    let causality = fs::read_to_string(output_dir.join("protein_disease_causality.csv"))
        .expect("causality CSV read");
    assert_eq!(
        causality.lines().nth(1),
        Some("value,0.5,1,1.5,2,2.5,3,3.5,4,4.5,5")
    );
}

#[test]
fn repeated_runs_produce_identical_bytes() {
    let dir = tempdir().expect("temporary directory");
    let xlsx = dir.path().join("results.xlsx");
    write_fixture(
        &xlsx,
        &[(
            "protein_mri_associations",
            vec![
                vec![Text("Proteins"), Text("P value"), Text("Model")],
                vec![Text("APOE"), Number(3.2e-45), Text("Model 1")],
                vec![Blank, Blank, Blank],
                vec![Text("IL6, soluble"), Number(0.0421), Blank],
                vec![Text("APOE "), Number(3.2e-45), Text("Model 1")],
            ],
        )],
    );
    let catalog = vec![ConversionSpec::new(
        "protein_mri_associations",
        "protein_mri_association.csv",
        &[("Model", "model"), ("Proteins", "protein"), ("P value", "pvalue")],
    )];

    let output_dir = dir.path().join("out");
    let first = convert_catalog(&xlsx, &output_dir, &catalog).expect("first run");
    let first_bytes = fs::read(&first[0].path).expect("first output read");
    let second = convert_catalog(&xlsx, &output_dir, &catalog).expect("second run");
    let second_bytes = fs::read(&second[0].path).expect("second output read");

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first[0].duplicates_removed, 1);
    assert_eq!(
        String::from_utf8(first_bytes).expect("UTF-8 output"),
        "model,protein,pvalue\nModel 1,APOE,3.2e-45\n,\"IL6, soluble\",0.0421\n"
    );
}

#[test]
fn first_failing_sheet_aborts_the_run() {
    let dir = tempdir().expect("temporary directory");
    let xlsx = dir.path().join("results.xlsx");
    write_fixture(
        &xlsx,
        &[
            ("good", vec![vec![Text("A")], vec![Text("1")]]),
            ("bad", vec![vec![Text("B")], vec![Text("2")]]),
        ],
    );
    let catalog = vec![
        ConversionSpec::new("good", "good.csv", &[("A", "a")]),
        ConversionSpec::new("bad", "bad.csv", &[("A", "a")]),
    ];

    let output_dir = dir.path().join("out");
    let error = convert_catalog(&xlsx, &output_dir, &catalog).unwrap_err();

    assert!(matches!(error, ToolError::MissingColumns { ref sheet, .. } if sheet == "bad"));
    assert!(output_dir.join("good.csv").exists());
    assert!(!output_dir.join("bad.csv").exists());
}

#[test]
fn date_cells_outside_the_calendar_stay_numeric() {
    let dir = tempdir().expect("temporary directory");
    let xlsx = dir.path().join("results.xlsx");
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("dates").expect("sheet named");
    worksheet.write_string(0, 0, "Visit").expect("header written");
    worksheet
        .write_number_with_format(1, 0, 45292.0, &date_format)
        .expect("date written");
    worksheet
        .write_number_with_format(2, 0, -1e300, &date_format)
        .expect("date written");
    workbook.save(&xlsx).expect("workbook saved");

    let outcome = convert_sheet(
        &xlsx,
        "dates",
        dir.path(),
        &[("Visit".to_string(), "visit".to_string())],
        "dates.csv",
    )
    .expect("sheet converted");

    let written = fs::read_to_string(&outcome.path).expect("CSV read");
    assert_eq!(written, "visit\n2024-01-01 00:00:00\n-1e300\n");
}
