use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ToolError};

/// Describes how one sheet becomes one CSV file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConversionSpec {
    /// Name of the worksheet to read.
    #[serde(rename = "sheet")]
    pub sheet_name: String,
    /// File name written inside the output directory.
    #[serde(rename = "output")]
    pub output_filename: String,
    /// Ordered source header → output column pairs.
    #[serde(rename = "columns")]
    pub column_map: Vec<(String, String)>,
}

impl ConversionSpec {
    pub fn new(
        sheet_name: impl Into<String>,
        output_filename: impl Into<String>,
        column_map: &[(&str, &str)],
    ) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            output_filename: output_filename.into(),
            column_map: column_map
                .iter()
                .map(|(source, target)| (source.to_string(), target.to_string()))
                .collect(),
        }
    }

    /// Output column names in map order.
    pub fn target_columns(&self) -> impl Iterator<Item = &str> {
        self.column_map.iter().map(|(_, target)| target.as_str())
    }
}

type BuiltinEntry = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

const BUILTIN: &[BuiltinEntry] = &[
    (
        "mri_associations",
        "mri_association.csv",
        &[
            ("CMR IDP category", "cmr_category"),
            ("CMR IDP", "cmr_trait"),
            ("BMR IDP category", "bmr_category"),
            ("BMR IDP", "bmr_trait"),
            ("Participants number", "n"),
            ("Correlation coefficient", "beta"),
            ("P value", "pvalue"),
        ],
    ),
    (
        "protein_mri_associations",
        "protein_mri_association.csv",
        &[
            ("Model", "model"),
            ("MRI IDP category", "mri_category"),
            ("MRI IDP", "mri_trait"),
            ("Proteins", "protein"),
            ("Participants number", "n"),
            ("Correlation coefficient", "beta"),
            ("P value", "pvalue"),
        ],
    ),
    (
        "protein_prevalence",
        "protein_prevalence.csv",
        &[
            ("Analysis model", "model"),
            ("Disease category", "disease_category"),
            ("Diseases", "disease"),
            ("Incident Rate (%)", "incident_rate"),
            ("Proteins", "protein"),
            ("Coefficient", "beta"),
            ("Odds Ratio", "odds_ratio"),
            ("95% CI Lower", "ci_lower"),
            ("95% CI Upper", "ci_upper"),
            ("P Value", "pvalue"),
        ],
    ),
    (
        "protein_incidence",
        "protein_incidence.csv",
        &[
            ("Analysis model", "model"),
            ("Disease category", "disease_category"),
            ("Diseases", "disease"),
            ("Incident Rate (%)", "incident_rate"),
            ("Proteins", "protein"),
            ("Hazard Ratio", "hazard_ratio"),
            ("95% CI Lower", "ci_lower"),
            ("95% CI Upper", "ci_upper"),
            ("P Value", "pvalue"),
        ],
    ),
    (
        "protein_diseases_causality",
        "protein_disease_causality.csv",
        &[
            ("Disease group", "disease_group"),
            ("Category", "disease_category"),
            ("Disease GWAS name", "disease"),
            ("GWAS ID", "gwas_id"),
            ("Proteins", "protein"),
            ("MR method", "mr_method"),
            ("Number of SNP", "snps"),
            ("Odds Ratio", "odds_ratio"),
            ("95% CI Lower", "ci_lower"),
            ("95% CI Upper", "ci_upper"),
            ("P value", "pvalue"),
        ],
    ),
];

/// The sheets of `results.xlsx` consumed by the web application, in
/// conversion order.
pub fn default_catalog() -> Vec<ConversionSpec> {
    BUILTIN
        .iter()
        .map(|(sheet, output, columns)| ConversionSpec::new(*sheet, *output, columns))
        .collect()
}

/// Reads a catalog from a JSON array of `{"sheet", "output", "columns"}`
/// objects, where `columns` is a list of `[source, target]` pairs.
pub fn load_catalog(path: &Path) -> Result<Vec<ConversionSpec>> {
    let data = fs::read_to_string(path)?;
    let catalog: Vec<ConversionSpec> = serde_json::from_str(&data)?;
    validate(&catalog)?;
    Ok(catalog)
}

/// Checks that every entry maps at least one column, that target names are
/// unique per entry and that no two entries write the same file.
pub fn validate(catalog: &[ConversionSpec]) -> Result<()> {
    if catalog.is_empty() {
        return Err(ToolError::InvalidCatalog("catalog has no entries".into()));
    }

    let mut outputs = HashSet::new();
    for spec in catalog {
        if spec.column_map.is_empty() {
            return Err(ToolError::InvalidCatalog(format!(
                "sheet '{}' maps no columns",
                spec.sheet_name
            )));
        }
        let mut targets = HashSet::new();
        if let Some(duplicate) = spec.target_columns().find(|target| !targets.insert(*target)) {
            return Err(ToolError::InvalidCatalog(format!(
                "sheet '{}' maps more than one column to '{duplicate}'",
                spec.sheet_name
            )));
        }
        if !outputs.insert(spec.output_filename.as_str()) {
            return Err(ToolError::InvalidCatalog(format!(
                "output '{}' is written by more than one sheet",
                spec.output_filename
            )));
        }
    }

    Ok(())
}

/// Restricts the catalog to the named sheets, keeping catalog order.
pub fn filter_sheets(catalog: Vec<ConversionSpec>, sheets: &[String]) -> Result<Vec<ConversionSpec>> {
    if sheets.is_empty() {
        return Ok(catalog);
    }
    if let Some(unknown) = sheets
        .iter()
        .find(|name| !catalog.iter().any(|spec| &spec.sheet_name == *name))
    {
        return Err(ToolError::UnknownSheet(unknown.clone()));
    }
    Ok(catalog
        .into_iter()
        .filter(|spec| sheets.contains(&spec.sheet_name))
        .collect())
}
