//! CSV layout for bulk product imports.
//!
//! An import file has a header row followed by one product per record.
//! Header names are matched case-insensitively after trimming; `sku` and
//! `name` are required, `description` is optional, unknown columns are
//! ignored.

use std::io::Read;

use crate::sku::{normalize_sku, MAX_SKU_LEN};

/// Header of the required SKU column.
pub const COLUMN_SKU: &str = "sku";
/// Header of the required name column.
pub const COLUMN_NAME: &str = "name";
/// Header of the optional description column.
pub const COLUMN_DESCRIPTION: &str = "description";

/// Longest product name stored, matching the `products.name` check.
pub const MAX_NAME_LEN: usize = 255;

const UTF8_BOM: char = '\u{feff}';

/// The header row cannot be used for an import.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("CSV is missing required column: {0}")]
    MissingColumn(&'static str),
}

/// Positions of the product fields within a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub sku: usize,
    pub name: usize,
    pub description: Option<usize>,
}

impl ColumnMap {
    /// Resolve column positions from the header row.
    pub fn from_headers(headers: &csv::StringRecord) -> Result<Self, LayoutError> {
        let position = |wanted: &str| {
            headers.iter().position(|h| {
                h.trim_start_matches(UTF8_BOM)
                    .trim()
                    .eq_ignore_ascii_case(wanted)
            })
        };

        Ok(Self {
            sku: position(COLUMN_SKU).ok_or(LayoutError::MissingColumn(COLUMN_SKU))?,
            name: position(COLUMN_NAME).ok_or(LayoutError::MissingColumn(COLUMN_NAME))?,
            description: position(COLUMN_DESCRIPTION),
        })
    }
}

/// A cleaned product record ready to be upserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    /// Trimmed and lower-cased.
    pub sku: String,
    pub name: String,
    /// `None` when the cell is absent or blank.
    pub description: Option<String>,
}

/// Why a record was not imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    BlankSku,
    BlankName,
    SkuTooLong,
    NameTooLong,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::BlankSku => "blank_sku",
            SkipReason::BlankName => "blank_name",
            SkipReason::SkuTooLong => "sku_too_long",
            SkipReason::NameTooLong => "name_too_long",
        }
    }
}

/// Clean a single record into a [`ProductRow`].
///
/// Short records are tolerated: a missing cell reads as blank.
pub fn parse_record(map: &ColumnMap, record: &csv::StringRecord) -> Result<ProductRow, SkipReason> {
    let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

    let sku = normalize_sku(cell(map.sku));
    if sku.is_empty() {
        return Err(SkipReason::BlankSku);
    }
    if sku.chars().count() > MAX_SKU_LEN {
        return Err(SkipReason::SkuTooLong);
    }

    let name = cell(map.name);
    if name.is_empty() {
        return Err(SkipReason::BlankName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SkipReason::NameTooLong);
    }

    let description = map
        .description
        .map(cell)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(ProductRow {
        sku,
        name: name.to_string(),
        description,
    })
}

/// Reader configuration shared by the counting and import passes.
pub fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).flexible(true);
    builder
}

/// Count data records (excluding the header row).
///
/// Quoted fields spanning several lines count once.
pub fn count_records<R: Read>(input: R) -> Result<u64, csv::Error> {
    let mut reader = reader_builder().from_reader(input);
    let mut record = csv::ByteRecord::new();
    let mut count = 0u64;
    while reader.read_byte_record(&mut record)? {
        count += 1;
    }
    Ok(count)
}
