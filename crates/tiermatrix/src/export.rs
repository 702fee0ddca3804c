//! CSV output of the price and type tables

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ExtractResult;
use crate::records::Extraction;

/// File name of the price table inside an output directory
pub const PRICE_FILE: &str = "Price.csv";
/// File name of the type table inside an output directory
pub const TYPE_FILE: &str = "Type.csv";

const PRICE_HEADER: &[&str] = &["ID", "Serie", "Type", "Width", "Height", "Price", "Glass_QTY"];
const TYPE_HEADER: &[&str] = &[
    "ID",
    "Serie",
    "Type",
    "Description",
    "width_min",
    "width_max",
    "height_min",
    "height_max",
];

/// Write the price table, one color column per entry of
/// [`Extraction::color_columns`]
pub fn write_price_csv<W: Write>(extraction: &Extraction, writer: W) -> ExtractResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let header: Vec<&str> = PRICE_HEADER
        .iter()
        .copied()
        .chain(extraction.color_columns.iter().map(String::as_str))
        .collect();
    csv_writer.write_record(&header)?;

    for record in &extraction.price_records {
        let mut row = vec![
            record.id.to_string(),
            record.serie.clone(),
            record.sheet_type.clone(),
            record.width.to_string(),
            record.height.to_string(),
            record.price.to_string(),
            record.glass_qty.to_string(),
        ];
        row.extend(record.colors.iter().cloned());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the type table
pub fn write_type_csv<W: Write>(extraction: &Extraction, writer: W) -> ExtractResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(TYPE_HEADER)?;
    for record in &extraction.type_records {
        csv_writer.write_record(&[
            record.id.to_string(),
            record.serie.clone(),
            record.sheet_type.clone(),
            record.description.clone(),
            record.width_min.to_string(),
            record.width_max.to_string(),
            record.height_min.to_string(),
            record.height_max.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write both tables into `dir`, creating it if needed
///
/// Returns the paths of the price and type files.
pub fn write_tables<P: AsRef<Path>>(
    dir: P,
    extraction: &Extraction,
) -> ExtractResult<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let price_path = dir.join(PRICE_FILE);
    let type_path = dir.join(TYPE_FILE);
    write_price_csv(extraction, File::create(&price_path)?)?;
    write_type_csv(extraction, File::create(&type_path)?)?;

    tracing::info!(
        prices = %price_path.display(),
        types = %type_path.display(),
        "wrote tables"
    );
    Ok((price_path, type_path))
}
