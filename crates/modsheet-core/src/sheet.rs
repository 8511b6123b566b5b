//! CSV reader and writer for sheet files

use crate::error::{Error, Result};
use crate::schema::View;
use crate::table::{CellValue, Sheet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// File name of a view's sheet, e.g. `modules-general.csv`
pub fn sheet_file_name(view: View) -> String {
    format!("modules-{}.csv", view.name())
}

/// Read a sheet file into a Sheet
pub fn read_sheet<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_from(csv_reader(BufReader::new(file)), path.to_path_buf())
}

/// Read a sheet from a string (useful for testing)
pub fn read_sheet_str(content: &str, source_name: &str) -> Result<Sheet> {
    read_from(csv_reader(content.as_bytes()), PathBuf::from(source_name))
}

fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    // The header row is data to us: its cells are matched against the
    // schema by name, so read it as an ordinary record.
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

fn read_from<R: std::io::Read>(mut reader: csv::Reader<R>, path: PathBuf) -> Result<Sheet> {
    let mut records = reader.records();

    let header: Vec<String> = match records.next() {
        Some(result) => {
            let record = result.map_err(|e| Error::Csv {
                path: path.clone(),
                source: e,
            })?;
            record.iter().map(|s| s.to_string()).collect()
        }
        None => {
            return Err(Error::SheetParse {
                path,
                message: "no header row found".to_string(),
            })
        }
    };

    if header.is_empty() {
        return Err(Error::SheetParse {
            path,
            message: "header row has no columns".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let mut cells: Vec<CellValue> = record.iter().map(CellValue::parse).collect();

        // Pad short rows; a table editor may drop trailing empty cells.
        while cells.len() < header.len() {
            cells.push(CellValue::Blank);
        }
        cells.truncate(header.len());

        rows.push(cells);
    }

    Ok(Sheet { header, rows })
}

/// Write a sheet to a CSV file
pub fn write_sheet<P: AsRef<Path>>(sheet: &Sheet, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_to(sheet, &mut writer, path)?;
    writer.flush()?;
    Ok(())
}

/// Render a sheet as a CSV string
pub fn write_sheet_string(sheet: &Sheet) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write_to(sheet, &mut writer, Path::new("<memory>"))?;
    let bytes = writer.into_inner().map_err(|e| Error::SheetParse {
        path: PathBuf::from("<memory>"),
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| Error::SheetParse {
        path: PathBuf::from("<memory>"),
        message: e.to_string(),
    })
}

fn write_to<W: std::io::Write>(
    sheet: &Sheet,
    writer: &mut csv::Writer<W>,
    path: &Path,
) -> Result<()> {
    writer.write_record(&sheet.header).map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })?;

    for row in &sheet.rows {
        let rendered: Vec<String> = row.iter().map(|c| c.to_string_value()).collect();
        writer.write_record(&rendered).map_err(|e| Error::Csv {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    Ok(())
}
