use std::io::Write;

use crate::contest::{ContestData, LABEL_COLUMN};
use crate::types::TransferError;

/// Writes one CSV row per problem: label, the display columns, the two
/// links and whether code has been copied.
pub fn write_csv<W: Write>(data: &ContestData, out: W) -> Result<(), TransferError> {
    let mut columns: Vec<&str> = Vec::new();
    for (_, record) in data.iter() {
        for name in record.columns.keys() {
            if name != LABEL_COLUMN && !columns.contains(&name.as_str()) {
                columns.push(name);
            }
        }
    }

    let mut writer = csv::Writer::from_writer(out);
    let csv_err = |e: csv::Error| TransferError::Store(e.to_string());

    let mut header = vec![LABEL_COLUMN];
    header.extend(&columns);
    header.extend(["Link", "sol_link", "code"]);
    writer.write_record(&header).map_err(csv_err)?;

    for (label, record) in data.iter() {
        let mut row = vec![label];
        row.extend(columns.iter().map(|c| record.column(c).unwrap_or_default()));
        row.push(&record.link);
        row.push(&record.solution_link);
        row.push(if record.has_code() { "yes" } else { "no" });
        writer.write_record(&row).map_err(csv_err)?;
    }

    writer.flush()?;
    Ok(())
}
