use log::info;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use crate::contest::ContestData;
use crate::range::LabelRange;
use crate::types::TransferError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOutcome {
    Written,
    AlreadyPresent,
    NoCode,
}

/// Title as it appears in a file name: spaces and hyphens become `_`,
/// parentheses and path separators are dropped, trailing punctuation and
/// underscores are trimmed.
///
/// Punctuation inside the title (`,` `.` `?` `!` ...) is kept as is.
pub fn sanitize_title(title: &str) -> String {
    let mapped: String = title
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | '/' | '\\'))
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();

    mapped
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .to_string()
}

/// `<label>_<title>.<extension>`
pub fn file_name(label: &str, title: &str, extension: &str) -> String {
    format!("{label}_{}.{extension}", sanitize_title(title))
}

/// Writes each stored solution in `range` to its own file under `folder`.
///
/// Code is appended. A file that already contains the code is left as is.
pub fn export(
    data: &ContestData,
    range: &LabelRange,
    folder: &Path,
    extension: &str,
) -> Result<Vec<(String, ExportOutcome)>, TransferError> {
    fs::create_dir_all(folder)?;

    let mut outcomes = Vec::new();
    for label in range.select(data.labels()) {
        let Some(record) = data.get(label) else {
            continue;
        };
        let Some(code) = record.code.as_deref() else {
            info!("No code stored for {label}");
            outcomes.push((label.to_string(), ExportOutcome::NoCode));
            continue;
        };

        let path = folder.join(file_name(label, record.title(), extension));
        let outcome = write_solution(&path, code)?;
        match outcome {
            ExportOutcome::AlreadyPresent => {
                info!("Code already exists for {label}. Skipping append.")
            }
            _ => info!("Code pasted for {label}"),
        }
        outcomes.push((label.to_string(), outcome));
    }

    Ok(outcomes)
}

fn write_solution(path: &Path, code: &str) -> Result<ExportOutcome, TransferError> {
    if path.exists() {
        let existing = fs::read_to_string(path)?;
        if existing.contains(code) {
            return Ok(ExportOutcome::AlreadyPresent);
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(code.as_bytes())?;
    Ok(ExportOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contest::ProblemRecord;
    use indexmap::IndexMap;

    fn contest(entries: &[(&str, &str, Option<&str>)]) -> ContestData {
        let mut data = ContestData::new();
        for (label, title, code) in entries {
            data.insert(
                *label,
                ProblemRecord {
                    columns: IndexMap::from([("Title".to_string(), title.to_string())]),
                    code: code.map(str::to_string),
                    ..Default::default()
                },
            );
        }
        data
    }

    #[test]
    fn sanitizes_titles() {
        assert_eq!(sanitize_title("Two Pointers (Easy)"), "Two_Pointers_Easy");
        assert_eq!(sanitize_title("Bit-Wise Or!"), "Bit_Wise_Or");
        assert_eq!(sanitize_title("Sum of A and B ?"), "Sum_of_A_and_B");
        assert_eq!(sanitize_title("I/O Test"), "IO_Test");
        assert_eq!(sanitize_title("Yes, No? Maybe. End."), "Yes,_No?_Maybe._End");
        assert_eq!(file_name("C", "Hello, World.", "cpp"), "C_Hello,_World.cpp");
    }

    #[test]
    fn creates_file_with_exactly_the_code() {
        let dir = tempfile::tempdir().unwrap();
        let data = contest(&[("A", "Sum", Some("int main(){}"))]);

        let outcomes = export(&data, &LabelRange::default(), dir.path(), "cpp").unwrap();

        assert_eq!(outcomes, vec![("A".to_string(), ExportOutcome::Written)]);
        let written = fs::read_to_string(dir.path().join("A_Sum.cpp")).unwrap();
        assert_eq!(written, "int main(){}");
    }

    #[test]
    fn exporting_twice_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let data = contest(&[("A", "Sum", Some("int main(){}"))]);

        export(&data, &LabelRange::default(), dir.path(), "cpp").unwrap();
        let outcomes = export(&data, &LabelRange::default(), dir.path(), "cpp").unwrap();

        assert_eq!(outcomes, vec![("A".to_string(), ExportOutcome::AlreadyPresent)]);
        let written = fs::read_to_string(dir.path().join("A_Sum.cpp")).unwrap();
        assert_eq!(written, "int main(){}");
    }

    #[test]
    fn changed_code_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("A_Sum.cpp"), "old;").unwrap();
        let data = contest(&[("A", "Sum", Some("new;"))]);

        export(&data, &LabelRange::default(), dir.path(), "cpp").unwrap();

        let written = fs::read_to_string(dir.path().join("A_Sum.cpp")).unwrap();
        assert_eq!(written, "old;new;");
    }

    #[test]
    fn honours_range_and_skips_missing_code() {
        let dir = tempfile::tempdir().unwrap();
        let data = contest(&[
            ("A", "Sum", Some("a")),
            ("B", "Product", None),
            ("C", "Max", Some("c")),
            ("D", "Min", Some("d")),
        ]);

        let outcomes = export(
            &data,
            &LabelRange::new("B", Some("D".into())),
            &dir.path().join("nested"),
            "cpp",
        )
        .unwrap();

        assert_eq!(
            outcomes,
            vec![
                ("B".to_string(), ExportOutcome::NoCode),
                ("C".to_string(), ExportOutcome::Written)
            ]
        );
        assert!(!dir.path().join("nested/A_Sum.cpp").exists());
        assert!(dir.path().join("nested/C_Max.cpp").exists());
    }
}
