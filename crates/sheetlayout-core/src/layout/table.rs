//! Frames written as spreadsheet tables.

use crate::element::{Element, Frame, Identified, TableOptions};
use crate::error::{Result, SheetError};
use crate::storage::{SheetHandle, TableSpec, WorkbookSink};
use std::collections::HashSet;

const UNNAMED: &str = "Unnamed";

/// Apply schema renames, and give every vector of a table frame a unique
/// header. Runs before header cells are inserted.
pub fn prepare_headers(root: &Element) {
    root.visit(&mut |el| {
        let Element::Frame(frame) = el else {
            return;
        };
        apply_schema(frame);
        if frame.is_table() {
            name_columns(frame);
        }
    });
}

fn apply_schema(frame: &Frame) {
    let schema = frame.0.borrow().schema.clone();
    if schema.is_empty() {
        return;
    }
    for v in frame.vectors() {
        let Some(header) = v.header() else {
            continue;
        };
        if let Some((_, to)) = schema.iter().find(|(from, _)| *from == header) {
            v.set_header(Some(to.clone()));
        }
    }
}

fn name_columns(frame: &Frame) {
    let mut taken = HashSet::new();
    let mut unnamed = 0usize;
    for v in frame.vectors() {
        let base = match v.header() {
            Some(header) => header,
            None => {
                unnamed += 1;
                if unnamed == 1 {
                    UNNAMED.to_string()
                } else {
                    format!("{}{}", UNNAMED, unnamed)
                }
            }
        };
        let mut name = base.clone();
        let mut n = 1;
        while !taken.insert(name.to_lowercase()) {
            n += 1;
            name = format!("{}{}", base, n);
        }
        if v.header().as_deref() != Some(name.as_str()) {
            v.set_header(Some(name));
        }
    }
}

/// Table display name derived from a sheet title.
pub fn sanitize_table_name(title: &str) -> String {
    let mut name: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() {
        name.push_str("Table");
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Define a table for every placed table frame under `root`.
pub fn define_tables(
    root: &Element,
    sheet: SheetHandle,
    sheet_title: &str,
    defaults: &TableOptions,
    attempts: usize,
    sink: &mut dyn WorkbookSink,
) -> Result<usize> {
    let mut frames = Vec::new();
    root.visit(&mut |el| {
        if let Element::Frame(frame) = el {
            if frame.is_table() {
                frames.push(frame.clone());
            }
        }
    });

    let mut count = 0;
    for frame in frames {
        let Some(mut options) = frame.table_options() else {
            continue;
        };
        options.inherit_from(defaults);
        let Some((first, last)) = frame.range(true) else {
            log::debug!("skipping table on an empty frame");
            continue;
        };
        let headers = frame
            .vectors()
            .iter()
            .map(|v| v.header().unwrap_or_default())
            .collect();
        let base = options
            .name
            .clone()
            .unwrap_or_else(|| sanitize_table_name(sheet_title));
        let mut spec = TableSpec {
            first: (first.row, first.col),
            last: (last.row, last.col),
            name: base.clone(),
            options,
            headers,
        };
        define_with_retry(sink, sheet, &mut spec, &base, attempts)?;
        log::debug!("table {} defined", spec.name);
        count += 1;
    }
    Ok(count)
}

fn define_with_retry(
    sink: &mut dyn WorkbookSink,
    sheet: SheetHandle,
    spec: &mut TableSpec,
    base: &str,
    attempts: usize,
) -> Result<()> {
    let attempts = attempts.max(1);
    let mut last = None;
    for attempt in 1..=attempts {
        spec.name = if attempt == 1 {
            base.to_string()
        } else {
            format!("{}_{}", base, attempt)
        };
        match sink.define_table(sheet, spec) {
            Ok(()) => return Ok(()),
            Err(err @ SheetError::DuplicateTableName(_)) => last = Some(err),
            Err(other) => return Err(other),
        }
    }
    Err(SheetError::TableNameCollision {
        name: base.to_string(),
        attempts,
        last: Box::new(last.unwrap_or_else(|| SheetError::DuplicateTableName(base.to_string()))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::element::Vector;
    use crate::layout::place::place;
    use crate::storage::RecordingSink;
    use pretty_assertions::assert_eq;
    use sheetlayout_engine::engine::Location;

    fn headers(frame: &Frame) -> Vec<String> {
        frame.vectors().iter().map(|v| v.header().unwrap_or_default()).collect()
    }

    #[test]
    fn test_table_headers_are_generated_and_deduplicated() {
        let ctx = Context::new();
        let frame = Frame::columns([
            Vector::col([1]).unwrap(),
            Vector::col([2]).unwrap().with_header(&ctx, "Amount"),
            Vector::col([3]).unwrap(),
            Vector::col([4]).unwrap().with_header(&ctx, "amount"),
        ])
        .unwrap()
        .table(TableOptions::new());
        prepare_headers(&Element::from(frame.clone()));
        assert_eq!(headers(&frame), vec!["Unnamed", "Amount", "Unnamed2", "amount2"]);
    }

    #[test]
    fn test_schema_renames_headers() {
        let ctx = Context::new();
        let frame = Frame::columns([Vector::col([1]).unwrap().with_header(&ctx, "qty")])
            .unwrap()
            .schema([("qty", "Quantity")]);
        prepare_headers(&Element::from(frame.clone()));
        assert_eq!(headers(&frame), vec!["Quantity"]);
    }

    #[test]
    fn test_sanitized_names() {
        assert_eq!(sanitize_table_name("Q1 Sales"), "Q1_Sales");
        assert_eq!(sanitize_table_name("2024"), "_2024");
        assert_eq!(sanitize_table_name(""), "Table");
    }

    #[test]
    fn test_name_collisions_retry_with_suffix() {
        let ctx = Context::new();
        let make = || {
            let frame = Frame::columns([Vector::col([1, 2]).unwrap().with_header(&ctx, "a")])
                .unwrap()
                .table(TableOptions::new());
            let el = Element::from(frame);
            prepare_headers(&el);
            for v in el.children() {
                if let Element::Vector(v) = v {
                    v.insert_header_cell();
                }
            }
            place(&el, &Location::new("Data", 0, 0));
            el
        };
        let mut sink = RecordingSink::new();
        let sheet = sink.create_sheet("Data").unwrap();
        let defaults = TableOptions::new();
        define_tables(&make(), sheet, "Data", &defaults, 5, &mut sink).unwrap();
        define_tables(&make(), sheet, "Data", &defaults, 5, &mut sink).unwrap();
        let tables = &sink.sheet("Data").unwrap().tables;
        assert_eq!(tables[0].name, "Data");
        assert_eq!(tables[1].name, "Data_2");
        assert_eq!(tables[0].first, (0, 0));
        assert_eq!(tables[0].last, (2, 0));
        assert_eq!(tables[0].headers, vec!["a".to_string()]);
    }

    #[test]
    fn test_exhausted_attempts_report_collision() {
        let mut sink = RecordingSink::new();
        let sheet = sink.create_sheet("S").unwrap();
        let mut spec = TableSpec {
            first: (0, 0),
            last: (1, 0),
            name: String::new(),
            options: TableOptions::new(),
            headers: vec!["h".to_string()],
        };
        define_with_retry(&mut sink, sheet, &mut spec, "T", 1).unwrap();
        let err = define_with_retry(&mut sink, sheet, &mut spec, "T", 1).unwrap_err();
        assert!(matches!(err, SheetError::TableNameCollision { attempts: 1, .. }));
    }
}
