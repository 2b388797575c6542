use pretty_assertions::assert_eq;
use sheetlayout_core::{
    BuildConfig, Cell, CellValue, Context, Element, Expression, Frame, FunctionCall, Gap,
    Operand, Orientation, RecordingSink, Sheet, SheetError, TableOptions, Vector, Workbook,
};
use std::path::Path;

fn formula(text: &str) -> Option<CellValue> {
    Some(CellValue::Formula(text.to_string()))
}

fn build(ctx: &Context, sheet: Sheet) -> Result<RecordingSink, SheetError> {
    let mut sink = RecordingSink::new();
    Workbook::new(ctx, [sheet]).write_to_sink(&mut sink, Path::new("test.xlsx"))?;
    Ok(sink)
}

#[test]
fn test_sum_of_two_named_cells() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    sheet.push(Gap::new(1)).unwrap();
    let a = Cell::new(1).with_id(&ctx, "a").unwrap();
    let b = Cell::new(2).with_id(&ctx, "b").unwrap();
    sheet
        .push(
            Vector::row([
                Element::from(Gap::new(1)),
                Element::from(a),
                Element::from(b),
                Element::from(Expression::new("[a] + [b]").unwrap()),
            ])
            .unwrap(),
        )
        .unwrap();
    let sink = build(&ctx, sheet).unwrap();
    let s = sink.sheet("S").unwrap();
    assert_eq!(s.at("B2"), Some(&CellValue::Number(1.0)));
    assert_eq!(s.at("D2").cloned(), formula("=B2 + C2"));
}

#[test]
fn test_headed_column_feeds_derived_column() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    let price = Vector::col([1, 2]).unwrap().with_header(&ctx, "Price");
    let doubled = Expression::new("[Price] * 2").unwrap().with_header(&ctx, "Double");
    sheet
        .push(Frame::columns([Element::from(price), Element::from(doubled)]).unwrap())
        .unwrap();
    let sink = build(&ctx, sheet).unwrap();
    let s = sink.sheet("S").unwrap();
    assert_eq!(s.at("A1"), Some(&CellValue::Text("Price".to_string())));
    assert_eq!(s.at("B1"), Some(&CellValue::Text("Double".to_string())));
    assert_eq!(s.at("B2").cloned(), formula("=A2 * 2"));
    assert_eq!(s.at("B3").cloned(), formula("=A3 * 2"));
}

#[test]
fn test_positional_reference() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    sheet
        .push(
            Vector::col([
                Element::from(10),
                Element::from(20),
                Element::from(Expression::new("[0] + [1]").unwrap()),
            ])
            .unwrap(),
        )
        .unwrap();
    let sink = build(&ctx, sheet).unwrap();
    assert_eq!(sink.sheet("S").unwrap().at("A3").cloned(), formula("=A1 + A2"));
}

#[test]
fn test_frame_operand_is_one_range() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    let block = Frame::from_values(Orientation::Horizontal, vec![vec![1, 2], vec![3, 4]]).unwrap();
    let total = FunctionCall::new("SUM", [Operand::from(block.clone())]).unwrap();
    sheet.push(block).unwrap();
    sheet.push(Vector::row([total]).unwrap()).unwrap();
    let sink = build(&ctx, sheet).unwrap();
    assert_eq!(sink.sheet("S").unwrap().at("A3").cloned(), formula("=SUM(A1:B2)"));
}

#[test]
fn test_unplaced_literal_is_inlined() {
    let ctx = Context::new();
    let _ghost = Cell::new(5).with_id(&ctx, "ghost").unwrap();
    let sheet = Sheet::titled("S").unwrap();
    sheet
        .push(Vector::row([Expression::new("[ghost] + 1").unwrap()]).unwrap())
        .unwrap();
    let sink = build(&ctx, sheet).unwrap();
    assert_eq!(sink.sheet("S").unwrap().at("A1").cloned(), formula("=5 + 1"));
    assert!(ctx.inline_warned());
}

#[test]
fn test_unplaced_literal_is_error_when_strict() {
    let ctx = Context::with_config(BuildConfig {
        strict_references: true,
        ..BuildConfig::default()
    });
    let _ghost = Cell::new(5).with_id(&ctx, "ghost").unwrap();
    let sheet = Sheet::titled("S").unwrap();
    sheet
        .push(Vector::row([Expression::new("[ghost] + 1").unwrap()]).unwrap())
        .unwrap();
    assert!(matches!(build(&ctx, sheet), Err(SheetError::MissingReference(_))));
    assert!(!ctx.inline_warned());
}

#[test]
fn test_ragged_frame_range_covers_longest_vector() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    let block = Frame::columns([Vector::col([1, 2, 3]).unwrap(), Vector::col([4]).unwrap()]).unwrap();
    let total = FunctionCall::new("SUM", [Operand::from(block.clone())]).unwrap();
    sheet.push(block).unwrap();
    sheet.push(Vector::row([total]).unwrap()).unwrap();
    let sink = build(&ctx, sheet).unwrap();
    let s = sink.sheet("S").unwrap();
    assert_eq!(s.at("A4").cloned(), formula("=SUM(A1:B3)"));
    assert_eq!(s.at("B1"), Some(&CellValue::Number(4.0)));
    assert!(s.at("B3").map_or(true, CellValue::is_empty));
}

#[test]
fn test_ragged_table_spans_longest_column() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    let frame = Frame::columns([
        Vector::col([1, 2, 3]).unwrap().with_header(&ctx, "long"),
        Vector::col([4]).unwrap().with_header(&ctx, "short"),
    ])
    .unwrap()
    .table(TableOptions::new());
    sheet.push(frame).unwrap();
    let sink = build(&ctx, sheet).unwrap();
    let table = &sink.sheet("S").unwrap().tables[0];
    assert_eq!(table.first, (0, 0));
    assert_eq!(table.last, (3, 1));
    assert_eq!(table.headers, vec!["long".to_string(), "short".to_string()]);
}

#[test]
fn test_isolated_sheet_uses_names_from_earlier_sheet() {
    let ctx = Context::new();
    let inputs = Sheet::titled("Inputs").unwrap();
    inputs
        .push(
            Vector::col([
                Element::from(Cell::new(3).with_id(&ctx, "a").unwrap()),
                Element::from(Expression::new("[a] * 2").unwrap().with_id(&ctx, "x").unwrap()),
            ])
            .unwrap(),
        )
        .unwrap();
    let calc = Sheet::titled("Calc").unwrap().isolate(true);
    calc.push(Vector::col([Expression::new("[x] + 1").unwrap()]).unwrap())
        .unwrap();
    let mut sink = RecordingSink::new();
    Workbook::new(&ctx, [inputs, calc])
        .write_to_sink(&mut sink, Path::new("test.xlsx"))
        .unwrap();
    assert_eq!(sink.sheet("Inputs").unwrap().at("A2").cloned(), formula("=A1 * 2"));
    assert_eq!(sink.sheet("Calc").unwrap().at("A1").cloned(), formula("=Inputs!A2 + 1"));
}

#[test]
fn test_unplaced_empty_cell_lenient_and_strict() {
    let lenient = Context::new();
    let _hole = Cell::empty().with_id(&lenient, "hole").unwrap();
    let sheet = Sheet::titled("S").unwrap();
    sheet
        .push(Vector::row([Expression::new("[hole] + 1").unwrap()]).unwrap())
        .unwrap();
    let sink = build(&lenient, sheet).unwrap();
    assert_eq!(sink.sheet("S").unwrap().at("A1").cloned(), formula("=#REF! + 1"));

    let strict = Context::with_config(BuildConfig {
        strict_references: true,
        ..BuildConfig::default()
    });
    let _hole = Cell::empty().with_id(&strict, "hole").unwrap();
    let sheet = Sheet::titled("S").unwrap();
    sheet
        .push(Vector::row([Expression::new("[hole] + 1").unwrap()]).unwrap())
        .unwrap();
    assert!(matches!(build(&strict, sheet), Err(SheetError::MissingReference(_))));
}

#[test]
fn test_workbook_cannot_be_written_twice() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    sheet.push(Vector::row([1, 2]).unwrap()).unwrap();
    let wb = Workbook::new(&ctx, [sheet]);
    wb.write_to_sink(&mut RecordingSink::new(), Path::new("a.xlsx")).unwrap();
    let err = wb
        .write_to_sink(&mut RecordingSink::new(), Path::new("b.xlsx"))
        .unwrap_err();
    assert!(matches!(err, SheetError::AlreadyWritten(_)));
}

#[test]
fn test_cycle_names_the_loop() {
    let ctx = Context::new();
    let sheet = Sheet::titled("S").unwrap();
    sheet
        .push(
            Vector::col([
                Expression::new("[y] + 1").unwrap().with_id(&ctx, "x").unwrap(),
                Expression::new("[x] + 1").unwrap().with_id(&ctx, "y").unwrap(),
            ])
            .unwrap(),
        )
        .unwrap();
    let err = build(&ctx, sheet).unwrap_err();
    assert!(err.to_string().contains("circular reference"));
}
