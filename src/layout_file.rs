//! TOML layout descriptions.
//!
//! ```toml
//! [workbook]
//! path = "report.xlsx"
//!
//! [[sheets]]
//! title = "Sales"
//!
//! [[sheets.blocks]]
//! kind = "frame"
//! table = "Medium2"
//!
//! [[sheets.blocks.columns]]
//! header = "Price"
//! values = [10, 20]
//!
//! [[sheets.blocks.columns]]
//! header = "Taxed"
//! formula = "[Price] * 1.2"
//!
//! [[sheets.blocks]]
//! kind = "row"
//! values = ["Total", "@SUM([Taxed])"]
//! ```
//!
//! Strings starting with `=` are reference templates. Strings of the form
//! `@NAME(arg, ...)` are function calls whose arguments are templates,
//! numbers or quoted text. A frame column with `formula` instead of `values`
//! is one template evaluated for the whole column.

use crate::config::read_capped;
use crate::error::{CliError, Result};
use regex::Regex;
use serde::Deserialize;
use sheetlayout_core::style::BorderSpec;
use sheetlayout_core::{
    CellStyle, Color, Context, Element, Expression, Frame, FunctionCall, Gap, Operand,
    Orientation, Sheet, TableOptions, Vector, Workbook,
};
use sheetlayout_engine::builtins::is_builtin_function;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutFile {
    #[serde(default)]
    pub workbook: WorkbookSection,
    #[serde(default)]
    pub sheets: Vec<SheetSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkbookSection {
    pub path: Option<PathBuf>,
    pub tab_color: Option<String>,
    pub zoom: Option<u16>,
    pub isolate: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SheetSection {
    pub title: Option<String>,
    pub tab_color: Option<String>,
    pub zoom: Option<u16>,
    pub hidden: bool,
    pub end_gap: usize,
    pub isolate: Option<bool>,
    pub background_color: Option<String>,
    pub blocks: Vec<BlockSection>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Col,
    Row,
    Frame,
    Vframe,
    Gap,
}

impl BlockKind {
    fn name(self) -> &'static str {
        match self {
            BlockKind::Col => "col",
            BlockKind::Row => "row",
            BlockKind::Frame => "frame",
            BlockKind::Vframe => "vframe",
            BlockKind::Gap => "gap",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockSection {
    pub kind: BlockKind,
    pub id: Option<String>,
    pub header: Option<String>,
    #[serde(default)]
    pub values: Vec<toml::Value>,
    #[serde(default)]
    pub columns: Vec<ColumnSection>,
    pub table: Option<TableSetting>,
    pub border: Option<BorderSetting>,
    pub fill: Option<String>,
    pub bold: Option<bool>,
    pub number_format: Option<String>,
    /// Gap blocks only.
    pub size: Option<usize>,
}

/// One vector of a frame block.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnSection {
    pub id: Option<String>,
    pub header: Option<String>,
    pub values: Vec<toml::Value>,
    pub formula: Option<String>,
    pub bold: Option<bool>,
    pub number_format: Option<String>,
}

/// `table = true` or `table = "Medium2"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TableSetting {
    Flag(bool),
    Style(String),
}

/// `border = true` or `border = "thin"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BorderSetting {
    Flag(bool),
    Spec(String),
}

impl From<&BorderSetting> for BorderSpec {
    fn from(setting: &BorderSetting) -> BorderSpec {
        match setting {
            BorderSetting::Flag(on) => BorderSpec::from(*on),
            BorderSetting::Spec(spec) => BorderSpec::from(spec.as_str()),
        }
    }
}

pub fn load_layout(path: &Path) -> Result<LayoutFile> {
    let content = read_capped(path)?;
    parse_layout(path, &content)
}

pub fn parse_layout(path: &Path, content: &str) -> Result<LayoutFile> {
    toml::from_str(content).map_err(|err| CliError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Turn a layout description into a workbook bound to `ctx`. The output
/// path is left to the caller.
pub fn build_workbook(layout: &LayoutFile, ctx: &Context) -> Result<Workbook> {
    let mut sheets = Vec::with_capacity(layout.sheets.len());
    for (i, section) in layout.sheets.iter().enumerate() {
        let label = section
            .title
            .clone()
            .unwrap_or_else(|| format!("#{}", i + 1));
        sheets.push(build_sheet(section, &label, ctx)?);
    }

    let wb_section = &layout.workbook;
    let mut workbook = Workbook::new(ctx, sheets);
    if let Some(color) = &wb_section.tab_color {
        workbook = workbook.tab_color(Color::hex(color)?);
    }
    if let Some(zoom) = wb_section.zoom {
        workbook = workbook.zoom(zoom);
    }
    if let Some(isolate) = wb_section.isolate {
        workbook = workbook.isolate(isolate);
    }
    Ok(workbook)
}

fn build_sheet(section: &SheetSection, label: &str, ctx: &Context) -> Result<Sheet> {
    let mut sheet = Sheet::new().hidden(section.hidden).end_gap(section.end_gap);
    if let Some(title) = &section.title {
        sheet = sheet.title(title)?;
    }
    if let Some(color) = &section.tab_color {
        sheet = sheet.tab_color(Color::hex(color)?);
    }
    if let Some(zoom) = section.zoom {
        sheet = sheet.zoom(zoom);
    }
    if let Some(isolate) = section.isolate {
        sheet = sheet.isolate(isolate);
    }
    if let Some(color) = &section.background_color {
        sheet = sheet.background(Color::hex(color)?);
    }

    for (i, block) in section.blocks.iter().enumerate() {
        let element = build_block(block, ctx).map_err(|err| CliError::Block {
            sheet: label.to_string(),
            block: i + 1,
            message: err.to_string(),
        })?;
        sheet.push(element)?;
    }
    Ok(sheet)
}

fn build_block(block: &BlockSection, ctx: &Context) -> Result<Element> {
    let kind = block.kind.name();
    match block.kind {
        BlockKind::Gap => {
            reject(kind, "values", !block.values.is_empty())?;
            reject(kind, "columns", !block.columns.is_empty())?;
            let mut gap = Gap::new(block.size.unwrap_or(1));
            if let Some(color) = &block.fill {
                gap = gap
                    .filled(true)
                    .style(CellStyle::new().fill_color(Color::hex(color)?));
            }
            Ok(Element::from(gap))
        }
        BlockKind::Col | BlockKind::Row => {
            reject(kind, "columns", !block.columns.is_empty())?;
            reject(kind, "table", block.table.is_some())?;
            reject(kind, "size", block.size.is_some())?;
            let orientation = if block.kind == BlockKind::Col {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            };
            let mut vector = build_vector(
                orientation,
                &block.values,
                block.header.as_deref(),
                block.id.as_deref(),
                ctx,
            )?;
            vector = vector.cell_style(block_style(block.bold, block.number_format.as_deref()));
            if let Some(color) = &block.fill {
                vector = vector.background(Color::hex(color)?);
            }
            if let Some(border) = &block.border {
                vector = vector.border(border)?;
            }
            Ok(Element::from(vector))
        }
        BlockKind::Frame | BlockKind::Vframe => {
            reject(kind, "values", !block.values.is_empty())?;
            reject(kind, "header", block.header.is_some())?;
            reject(kind, "size", block.size.is_some())?;
            let orientation = if block.kind == BlockKind::Frame {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            let mut vectors = Vec::with_capacity(block.columns.len());
            for column in &block.columns {
                vectors.push(build_column(column, orientation.cross(), ctx)?);
            }
            let mut frame = Frame::new(orientation, vectors)?
                .cell_style(block_style(block.bold, block.number_format.as_deref()));
            if let Some(id) = &block.id {
                frame = frame.with_id(ctx, id)?;
            }
            if let Some(color) = &block.fill {
                frame = frame.background(Color::hex(color)?);
            }
            if let Some(border) = &block.border {
                frame = frame.border(border)?;
            }
            match &block.table {
                Some(TableSetting::Flag(true)) => frame = frame.table(TableOptions::new()),
                Some(TableSetting::Style(style)) => {
                    frame = frame.table(TableOptions::new().style(style.as_str()))
                }
                Some(TableSetting::Flag(false)) | None => {}
            }
            Ok(Element::from(frame))
        }
    }
}

fn build_column(column: &ColumnSection, orientation: Orientation, ctx: &Context) -> Result<Element> {
    let style = block_style(column.bold, column.number_format.as_deref());
    if let Some(template) = &column.formula {
        reject("formula column", "values", !column.values.is_empty())?;
        let mut expr = Expression::new(template)?;
        if let Some(header) = &column.header {
            expr = expr.with_header(ctx, header);
        }
        if let Some(id) = &column.id {
            expr = expr.with_id(ctx, id)?;
        }
        if !style.is_unset() {
            expr = expr.cell_style(style);
        }
        return Ok(Element::from(expr));
    }
    let vector = build_vector(
        orientation,
        &column.values,
        column.header.as_deref(),
        column.id.as_deref(),
        ctx,
    )?;
    Ok(Element::from(if style.is_unset() {
        vector
    } else {
        vector.cell_style(style)
    }))
}

fn reject(kind: &'static str, field: &'static str, present: bool) -> Result<()> {
    if present {
        return Err(CliError::UnexpectedField { kind, field });
    }
    Ok(())
}

fn block_style(bold: Option<bool>, number_format: Option<&str>) -> CellStyle {
    let mut style = CellStyle::new();
    if let Some(bold) = bold {
        style = style.bold(bold);
    }
    if let Some(format) = number_format {
        style = style.number_format(format);
    }
    style
}

fn build_vector(
    orientation: Orientation,
    values: &[toml::Value],
    header: Option<&str>,
    id: Option<&str>,
    ctx: &Context,
) -> Result<Vector> {
    let items = values.iter().map(value_element).collect::<Result<Vec<_>>>()?;
    let mut vector = Vector::new(orientation, items)?;
    if let Some(header) = header {
        vector = vector.with_header(ctx, header);
    }
    if let Some(id) = id {
        vector = vector.with_id(ctx, id)?;
    }
    Ok(vector)
}

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^@(?<name>[A-Za-z][A-Za-z0-9._]*)\((?<args>.*)\)$")
            .expect("call regex must compile")
    })
}

/// Element for one entry of a `values` list.
pub fn value_element(value: &toml::Value) -> Result<Element> {
    match value {
        toml::Value::String(text) => {
            if let Some(template) = text.strip_prefix('=') {
                return Ok(Element::from(Expression::new(template)?));
            }
            if text.starts_with('@') {
                return Ok(Element::from(function_call(text)?));
            }
            Ok(Element::from(text.as_str()))
        }
        toml::Value::Integer(n) => Ok(Element::from(*n)),
        toml::Value::Float(n) => Ok(Element::from(*n)),
        toml::Value::Boolean(b) => Ok(Element::from(*b)),
        toml::Value::Datetime(dt) => Ok(Element::from(dt.to_string())),
        other => Err(CliError::InvalidValue(other.to_string())),
    }
}

fn function_call(text: &str) -> Result<FunctionCall> {
    let caps = call_regex()
        .captures(text)
        .ok_or_else(|| CliError::InvalidCall(text.to_string()))?;
    let name = &caps["name"];
    if !is_builtin_function(&name.to_ascii_uppercase()) {
        log::debug!("{} is not a classic built-in; writing it as a newer function", name);
    }
    let operands = split_args(&caps["args"])
        .into_iter()
        .map(operand)
        .collect::<Vec<_>>();
    Ok(FunctionCall::new(name, operands)?)
}

fn operand(arg: &str) -> Operand {
    if let Ok(n) = arg.parse::<f64>() {
        return Operand::literal(n);
    }
    if let Some(text) = arg.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        return Operand::literal(text);
    }
    Operand::template(arg)
}

/// Split on commas outside brackets, parentheses and quotes.
fn split_args(args: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '[' | '(' if !quoted => depth += 1,
            ']' | ')' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                out.push(args[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(args[start..].trim());
    out.retain(|arg| !arg.is_empty());
    out
}
