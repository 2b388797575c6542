//! The workbook and its write pipeline.

use crate::context::Context;
use crate::element::{Sheet, TableOptions};
use crate::element::sheet::validate_sheet_name;
use crate::error::{Result, SheetError};
use crate::layout::{self, Inherited};
use crate::resolve::resolve_to_fixed_point;
use crate::storage::{SheetOptions, WorkbookSink, XlsxSink, launch};
use crate::style::{CellStyle, Color};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_PATH: &str = "workbook.xlsx";

pub struct Workbook {
    ctx: Context,
    sheets: Vec<Sheet>,
    path: PathBuf,
    auto_open: Option<bool>,
    tab_color: Option<Color>,
    zoom: Option<u16>,
    isolate: bool,
    cell_style: CellStyle,
    header_style: CellStyle,
    table_style: TableOptions,
}

impl Workbook {
    pub fn new(ctx: &Context, sheets: impl IntoIterator<Item = Sheet>) -> Workbook {
        Workbook {
            ctx: ctx.clone(),
            sheets: sheets.into_iter().collect(),
            path: PathBuf::from(DEFAULT_PATH),
            auto_open: None,
            tab_color: None,
            zoom: None,
            isolate: false,
            cell_style: CellStyle::default(),
            header_style: CellStyle::default(),
            table_style: TableOptions::default(),
        }
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Open the file after saving. Defaults to the build config's setting.
    pub fn auto_open(mut self, on: bool) -> Self {
        self.auto_open = Some(on);
        self
    }

    pub fn tab_color(mut self, color: Color) -> Self {
        self.tab_color = Some(color);
        self
    }

    pub fn zoom(mut self, percent: u16) -> Self {
        self.zoom = Some(percent.clamp(10, 400));
        self
    }

    /// Default for sheets that do not say whether they are isolated.
    pub fn isolate(mut self, isolate: bool) -> Self {
        self.isolate = isolate;
        self
    }

    pub fn cell_style(mut self, style: CellStyle) -> Self {
        self.cell_style = style;
        self
    }

    pub fn header_style(mut self, style: CellStyle) -> Self {
        self.header_style = style;
        self
    }

    pub fn table_style(mut self, options: TableOptions) -> Self {
        self.table_style = options;
        self
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn output_path(&self) -> &Path {
        &self.path
    }

    /// Final sheet names: titles where given, `Sheet{n}` by position
    /// otherwise. Names must be unique ignoring case.
    pub fn sheet_names(&self) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(self.sheets.len());
        for (i, sheet) in self.sheets.iter().enumerate() {
            let name = match sheet.get_title() {
                Some(title) => title.to_string(),
                None => format!("Sheet{}", i + 1),
            };
            validate_sheet_name(&name)?;
            if !seen.insert(name.to_lowercase()) {
                return Err(SheetError::InvalidSheetName(name));
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Build and save to the workbook's path as `.xlsx`.
    pub fn write(&self) -> Result<PathBuf> {
        let mut sink = XlsxSink::new();
        self.write_to_sink(&mut sink, &self.path)?;
        Ok(self.path.clone())
    }

    /// Build into `sink` and save it to `path`. The context's symbol table
    /// is cleared afterwards, whether or not the build succeeded.
    pub fn write_to_sink(&self, sink: &mut dyn WorkbookSink, path: &Path) -> Result<()> {
        let result = self.build(sink, path);
        self.ctx.clear_all();
        result
    }

    fn build(&self, sink: &mut dyn WorkbookSink, path: &Path) -> Result<()> {
        let names = self.sheet_names()?;
        let auto_open = self.auto_open.unwrap_or(self.ctx.config().auto_open);
        if auto_open {
            launch::ensure_writable(path)?;
        }

        self.resolve()?;

        let base = Inherited {
            cell_style: self.cell_style.clone(),
            header_style: self.header_style.clone(),
            ..Inherited::default()
        };
        for (sheet, name) in self.sheets.iter().zip(&names) {
            sheet.append_end_gap()?;
            layout::lay_out(&sheet.root(), name, &sheet.inherited(&base));
        }

        let mut handles = Vec::with_capacity(names.len());
        for (i, (sheet, name)) in self.sheets.iter().zip(&names).enumerate() {
            let handle = sink.create_sheet(name)?;
            let options = SheetOptions {
                tab_color: sheet.tab_color.or(self.tab_color),
                zoom: sheet.zoom.or(self.zoom),
                hidden: sheet.hidden,
                active: i == 0,
            };
            sink.configure_sheet(handle, &options)?;
            handles.push(handle);
        }

        for ((sheet, name), handle) in self.sheets.iter().zip(&names).zip(handles) {
            let root = sheet.root();
            let cells = layout::write::write_cells(&root, handle, name, &self.ctx, sink)?;
            let mut defaults = sheet.table_style.clone();
            defaults.inherit_from(&self.table_style);
            let tables = layout::table::define_tables(
                &root,
                handle,
                name,
                &defaults,
                self.ctx.config().table_name_attempts,
                sink,
            )?;
            log::info!("sheet {}: {} cell(s), {} table(s)", name, cells, tables);
        }

        sink.save(path)?;
        log::info!("saved {}", path.display());
        if auto_open {
            launch::open_file(path)?;
        }
        Ok(())
    }

    /// Sheets resolve in order. An isolated sheet resolves together with
    /// every sheet before it, then drops its local names so later sheets
    /// cannot see them. A final pass over everything reports what is left.
    fn resolve(&self) -> Result<()> {
        let mut roots = Vec::new();
        for sheet in &self.sheets {
            let root = sheet.root();
            roots.push(root.clone());
            if !sheet.isolate.unwrap_or(self.isolate) {
                continue;
            }
            match resolve_to_fixed_point(&roots, &self.ctx) {
                Ok(()) | Err(SheetError::UnresolvedReference { .. }) => {}
                Err(e) => return Err(e),
            }
            self.ctx.clear_scope(&root);
        }
        resolve_to_fixed_point(&roots, &self.ctx)
    }
}
