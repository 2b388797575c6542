//! sheetlayout-core - layout tree, reference resolution, placement and output.

pub mod context;
pub mod element;
pub mod error;
pub mod formula;
pub mod layout;
pub mod ops;
pub mod resolve;
pub mod storage;
pub mod style;

pub use context::{BuildConfig, Context};
pub use element::{
    Cell, CellValue, Dimension, Element, Frame, Gap, Orientation, Sheet, Stack, TableOptions,
    Vector, Workbook,
};
pub use error::{Result, SheetError};
pub use ops::CellSpan;
pub use resolve::{Expression, FunctionCall, Operand};
pub use storage::{RecordingSink, WorkbookSink, XlsxSink};
pub use style::{Border, CellStyle, Color};

pub use sheetlayout_engine::engine::Location;
