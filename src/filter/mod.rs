//! Text filters applied to rendered notebook fragments.
//!
//! | Module   | Purpose                                           |
//! |----------|---------------------------------------------------|
//! | `indent` | Indentation depth, code-block check, (de)indent   |
//! | `table`  | Dataframe table detection                         |
//! | `wrap`   | Input/output cell wrappers and classification     |

mod indent;
mod table;
mod wrap;

pub use indent::{
    CODE_INDENT, dedent, indent, is_indented_code_block, line_indentation_depth,
    paragraph_indentation_depth,
};
pub use table::is_structured_table_block;
pub use wrap::{CellFilters, FilterWarning, INPUT_CELL_CLASS, OUTPUT_CELL_CLASS, OutputKind};

use thiserror::Error;

/// Errors raised by fragment filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("fragment has no non-empty line, indentation depth is undefined")]
    EmptyInput,
}
