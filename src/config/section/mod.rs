//! Configuration section definitions.
//!
//! Each module corresponds to a section in `tola-nb.toml`:
//!
//! | Module     | TOML Section   | Purpose                               |
//! |------------|----------------|---------------------------------------|
//! | `site`     | `[site]`       | Docs dir, site dir, URL style         |
//! | `notebook` | `[notebook]`   | Execution, preamble, markdown output  |

mod notebook;
mod site;

pub use notebook::NotebookConfig;
pub use site::SiteSectionConfig;
