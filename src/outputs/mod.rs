//! Output generation.
//!
//! # Submodules
//!
//! - [`spreadsheet`]: Writes extracted records to a single `.xlsx` file
//!
//! # Output Structure
//!
//! ```text
//! ./
//! ├── ap_news.xlsx          # one row per record
//! └── news_pictures/        # downloaded pictures, named by URL basename
//!     ├── photo-1.jpeg
//!     └── photo-2.jpeg
//! ```

pub mod spreadsheet;
