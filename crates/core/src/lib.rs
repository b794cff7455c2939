// Core types shared by the loaders, the enrichment engine and the page reports

pub mod cell;
pub mod table;

pub use cell::{format_number, Cell};
pub use table::Table;
