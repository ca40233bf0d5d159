//! File formats the tax office and spreadsheet apps accept.

pub mod csv;
pub mod xml;

pub use self::csv::transactions_csv;
pub use self::xml::declaration_xml;
