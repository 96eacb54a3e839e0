//! # Domain Models
//!
//! Catalog records, column schema and constraint value types.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CatalogRecord`] | One space object, union of all provider fields |
//! | [`Column`] | Output column with its canonical name |
//! | [`Range`] | Two-bound numeric or date constraint |
//! | [`TextMatch`] | OR / AND substring match |
//! | [`IdSelector`] | NORAD ids given inline or loaded from a file |

mod constraint;
mod date;
mod record;

pub use constraint::{
    parse_id_list, parse_norad_id, DateRange, IdSelector, NumericRange, Range, TextMatch,
};
pub use date::{compact_date, format_date, parse_date, utc_date_stamp};
pub use record::{CatalogRecord, Cell, Column};
