//! Storage layer.
//!
//! Tables hold encoded records keyed by record id. The query pipeline sees
//! them only through [`Table`] handles obtained from the [`Db`] catalog and
//! through the transaction interface.

mod db;
mod meta;
mod record;
mod table;
mod value;

pub use db::Db;
pub use meta::{FieldMeta, TableMeta};
pub use record::Record;
pub use table::Table;
pub use value::{AttrType, Value};
