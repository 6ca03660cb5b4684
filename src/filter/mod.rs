pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod cursor;
pub mod error;

pub use types::*;
pub use filter::Filter;
pub use cursor::Cursor;
pub use error::FilterError;
