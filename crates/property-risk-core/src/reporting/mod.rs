pub mod format;
pub mod summary;

pub use format::{format_currency, format_currency_decimal, format_percentage};
pub use summary::generate_summary_text;
