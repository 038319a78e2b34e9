pub mod receipt;

pub use receipt::{AddReceiptError, ReceiptValidationError, ValidatedReceiptForm};
