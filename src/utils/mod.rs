pub mod extractor;
pub mod file_magic;
pub mod jwt;
pub mod parameter_error_handler;
pub mod password;
pub mod validate;

pub use extractor::{SafeEmail, SafeIDI64, SafeModuleCode};
pub use file_magic::is_pdf;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
