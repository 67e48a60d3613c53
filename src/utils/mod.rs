pub mod cancel;
pub mod paths;

pub use cancel::CancelToken;
pub use paths::{file_base_name, resolve_path, validate_new_file, validate_readable_file};
