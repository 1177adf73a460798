pub mod environment;
pub mod paths;

pub use environment::{default_config_path, read_env_var};
pub use paths::{format_path_with_tilde, validate_file_size, write_atomic};
