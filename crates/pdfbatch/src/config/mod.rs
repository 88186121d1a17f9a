pub mod loader;
pub mod schema;
pub mod templates;

pub use loader::{
    default_config_path, load_config, load_config_from_str, load_config_or_default,
    resolve_config_path, CONFIG_ENV_VAR,
};
pub use schema::{
    Config, DocumentTemplate, FieldTransform, NamePart, NamingOptions, OcrConfig,
};
pub use templates::builtin_templates;
