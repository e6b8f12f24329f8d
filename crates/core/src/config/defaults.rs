//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_PROPERTY_NAME: &str = "template";
pub(crate) const ENV_PREFIX: &str = "TPLFOLD";

pub(crate) fn default_property_name() -> String {
    DEFAULT_PROPERTY_NAME.to_string()
}

pub(crate) fn default_extensions() -> Vec<String> {
    ["ts", "tsx", "mts", "cts", "js", "jsx", "mjs", "cjs"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

pub(crate) fn default_ignore_patterns() -> Vec<String> {
    vec![
        "node_modules".to_string(),
        "dist".to_string(),
        ".git".to_string(),
        "*.min.js".to_string(),
    ]
}
