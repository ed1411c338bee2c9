//! Skeleton content for newly created config files

use crate::config::ConfigFormat;

/// Template written into a config file created by the open command
pub fn skeleton_for(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Vimscript => {
            "\" Local project configuration\n\" Sourced by projectlocal after approval\n\n"
        }
        ConfigFormat::Lua => {
            "-- Local project configuration\n-- Sourced by projectlocal after approval\n\n"
        }
        ConfigFormat::Json => {
            "{\n  \"projectlocal\": {\n    \"globalVars\": {}\n  }\n}\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_skeleton_parses_with_namespace() {
        let value: serde_json::Value =
            serde_json::from_str(skeleton_for(ConfigFormat::Json)).unwrap();
        assert!(value.get(super::super::json::NAMESPACE).is_some());
    }
}
