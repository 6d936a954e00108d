// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Configuration files driving a real engine.
#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;

    use crate::config::{load_config, OptionValue};
    use crate::engine::EngineBuilder;
    use crate::errors::ConfigError;

    fn write_config(suffix: &str, text: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_yaml_file_defines_options_profiles_and_initial_values() {
        let file = write_config(
            ".yaml",
            r#"
worker_threads: 2
options:
  - name: brightness
    type: int
    default: "0"
    min: 0
    max: 100
profiles:
  quiet:
    description: lower the volume
    options:
      volume: "30"
      mute: "no"
set:
  pause: "yes"
"#,
        );
        let config = load_config(file.path()).unwrap();
        let engine = EngineBuilder::from_config(config).build().unwrap();

        assert!(engine.lock().options.get_flag("pause"));
        assert!(engine.command_blocking("set brightness 40").success);
        assert!(!engine.command_blocking("set brightness 400").success);
        assert_eq!(engine.lock().options.get("brightness"), Some(&OptionValue::Int(40)));

        assert!(engine.command_blocking("apply-profile quiet").success);
        assert_eq!(engine.lock().options.get_f64("volume"), Some(30.0));
        assert!(!engine.command_blocking("apply-profile loud").success);
        engine.shutdown();
    }

    #[test]
    fn test_toml_file_is_recognised_by_extension() {
        let file = write_config(
            ".toml",
            r#"
queue_capacity = 4

[set]
speed = "2.0"
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.get_queue_capacity(), 4);
        let engine = EngineBuilder::from_config(config).build().unwrap();
        assert_eq!(engine.lock().options.get_f64("speed"), Some(2.0));
    }

    #[test]
    fn test_bad_initial_value_names_the_option() {
        let file = write_config(".yaml", "set:\n  volume: loud\n");
        let config = load_config(file.path()).unwrap();
        match EngineBuilder::from_config(config).build() {
            Err(ConfigError::Option { name, .. }) => assert_eq!(name, "volume"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("engine accepted a non-numeric volume"),
        }
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
