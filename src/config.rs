use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bytecode::CompilerConfig;
use crate::runtime::VmConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(
        "invalid config '{}': compiler uses {compiler} registers but the vm only has {vm}",
        path.display()
    )]
    RegisterMismatch {
        path: PathBuf,
        compiler: usize,
        vm: usize,
    },
}

/// Toolchain limits, loaded from TOML.
///
/// ```toml
/// [compiler]
/// max_code_length = 500
///
/// [vm]
/// max_stack_height = 2000
/// max_steps = 1000000
/// ```
///
/// Every table and key is optional; missing ones keep their defaults.
/// Code compiled for more registers than the VM has would fault on the first
/// out-of-range register, so such a file is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compiler: CompilerConfig,
    pub vm: VmConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if config.compiler.register_count > config.vm.register_count {
            return Err(ConfigError::RegisterMismatch {
                path: path.to_path_buf(),
                compiler: config.compiler.register_count,
                vm: config.vm.register_count,
            });
        }

        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.compiler.max_code_length, 500);
        assert_eq!(config.compiler.max_symbols, 500);
        assert_eq!(config.compiler.register_count, 16);
        assert_eq!(config.vm.register_count, 16);
        assert_eq!(config.vm.max_stack_height, 2000);
        assert_eq!(config.vm.max_steps, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("[compiler]\nmax_code_length = 64\n\n[vm]\nmax_steps = 1000\n");
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.compiler.max_code_length, 64);
        assert_eq!(config.compiler.max_symbols, 500);
        assert_eq!(config.vm.max_steps, Some(1000));
        assert_eq!(config.vm.max_stack_height, 2000);
    }

    #[test]
    fn test_empty_file() {
        let file = write_config("");
        assert_eq!(Config::load(file.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[vm]\nmax_steps = \"lots\"\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_compiler_needs_no_more_registers_than_vm() {
        let file = write_config("[compiler]\nregister_count = 32\n");
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::RegisterMismatch {
                compiler: 32,
                vm: 16,
                ..
            })
        ));

        let file = write_config("[compiler]\nregister_count = 8\n\n[vm]\nregister_count = 32\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.compiler.register_count, 8);
        assert_eq!(config.vm.register_count, 32);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
