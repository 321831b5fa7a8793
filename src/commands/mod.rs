use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pl0::bytecode::{Compilation, Program};
use pl0::config::Config;
use pl0::{BuildError, compile_source};

pub mod compile;
pub mod disassemble;
pub mod run;
pub mod tokens;

pub fn read_source(path: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path))
}

/// Compiles a source file. A full code buffer ends the process here.
pub fn build(path: &str, config: &Config) -> Result<Compilation> {
    let source = read_source(path)?;

    match compile_source(&source, &config.compiler) {
        Ok(compiled) => Ok(compiled),
        Err(BuildError::Compile(err)) if err.is_fatal() => {
            log::error!("{}: {}", path, err);
            eprintln!("{}", err.report());
            std::process::exit(2);
        }
        Err(err) => Err(err).with_context(|| format!("Failed to compile '{}'", path)),
    }
}

/// Loads a program by extension: `.pcode` text, `.pcb` binary, anything
/// else is compiled as source.
pub fn load_program(path: &str, config: &Config) -> Result<Program> {
    let extension = Path::new(path).extension().and_then(|e| e.to_str());

    match extension {
        Some("pcode") => {
            let text = read_source(path)?;
            Program::from_text(&text).with_context(|| format!("Invalid P-code in '{}'", path))
        }
        Some("pcb") => {
            let bytes = fs::read(path).with_context(|| format!("Failed to read '{}'", path))?;
            Program::from_bytes(&bytes).with_context(|| format!("Invalid P-code in '{}'", path))
        }
        _ => Ok(build(path, config)?.program),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, content: &[u8]) -> NamedTempFile {
        let mut f = NamedTempFile::with_suffix(suffix).unwrap();
        f.write_all(content).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_load_program_by_extension() {
        let source = write_temp(".pl0", b"const c = 5; write c.");
        let config = Config::default();
        let from_source = load_program(source.path().to_str().unwrap(), &config).unwrap();

        let text = write_temp(".pcode", from_source.to_text().as_bytes());
        let from_text = load_program(text.path().to_str().unwrap(), &config).unwrap();

        let binary = write_temp(".pcb", &from_source.to_bytes().unwrap());
        let from_binary = load_program(binary.path().to_str().unwrap(), &config).unwrap();

        assert_eq!(from_text, from_source);
        assert_eq!(from_binary, from_source);
    }

    #[test]
    fn test_compile_error_has_context() {
        let source = write_temp(".pl0", b"var x; x := .");
        let err = build(source.path().to_str().unwrap(), &Config::default()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to compile"));
        assert!(format!("{:#}", err).contains("CODE GENERATOR ERROR[14]"));
    }

    #[test]
    fn test_bad_pcode_is_rejected() {
        let text = write_temp(".pcode", b"1 0 0");
        assert!(load_program(text.path().to_str().unwrap(), &Config::default()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(read_source("/nonexistent/pl0/source.pl0").is_err());
    }
}
