use anyhow::Result;
use pl0::bytecode::disasm::print_listing;
use pl0::config::Config;

use super::load_program;

pub fn disassemble_file(path: &str, config: &Config) -> Result<()> {
    let program = load_program(path, config)?;
    print_listing(&program);
    Ok(())
}
