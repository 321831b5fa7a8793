use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use anyhow::{Context, Result};
use pl0::bytecode::disasm::write_listing;
use pl0::config::Config;
use pl0::runtime::VirtualMachine;

use super::load_program;

pub fn run_file(
    path: &str,
    input: Option<&str>,
    trace: Option<&str>,
    config: &Config,
) -> Result<()> {
    let program = load_program(path, config)?;
    let mut vm = VirtualMachine::new(config.vm.clone());

    let mut input: Box<dyn BufRead> = match input {
        Some(input_path) => {
            let file = File::open(input_path)
                .with_context(|| format!("Failed to open input '{}'", input_path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };
    let mut output = io::stdout().lock();

    let result = match trace {
        Some(trace_path) => {
            let file = File::create(trace_path)
                .with_context(|| format!("Failed to create trace '{}'", trace_path))?;
            let mut trace_out = BufWriter::new(file);

            write_listing(&mut trace_out, &program)?;
            writeln!(trace_out)?;
            let result = vm.run_traced(program, &mut input, &mut output, &mut trace_out);
            trace_out.flush()?;
            result
        }
        None => vm.run(program, &mut input, &mut output),
    };

    output.flush()?;
    result.with_context(|| format!("Runtime error in '{}'", path))
}
