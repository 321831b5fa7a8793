use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pl0")]
#[command(about = "PL/0 compiler and P-code virtual machine", long_about = None)]
pub struct Cli {
    /// TOML file with compiler and VM limits
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the token list of a source file
    Tokens {
        /// Path to the source file (.pl0)
        path: String,
        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },
    /// Compile a source file to P-code
    Compile {
        /// Input source file
        path: String,
        /// Output file (defaults to the input with a .pcode or .pcb extension)
        #[arg(short, long)]
        output: Option<String>,
        /// Write the compact binary format instead of text
        #[arg(long)]
        binary: bool,
        /// Print the code listing
        #[arg(long)]
        listing: bool,
        /// Print the symbol table
        #[arg(long)]
        symbols: bool,
    },
    /// Run a source file, text P-code (.pcode) or binary P-code (.pcb)
    Run {
        /// Path to the file
        path: String,
        /// Read program input from this file instead of stdin
        #[arg(long)]
        input: Option<String>,
        /// Write the code listing and an execution trace to this file
        #[arg(long)]
        trace: Option<String>,
    },
    /// Print the code listing of a source or P-code file
    #[command(name = "disasm")]
    Disassemble {
        /// Path to the file
        path: String,
    },
}
