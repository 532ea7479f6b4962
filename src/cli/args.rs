//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--timeout <SECS>`: Abort the command after this many seconds

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pmod - Module and configuration tooling for protobuf schema modules
#[derive(Parser, Debug)]
#[command(name = "pmod")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Abort the command after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write an initial module configuration file
    #[command(
        name = "init",
        long_about = "Write an initial buf.mod configuration file.\n\n\
            The file is written to the module directory, which is created if \
            needed. Dependencies can only be declared for a named module.",
        after_help = "\
EXAMPLES:
    # Minimal configuration in the current directory
    pmod init

    # Named module with a dependency, documented
    pmod init --name example.com/acme/widgets --dep example.com/acme/base --doc

    # Documented, with every optional field uncommented
    pmod init --doc --uncomment"
    )]
    Init {
        /// Module directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Module name, remote/owner/repository
        #[arg(long, value_name = "IDENTITY")]
        name: Option<String>,

        /// Dependency, remote/owner/repository[:reference] (repeatable)
        #[arg(long = "dep", value_name = "REFERENCE")]
        deps: Vec<String>,

        /// Document every field with a comment
        #[arg(long)]
        doc: bool,

        /// Uncomment optional fields (requires --doc)
        #[arg(long)]
        uncomment: bool,

        /// Configuration file version to write
        #[arg(long, value_name = "VERSION")]
        config_version: Option<String>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Print the resolved module configuration
    #[command(
        name = "config",
        after_help = "\
EXAMPLES:
    # Configuration of the module in the current directory
    pmod config

    # Use a configuration file instead
    pmod config --config ci/buf.yaml

    # Inline configuration
    pmod config --config 'version: v1'"
    )]
    Config {
        /// Module directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Configuration file (.json, .yaml, .yml) or inline data
        #[arg(long = "config", value_name = "OVERRIDE")]
        override_config: Option<String>,
    },

    /// List the module's source files
    #[command(name = "ls-files")]
    LsFiles {
        /// Module directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// List the module's pinned dependencies
    #[command(name = "deps")]
    Deps {
        /// Module directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },

    /// Write the module as a payload file
    #[command(
        name = "pack",
        after_help = "\
EXAMPLES:
    pmod pack --output widgets.json
    pmod inspect widgets.json"
    )]
    Pack {
        /// Module directory
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Payload file to write
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Build a module from a payload file and describe it
    #[command(name = "inspect")]
    Inspect {
        /// Payload file
        file: PathBuf,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    # Bash
    pmod completion bash > /etc/bash_completion.d/pmod

    # Zsh
    pmod completion zsh > \"${fpath[1]}/_pmod\""
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
