//! Built-in REPL flavors

pub mod calc;
pub mod shell;

use clap::ValueEnum;

/// Flavors selectable from the command line or config
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlavorKind {
    /// Arithmetic calculator
    Calc,
    /// `sh -c` command runner
    Shell,
}

impl FlavorKind {
    /// Parse a flavor name from the config file
    pub fn from_name(name: &str) -> anyhow::Result<Self> {
        <Self as ValueEnum>::from_str(name, true)
            .map_err(|_| anyhow::anyhow!("Unknown flavor '{}' (expected calc or shell)", name))
    }
}
