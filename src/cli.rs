use std::ffi::OsString;
use std::io::{self, Write};

use clap::Parser;
use log::debug;

use crate::canonical_smiles;

/// `smilescanon [SMILES]`: prints the canonical form of the first argument.
///
/// There are no options. Every argument is data, even `--` or one that
/// starts with `-`, and anything after the first is ignored. Parse with
/// [`Cli::try_parse_literal`] so that holds.
#[derive(Parser, Debug)]
#[command(
    name = "smilescanon",
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[arg(
        value_name = "SMILES",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub args: Vec<String>,
}

impl Cli {
    /// Parses `args` (program name first), taking every later argument
    /// literally. A `--` is slipped in after the program name, so a `--`
    /// the user typed reaches [`Cli::args`] like any other value.
    pub fn try_parse_literal<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut args = args.into_iter().map(Into::into);
        let program: Option<OsString> = args.next();
        let argv = program
            .into_iter()
            .chain(std::iter::once(OsString::from("--")))
            .chain(args);
        Self::try_parse_from(argv)
    }

    /// The molecule to canonicalize, if one was given.
    pub fn smiles(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Runs the command line `args` (program name first) and writes exactly one
/// line to `out`.
///
/// Unreadable arguments and invalid SMILES both give an empty line.
pub fn run<I, T>(args: I, out: &mut impl Write) -> io::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let line = match Cli::try_parse_literal(args) {
        Ok(cli) => cli.smiles().map(canonical_smiles).unwrap_or_default(),
        Err(e) => {
            debug!("could not read arguments: {e}");
            String::new()
        }
    };
    writeln!(out, "{line}")
}
