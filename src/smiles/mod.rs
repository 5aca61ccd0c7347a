mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use log::trace;

use crate::atom::Atom;
use crate::bond::{Bond, SmilesBond};
use crate::kekulize;
use crate::mol::Mol;
use crate::valence::{check_valence, normalize_nitro};
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles, write_smiles, SmilesWriteOptions};

/// Reads a SMILES string into a graph with bond orders as written.
///
/// Leading whitespace is skipped and anything after the next whitespace
/// run is a title, which is ignored.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, SmilesBond>, SmilesError> {
    let body = s
        .trim_start()
        .split(char::is_whitespace)
        .next()
        .unwrap_or_default();
    if body.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(body)?;
    trace!("tokenized {} tokens", tokens.len());
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}

/// Parses, kekulizes and valence-checks a SMILES string.
///
/// Neutral nitro groups are rewritten in charge-separated form before the
/// valence check. Explicit hydrogens stay as nodes and no aromaticity is
/// perceived; see [`crate::parse`] for the full pipeline.
pub fn from_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mol = parse_smiles(s)?;
    let mut mol = kekulize::kekulize(mol)?;
    let nitro = normalize_nitro(&mut mol);
    if nitro > 0 {
        trace!("charge-separated {nitro} nitro groups");
    }
    if let Err(errors) = check_valence(&mol) {
        if let Some(first) = errors.into_iter().next() {
            return Err(first.into());
        }
    }
    trace!("read {} atoms, {} bonds", mol.atom_count(), mol.bond_count());
    Ok(mol)
}
