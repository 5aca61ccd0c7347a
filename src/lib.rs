pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod canonical;
pub mod chirality;
pub mod cli;
pub mod element;
pub mod graph_ops;
pub mod hydrogen;
pub mod kekulize;
pub mod mol;
pub mod rings;
pub mod smiles;
pub mod traits;
pub mod valence;

use log::{debug, trace};

pub use aromaticity::{perceive, set_aromaticity, Aromaticity};
pub use atom::Atom;
pub use bond::{Bond, BondOrder, SmilesBond, SmilesBondOrder};
pub use canonical::{canonical_ordering, symmetry_classes};
pub use chirality::cleanup_stereo;
pub use element::Element;
pub use graph_ops::{connected_components, renumber_atoms, RenumberError};
pub use hydrogen::remove_hs;
pub use kekulize::{kekulize, KekulizeError};
pub use mol::{AtomId, DoubleBondConfig, DoubleBondStereo, Mol, TetrahedralStereo};
pub use rings::RingInfo;
pub use smiles::{
    from_smiles, parse_smiles, to_canonical_smiles, to_smiles, write_smiles, SmilesError,
    SmilesWriteOptions,
};
pub use traits::{
    HasAromaticity, HasAtomClass, HasAtomicNum, HasBondAromaticity, HasBondOrder,
    HasFormalCharge, HasHydrogenCount, HasIsotope,
};
pub use valence::{check_valence, ValenceError};

/// Reads a SMILES string into a molecule ready for writing.
///
/// Explicit hydrogens are folded into their neighbours, aromaticity is
/// perceived from the Kekulé structure and stereo marks that do not
/// describe a real stereo element are dropped.
pub fn parse(input: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let mol = from_smiles(input)?;
    let mut mol = remove_hs(&mol);
    set_aromaticity(&mut mol);
    cleanup_stereo(&mut mol);
    trace!(
        "parsed {} atoms, {} stereocenters, {} stereo double bonds",
        mol.atom_count(),
        mol.tetrahedral_stereo().len(),
        mol.double_bond_stereo().len()
    );
    Ok(mol)
}

/// Writes `mol` as isomeric SMILES, in canonical order if `canonical`.
pub fn serialize(mol: &Mol<Atom, Bond>, canonical: bool) -> String {
    write_smiles(
        mol,
        &SmilesWriteOptions {
            canonical,
            isomeric: true,
        },
    )
}

/// The canonical SMILES of `input`, or an empty string if it does not parse.
///
/// ```
/// assert_eq!(smilescanon::canonical_smiles("OCC"), "CCO");
/// assert_eq!(smilescanon::canonical_smiles("C1=CC=CC=C1"), "c1ccccc1");
/// assert_eq!(smilescanon::canonical_smiles("notasmiles((("), "");
/// ```
pub fn canonical_smiles(input: &str) -> String {
    match parse(input) {
        Ok(mol) => serialize(&mol, true),
        Err(e) => {
            debug!("rejected {input:?}: {e}");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests;
