use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValenceError {
    pub atom_idx: NodeIndex,
    pub atomic_num: u8,
    pub formal_charge: i8,
    pub actual_valence: u8,
    pub allowed_valences: Vec<u8>,
}

impl std::fmt::Display for ValenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sym = Element::from_atomic_num(self.atomic_num)
            .map(|e| e.symbol())
            .unwrap_or("?");
        write!(
            f,
            "atom {} ({}, charge {}): valence {} exceeds {:?}",
            self.atom_idx.index(),
            sym,
            self.formal_charge,
            self.actual_valence,
            self.allowed_valences,
        )
    }
}

impl std::error::Error for ValenceError {}

/// Valences an atom may reach before it is rejected.
///
/// Stricter than [`Element::default_valences`] for nitrogen and the halogens:
/// pentavalent nitrogen must be written as a charge-separated form.
fn permitted_valences(elem: Element) -> &'static [u8] {
    match elem {
        Element::H | Element::F | Element::Cl | Element::Br => &[1],
        Element::Li | Element::Na | Element::K => &[1],
        Element::Be | Element::Mg | Element::Ca => &[2],
        Element::B | Element::Al => &[3],
        Element::C | Element::Si | Element::Ge => &[4],
        Element::N => &[3],
        Element::O => &[2],
        Element::P | Element::As => &[3, 5, 7],
        Element::S | Element::Se | Element::Te => &[2, 4, 6],
        Element::I => &[1, 3, 5],
        _ => &[],
    }
}

/// Permitted valences shifted to the isoelectronic element for charged atoms.
pub fn permitted_valences_with_charge(elem: Element, charge: i8) -> &'static [u8] {
    if charge == 0 {
        return permitted_valences(elem);
    }
    let shifted = elem.atomic_num() as i16 - charge as i16;
    u8::try_from(shifted)
        .ok()
        .and_then(Element::from_atomic_num)
        .map(permitted_valences)
        .unwrap_or(&[])
}

pub fn total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    A: HasHydrogenCount,
    B: HasBondOrder,
{
    let bond_sum: u8 = mol
        .bonds_of(atom)
        .map(|ei| mol.bond(ei).bond_order().valence_contribution())
        .fold(0u8, u8::saturating_add);
    bond_sum.saturating_add(mol.atom(atom).hydrogen_count())
}

/// Rewrites neutral pentavalent nitro groups, `N(=O)=O`, as
/// `[N+](=O)[O-]` so they pass [`check_valence`]. Returns the number of
/// groups rewritten.
///
/// Only terminal, neutral oxygens count. The second of them in neighbour
/// order takes the negative charge.
pub fn normalize_nitro(mol: &mut Mol<Atom, Bond>) -> usize {
    let mut rewritten = 0;
    let atoms: Vec<NodeIndex> = mol.atoms().collect();
    for n in atoms {
        let atom = mol.atom(n);
        if atom.atomic_num != 7
            || atom.formal_charge != 0
            || atom.is_aromatic
            || total_valence(mol, n) != 5
        {
            continue;
        }
        let oxo: Vec<(NodeIndex, EdgeIndex)> = mol
            .neighbor_bonds(n)
            .filter(|&(nb, e)| {
                let o = mol.atom(nb);
                o.atomic_num == 8
                    && o.formal_charge == 0
                    && mol.degree(nb) == 1
                    && mol.bond(e).order == BondOrder::Double
            })
            .collect();
        let Some(&(oxygen, edge)) = oxo.get(1) else {
            continue;
        };
        mol.atom_mut(n).formal_charge = 1;
        mol.atom_mut(oxygen).formal_charge = -1;
        mol.bond_mut(edge).order = BondOrder::Single;
        rewritten += 1;
    }
    rewritten
}

/// Reports every atom whose total valence exceeds the largest permitted one.
///
/// Elements without a valence table (most metals, noble gases) are never
/// rejected. Valences below the maximum are accepted as radicals.
pub fn check_valence<A, B>(mol: &Mol<A, B>) -> Result<(), Vec<ValenceError>>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let errors: Vec<ValenceError> = mol
        .atoms()
        .filter_map(|idx| {
            let atom = mol.atom(idx);
            let elem = Element::from_atomic_num(atom.atomic_num())?;
            let allowed = permitted_valences_with_charge(elem, atom.formal_charge());
            let max = *allowed.iter().max()?;
            let v = total_valence(mol, idx);
            if v <= max {
                return None;
            }
            Some(ValenceError {
                atom_idx: idx,
                atomic_num: atom.atomic_num(),
                formal_charge: atom.formal_charge(),
                actual_valence: v,
                allowed_valences: allowed.to_vec(),
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::smiles::{from_smiles, SmilesError};

    #[test]
    fn common_molecules_valid() {
        for smi in ["C", "CC", "c1ccccc1", "O", "N", "S(F)(F)(F)(F)(F)F", "[NH4+]", "[Fe]"] {
            let mol = from_smiles(smi).unwrap();
            assert!(check_valence(&mol).is_ok(), "{smi}");
        }
    }

    #[test]
    fn pentavalent_carbon_invalid() {
        let mut mol = Mol::<Atom, Bond>::new();
        let c = mol.add_atom(Atom {
            atomic_num: 6,
            hydrogen_count: 5,
            ..Default::default()
        });
        let errs = check_valence(&mol).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].atom_idx, c);
        assert_eq!(errs[0].actual_valence, 5);
        assert_eq!(errs[0].allowed_valences, vec![4]);
    }

    #[test]
    fn radical_carbon_accepted() {
        let mol = from_smiles("[CH3]").unwrap();
        assert!(check_valence(&mol).is_ok());
    }

    #[test]
    fn charged_valences_follow_isoelectronic_element() {
        assert_eq!(permitted_valences_with_charge(Element::N, 1), &[4]);
        assert_eq!(permitted_valences_with_charge(Element::O, 1), &[3]);
        assert_eq!(permitted_valences_with_charge(Element::C, -1), &[3]);
        assert_eq!(permitted_valences_with_charge(Element::Fe, 2), &[] as &[u8]);
    }

    #[test]
    fn neutral_nitro_charge_separated() {
        let mol = from_smiles("CN(=O)=O").unwrap();
        let mut charges: Vec<i8> = mol.atoms().map(|i| mol.atom(i).formal_charge).collect();
        assert_eq!(charges[1], 1);
        charges.sort_unstable();
        assert_eq!(charges, [-1, 0, 0, 1]);
        let doubles = mol
            .bonds()
            .filter(|&e| mol.bond(e).order == BondOrder::Double)
            .count();
        assert_eq!(doubles, 1);
        assert!(check_valence(&mol).is_ok());

        let mut aromatic = from_smiles("O=N(=O)c1ccccc1").unwrap();
        assert_eq!(normalize_nitro(&mut aromatic), 0);
        assert_eq!(aromatic.atom(NodeIndex::new(1)).formal_charge, 1);
    }

    #[test]
    fn other_pentavalent_nitrogen_rejected() {
        for smi in ["CN(=O)(=O)=O", "C=N(=O)O", "CN(C)(C)(C)C"] {
            assert!(matches!(from_smiles(smi), Err(SmilesError::Valence(_))), "{smi}");
        }
        assert!(from_smiles("C[N+](=O)[O-]").is_ok());
    }

    #[test]
    fn ethene_total_valence() {
        let mol = from_smiles("C=C").unwrap();
        for idx in mol.atoms() {
            assert_eq!(total_valence(&mol, idx), 4);
        }
    }
}
