/// Default atom type for a molecular graph node.
///
/// `Atom` stores intrinsic atomic properties, the things you would read off
/// a structural formula. Stereochemistry is not stored here: it lives on the
/// [`Mol`](crate::Mol) as [`TetrahedralStereo`](crate::TetrahedralStereo)
/// records, because it is a relation between an atom and its neighbours.
///
/// # Examples
///
/// ```
/// use smilescanon::Atom;
///
/// let carbon = Atom {
///     atomic_num: 6,
///     formal_charge: 0,
///     isotope: 0,
///     hydrogen_count: 3,
///     is_aromatic: false,
///     atom_class: 0,
/// };
/// assert_eq!(carbon.atomic_num, 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, 7 = N, …). Identifies the element.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Number of implicit hydrogens on this atom.
    ///
    /// These are not graph nodes. After SMILES parsing this count is the
    /// single source of truth for how many Hs the atom carries.
    pub hydrogen_count: u8,
    /// Whether this atom belongs to an aromatic ring.
    pub is_aromatic: bool,
    /// Atom class (`[CH3:7]`), `0` when absent.
    pub atom_class: u16,
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

impl crate::traits::HasAtomClass for Atom {
    fn atom_class(&self) -> u16 {
        self.atom_class
    }
}
