#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
}

impl BondOrder {
    pub fn valence_contribution(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

/// A bond with a concrete Kekulé order.
///
/// `is_aromatic` is set by aromaticity perception and never changes `order`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bond {
    pub order: BondOrder,
    pub is_aromatic: bool,
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasBondAromaticity for Bond {
    fn is_aromatic_bond(&self) -> bool {
        self.is_aromatic
    }
}

/// Bond order as written in SMILES, before kekulization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SmilesBondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
    #[default]
    Implicit,
}

impl SmilesBondOrder {
    /// Contribution to a reader's bond-order sum; aromatic and implicit bonds count one.
    pub fn valence_contribution(self) -> u8 {
        match self {
            SmilesBondOrder::Double => 2,
            SmilesBondOrder::Triple => 3,
            SmilesBondOrder::Single | SmilesBondOrder::Aromatic | SmilesBondOrder::Implicit => 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmilesBond {
    pub order: SmilesBondOrder,
}
