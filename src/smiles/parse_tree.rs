use std::collections::HashMap;

use crate::element::Element;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, ChiralityToken, Token};

#[derive(Debug, Clone)]
pub struct ParseAtom {
    /// `None` for the `*` wildcard.
    pub element: Option<Element>,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u16,
    pub is_bracket: bool,
    /// Whether `neighbors[0]` is the atom written before this one.
    pub has_parent: bool,
    /// Neighbours in written order; ring bonds sit where their digit appears.
    pub neighbors: Vec<Neighbor>,
}

/// One side of a bond. `bond` is read from this atom toward `atom_idx`, so
/// directional marks are reversed on the far side.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub bond: Option<BondToken>,
    pub atom_idx: usize,
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
}

struct RingOpen {
    atom: usize,
    slot: usize,
    bond: Option<BondToken>,
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut atoms: Vec<ParseAtom> = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new(); // (branch atom, paren pos)
    let mut current: Option<usize> = None;
    let mut pending_bond: Option<(BondToken, usize)> = None;
    let mut ring_opens: HashMap<u16, RingOpen> = HashMap::new();

    for token in tokens {
        match token {
            Token::Atom(atom_tok) => {
                let idx = atoms.len();
                atoms.push(parse_atom_from_token(atom_tok));

                if let Some(cur) = current {
                    let bond = pending_bond.take().map(|(b, _)| b);
                    atoms[cur].neighbors.push(Neighbor {
                        bond,
                        atom_idx: idx,
                    });
                    atoms[idx].neighbors.push(Neighbor {
                        bond: bond.map(BondToken::reversed),
                        atom_idx: cur,
                    });
                    atoms[idx].has_parent = true;
                } else if let Some((_, pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos });
                }

                current = Some(idx);
            }
            Token::Bond(b, pos) => {
                if pending_bond.is_some() || current.is_none() {
                    return Err(SmilesError::DanglingBond { pos: *pos });
                }
                pending_bond = Some((*b, *pos));
            }
            Token::RingClosure { bond, digit, pos } => {
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;

                if let Some(open) = ring_opens.remove(digit) {
                    if open.atom == cur {
                        return Err(SmilesError::SelfBond { digit: *digit });
                    }
                    if atoms[cur].neighbors.iter().any(|n| n.atom_idx == open.atom) {
                        return Err(SmilesError::DuplicateBond { digit: *digit });
                    }

                    // Both sides expressed from the opening atom.
                    let from_close = bond.map(BondToken::reversed);
                    let ring_bond = match (open.bond, from_close) {
                        (None, None) => None,
                        (Some(b), None) | (None, Some(b)) => Some(b),
                        (Some(b1), Some(b2)) if b1 == b2 => Some(b1),
                        _ => return Err(SmilesError::RingBondConflict { digit: *digit }),
                    };

                    atoms[open.atom].neighbors[open.slot] = Neighbor {
                        bond: ring_bond,
                        atom_idx: cur,
                    };
                    atoms[cur].neighbors.push(Neighbor {
                        bond: ring_bond.map(BondToken::reversed),
                        atom_idx: open.atom,
                    });
                } else {
                    let slot = atoms[cur].neighbors.len();
                    // Reserved until the closing digit fills it in.
                    atoms[cur].neighbors.push(Neighbor {
                        bond: None,
                        atom_idx: cur,
                    });
                    ring_opens.insert(
                        *digit,
                        RingOpen {
                            atom: cur,
                            slot,
                            bond: *bond,
                        },
                    );
                }
            }
            Token::OpenParen(pos) => {
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                stack.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                if let Some((_, bond_pos)) = pending_bond {
                    return Err(SmilesError::DanglingBond { pos: bond_pos });
                }
                let (branch_atom, _) = stack.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(branch_atom);
            }
            Token::Dot(pos) => {
                if pending_bond.is_some() || current.is_none() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                if let Some(&(_, paren_pos)) = stack.last() {
                    return Err(SmilesError::UnmatchedParen { pos: paren_pos });
                }
                current = None;
            }
        }
    }

    if let Some((_, bond_pos)) = pending_bond {
        return Err(SmilesError::DanglingBond { pos: bond_pos });
    }

    if let Some(&(_, paren_pos)) = stack.last() {
        return Err(SmilesError::UnmatchedParen { pos: paren_pos });
    }

    if let Some(digit) = ring_opens.keys().min() {
        return Err(SmilesError::UnclosedRing { digit: *digit });
    }

    if atoms.is_empty() {
        return Err(SmilesError::EmptyInput);
    }

    Ok(ParseTree { atoms })
}

fn parse_atom_from_token(tok: &AtomToken) -> ParseAtom {
    ParseAtom {
        element: tok.element,
        is_aromatic: tok.is_aromatic,
        isotope: tok.isotope,
        chirality: tok.chirality,
        hcount: tok.hcount,
        charge: tok.charge,
        atom_class: tok.atom_class,
        is_bracket: tok.is_bracket,
        has_parent: false,
        neighbors: Vec::new(),
    }
}
