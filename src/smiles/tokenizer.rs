use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken, usize),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    /// `None` for the `*` wildcard.
    pub element: Option<Element>,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u16,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChiralityToken {
    None,
    /// `@`: neighbours anticlockwise seen from the first one.
    CounterClockwise,
    /// `@@`
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    Up,
    Down,
}

impl BondToken {
    /// The same bond read from the other end.
    pub fn reversed(self) -> Self {
        match self {
            BondToken::Up => BondToken::Down,
            BondToken::Down => BondToken::Up,
            other => other,
        }
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '[' => {
                let (tok, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            'B' => {
                if chars.get(i + 1) == Some(&'r') {
                    tokens.push(Token::Atom(bare_atom(Some(Element::Br), false, i)));
                    i += 2;
                } else {
                    tokens.push(Token::Atom(bare_atom(Some(Element::B), false, i)));
                    i += 1;
                }
            }
            'C' => {
                if chars.get(i + 1) == Some(&'l') {
                    tokens.push(Token::Atom(bare_atom(Some(Element::Cl), false, i)));
                    i += 2;
                } else {
                    tokens.push(Token::Atom(bare_atom(Some(Element::C), false, i)));
                    i += 1;
                }
            }
            c @ ('N' | 'O' | 'P' | 'S' | 'F' | 'I') => {
                let element = match c {
                    'N' => Element::N,
                    'O' => Element::O,
                    'P' => Element::P,
                    'S' => Element::S,
                    'F' => Element::F,
                    _ => Element::I,
                };
                tokens.push(Token::Atom(bare_atom(Some(element), false, i)));
                i += 1;
            }
            c @ ('b' | 'c' | 'n' | 'o' | 'p' | 's') => {
                let element = match c {
                    'b' => Element::B,
                    'c' => Element::C,
                    'n' => Element::N,
                    'o' => Element::O,
                    'p' => Element::P,
                    _ => Element::S,
                };
                tokens.push(Token::Atom(bare_atom(Some(element), true, i)));
                i += 1;
            }
            '*' => {
                tokens.push(Token::Atom(bare_atom(None, false, i)));
                i += 1;
            }
            '-' => {
                tokens.push(Token::Bond(BondToken::Single, i));
                i += 1;
            }
            '=' => {
                tokens.push(Token::Bond(BondToken::Double, i));
                i += 1;
            }
            '#' => {
                tokens.push(Token::Bond(BondToken::Triple, i));
                i += 1;
            }
            ':' => {
                tokens.push(Token::Bond(BondToken::Aromatic, i));
                i += 1;
            }
            '/' => {
                tokens.push(Token::Bond(BondToken::Up, i));
                i += 1;
            }
            '\\' => {
                tokens.push(Token::Bond(BondToken::Down, i));
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                let (digit, next) = parse_percent_ring(&chars, i)?;
                let pending_bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond: pending_bond,
                    digit,
                    pos: i,
                });
                i = next;
            }
            d @ '0'..='9' => {
                let pending_bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond: pending_bond,
                    digit: (d as u16) - b'0' as u16,
                    pos: i,
                });
                i += 1;
            }
            ch => return Err(SmilesError::UnexpectedChar { pos: i, ch }),
        }
    }

    Ok(tokens)
}

fn bare_atom(element: Option<Element>, aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        chirality: ChiralityToken::None,
        hcount: None,
        charge: 0,
        atom_class: 0,
        is_bracket: false,
        pos,
    }
}

/// A bond symbol directly before a ring digit belongs to the ring bond.
/// Only claimed when an atom or another ring digit precedes it.
fn try_consume_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    let n = tokens.len();
    if n < 2 {
        return None;
    }
    let claimable = matches!(tokens[n - 1], Token::Bond(..))
        && matches!(tokens[n - 2], Token::Atom(_) | Token::RingClosure { .. });
    if !claimable {
        return None;
    }
    match tokens.pop() {
        Some(Token::Bond(b, _)) => Some(b),
        _ => None,
    }
}

/// `%nn` or `%(n...)`.
fn parse_percent_ring(chars: &[char], start: usize) -> Result<(u16, usize), SmilesError> {
    let bad = SmilesError::UnexpectedChar {
        pos: start,
        ch: '%',
    };
    let mut i = start + 1;
    if chars.get(i) == Some(&'(') {
        i += 1;
        let mut val: u16 = 0;
        let digits_start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            val = val
                .checked_mul(10)
                .and_then(|v| v.checked_add(chars[i] as u16 - b'0' as u16))
                .ok_or_else(|| bad.clone())?;
            i += 1;
        }
        if i == digits_start || chars.get(i) != Some(&')') {
            return Err(bad);
        }
        return Ok((val, i + 1));
    }
    if i + 1 >= chars.len() || !chars[i].is_ascii_digit() || !chars[i + 1].is_ascii_digit() {
        return Err(bad);
    }
    let d1 = (chars[i] as u16) - b'0' as u16;
    let d2 = (chars[i + 1] as u16) - b'0' as u16;
    Ok((d1 * 10 + d2, i + 2))
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1; // skip '['

    let isotope = parse_isotope(chars, &mut i, start)?;

    let (element, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;

    let chirality = parse_chirality(chars, &mut i)?;

    let hcount = parse_hcount(chars, &mut i);

    let charge = parse_charge(chars, &mut i, start)?;

    let atom_class = parse_atom_class(chars, &mut i, start)?;

    if i >= chars.len() || chars[i] != ']' {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    i += 1; // skip ']'

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope,
            chirality,
            hcount: Some(hcount.unwrap_or(0)),
            charge,
            atom_class,
            is_bracket: true,
            pos: start,
        },
        i,
    ))
}

fn parse_isotope(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<u16, SmilesError> {
    let mut val: u16 = 0;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add(chars[*i] as u16 - b'0' as u16))
            .ok_or(SmilesError::InvalidIsotope { pos: bracket_start })?;
        *i += 1;
    }
    Ok(val)
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(Option<Element>, bool), SmilesError> {
    if *i >= chars.len() {
        return Err(SmilesError::UnclosedBracket {
            pos: bracket_start,
        });
    }
    if chars[*i] == '*' {
        *i += 1;
        return Ok((None, false));
    }

    let aromatic_map: &[(&str, Element)] = &[
        ("se", Element::Se),
        ("te", Element::Te),
        ("as", Element::As),
        ("b", Element::B),
        ("c", Element::C),
        ("n", Element::N),
        ("o", Element::O),
        ("p", Element::P),
        ("s", Element::S),
    ];

    for &(pat, elem) in aromatic_map {
        let end = *i + pat.len();
        if end <= chars.len() && chars[*i..end].iter().copied().eq(pat.chars()) {
            *i = end;
            return Ok((Some(elem), true));
        }
    }

    // Two-char element first, then one-char.
    if *i + 1 < chars.len() && chars[*i].is_ascii_uppercase() && chars[*i + 1].is_ascii_lowercase()
    {
        let sym: String = chars[*i..=*i + 1].iter().collect();
        if let Some(e) = Element::from_symbol(&sym) {
            *i += 2;
            return Ok((Some(e), false));
        }
    }

    if chars[*i].is_ascii_uppercase() {
        let sym = chars[*i].to_string();
        if let Some(e) = Element::from_symbol(&sym) {
            *i += 1;
            return Ok((Some(e), false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: *i,
        text: chars.get(*i).map(|c| c.to_string()).unwrap_or_default(),
    })
}

fn parse_chirality(chars: &[char], i: &mut usize) -> Result<ChiralityToken, SmilesError> {
    if chars.get(*i) != Some(&'@') {
        return Ok(ChiralityToken::None);
    }
    let pos = *i;
    *i += 1;
    match chars.get(*i) {
        Some('@') => {
            *i += 1;
            Ok(ChiralityToken::Clockwise)
        }
        Some('T') if chars.get(*i + 1) == Some(&'H') => match chars.get(*i + 2) {
            Some('1') => {
                *i += 3;
                Ok(ChiralityToken::CounterClockwise)
            }
            Some('2') => {
                *i += 3;
                Ok(ChiralityToken::Clockwise)
            }
            _ => Err(SmilesError::UnsupportedChirality { pos }),
        },
        Some('A' | 'S' | 'T' | 'O') => Err(SmilesError::UnsupportedChirality { pos }),
        _ => Ok(ChiralityToken::CounterClockwise),
    }
}

fn parse_hcount(chars: &[char], i: &mut usize) -> Option<u8> {
    if *i < chars.len() && chars[*i] == 'H' {
        *i += 1;
        let mut count: u8 = 1;
        if *i < chars.len() && chars[*i].is_ascii_digit() {
            count = chars[*i] as u8 - b'0';
            *i += 1;
        }
        Some(count)
    } else {
        None
    }
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let symbol = chars[*i];
    *i += 1;

    if *i < chars.len() && chars[*i] == symbol {
        let mut count: i8 = 1;
        while *i < chars.len() && chars[*i] == symbol {
            count = count
                .checked_add(1)
                .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
            *i += 1;
        }
        return Ok(sign * count);
    }

    if *i < chars.len() && chars[*i].is_ascii_digit() {
        let mut val: i8 = 0;
        while *i < chars.len() && chars[*i].is_ascii_digit() {
            val = val
                .checked_mul(10)
                .and_then(|v| v.checked_add((chars[*i] as i8) - b'0' as i8))
                .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
            *i += 1;
        }
        return Ok(sign * val);
    }

    Ok(sign)
}

fn parse_atom_class(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<u16, SmilesError> {
    if chars.get(*i) != Some(&':') {
        return Ok(0);
    }
    *i += 1;
    let digits_start = *i;
    let mut val: u16 = 0;
    while *i < chars.len() && chars[*i].is_ascii_digit() {
        val = val
            .checked_mul(10)
            .and_then(|v| v.checked_add(chars[*i] as u16 - b'0' as u16))
            .ok_or(SmilesError::InvalidAtomClass { pos: bracket_start })?;
        *i += 1;
    }
    if *i == digits_start {
        return Err(SmilesError::InvalidAtomClass { pos: bracket_start });
    }
    Ok(val)
}
