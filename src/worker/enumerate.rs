//! Candidate Enumeration
//!
//! A candidate of length `L` is a mixed-radix numeral written most
//! significant digit first. Position 0 draws from the `leading` character
//! set, positions `1..L` from the `rest` set. With both sets equal this is
//! the plain base-K numeral over one portion.
//!
//! `candidate_at` and `index_of` are inverse bijections between
//! `0..size()` and the strings of the keyspace. Keyspaces too large for a
//! `u128` index are walked with an odometer over digit vectors instead.

use serde::{Deserialize, Serialize};

/// How a worker's portion shapes its keyspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum KeyspaceMode {
    /// Every position ranges over the portion. Passwords mixing characters
    /// from two portions are unreachable.
    PortionOnly,
    /// The portion fixes the leading character, the rest of the positions
    /// range over the full alphabet. Disjoint portions tile the keyspace.
    #[default]
    LeadingCharacter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    leading: Vec<char>,
    rest: Vec<char>,
    length: usize,
}

impl Keyspace {
    /// All strings of `length` characters over `charset`.
    pub fn uniform(charset: &str, length: usize) -> Self {
        let chars: Vec<char> = charset.chars().collect();
        Self {
            leading: chars.clone(),
            rest: chars,
            length,
        }
    }

    /// Strings starting with a character of `leading`, continuing over `rest`.
    pub fn with_leading(leading: &str, rest: &str, length: usize) -> Self {
        Self {
            leading: leading.chars().collect(),
            rest: rest.chars().collect(),
            length,
        }
    }

    /// Keyspace for a worker owning `portion` of `alphabet`.
    pub fn for_portion(portion: &str, alphabet: Option<&str>, length: usize) -> Self {
        match alphabet {
            Some(alphabet) => Self::with_leading(portion, alphabet, length),
            None => Self::uniform(portion, length),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    fn radix(&self, position: usize) -> usize {
        if position == 0 {
            self.leading.len()
        } else {
            self.rest.len()
        }
    }

    fn charset(&self, position: usize) -> &[char] {
        if position == 0 {
            &self.leading
        } else {
            &self.rest
        }
    }

    /// True when some position has no character to draw from.
    fn has_empty_position(&self) -> bool {
        self.length > 0 && (self.leading.is_empty() || (self.length > 1 && self.rest.is_empty()))
    }

    /// Number of candidates, or `None` if it does not fit in a `u128`.
    pub fn size(&self) -> Option<u128> {
        if self.has_empty_position() {
            return Some(0);
        }
        (0..self.length).try_fold(1u128, |acc, position| {
            acc.checked_mul(self.radix(position) as u128)
        })
    }

    /// The `index`-th candidate, or `None` when `index >= size()`.
    pub fn candidate_at(&self, mut index: u128) -> Option<String> {
        let mut digits = vec!['\0'; self.length];
        for position in (0..self.length).rev() {
            let radix = self.radix(position) as u128;
            if radix == 0 {
                return None;
            }
            digits[position] = self.charset(position)[(index % radix) as usize];
            index /= radix;
        }

        if index != 0 {
            return None;
        }
        Some(digits.into_iter().collect())
    }

    /// Inverse of `candidate_at`.
    pub fn index_of(&self, candidate: &str) -> Option<u128> {
        let chars: Vec<char> = candidate.chars().collect();
        if chars.len() != self.length {
            return None;
        }

        chars
            .iter()
            .enumerate()
            .try_fold(0u128, |acc, (position, c)| {
                let digit = self.charset(position).iter().position(|x| x == c)?;
                acc.checked_mul(self.radix(position) as u128)?
                    .checked_add(digit as u128)
            })
    }

    /// Iterates every candidate in index order.
    pub fn candidates(&self) -> Candidates<'_> {
        let exhausted = self.has_empty_position();
        match self.size() {
            Some(size) => Candidates::Indexed {
                keyspace: self,
                next: 0,
                size: if exhausted { 0 } else { size },
            },
            None => Candidates::Odometer {
                keyspace: self,
                digits: vec![0; self.length],
                done: exhausted,
            },
        }
    }
}

/// `index_to_combination` over a single charset.
pub fn index_to_combination(index: u128, charset: &str, length: usize) -> Option<String> {
    Keyspace::uniform(charset, length).candidate_at(index)
}

/// `combination_to_index` over a single charset.
pub fn combination_to_index(candidate: &str, charset: &str) -> Option<u128> {
    Keyspace::uniform(charset, candidate.chars().count()).index_of(candidate)
}

pub enum Candidates<'a> {
    Indexed {
        keyspace: &'a Keyspace,
        next: u128,
        size: u128,
    },
    /// Arbitrary-precision counter: one digit per position, incremented
    /// from the least significant end.
    Odometer {
        keyspace: &'a Keyspace,
        digits: Vec<usize>,
        done: bool,
    },
}

impl Iterator for Candidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match self {
            Candidates::Indexed {
                keyspace,
                next,
                size,
            } => {
                if *next >= *size {
                    return None;
                }
                let candidate = keyspace.candidate_at(*next);
                *next += 1;
                candidate
            }
            Candidates::Odometer {
                keyspace,
                digits,
                done,
            } => {
                if *done {
                    return None;
                }

                let candidate: String = digits
                    .iter()
                    .enumerate()
                    .map(|(position, &d)| keyspace.charset(position)[d])
                    .collect();

                // Carry from the least significant position
                let mut position = digits.len();
                loop {
                    if position == 0 {
                        *done = true;
                        break;
                    }
                    position -= 1;
                    digits[position] += 1;
                    if digits[position] < keyspace.radix(position) {
                        break;
                    }
                    digits[position] = 0;
                }

                Some(candidate)
            }
        }
    }
}
