use std::fs;
use std::path::Path;

use crate::error::NaleError;

/// Number of residues in the amino acid alphabet used for digitization,
/// plus one slot (index 20) for an ambiguous/"any" residue.
pub const NUM_AMINO: usize = 20;

const AMINO_ALPHABET: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Maps an ASCII residue letter to its digital alphabet index. Unknown
/// letters (ambiguity codes, gaps) digitize to `NUM_AMINO` ("any").
pub fn digitize_residue(residue: u8) -> u8 {
    let upper = residue.to_ascii_uppercase();
    AMINO_ALPHABET
        .iter()
        .position(|&c| c == upper)
        .map(|i| i as u8)
        .unwrap_or(NUM_AMINO as u8)
}

/// A digitized sequence: a name and an array of alphabet indices.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    pub name: String,
    pub length: usize,
    pub digital: Vec<u8>,
}

impl Sequence {
    /// Builds a digitized sequence directly from an already-digitized byte
    /// buffer, e.g. one lifted out of an MMseqs2 profile database's internal
    /// consensus-sequence layout.
    pub fn from_digital(digital: &[u8]) -> anyhow::Result<Sequence> {
        Ok(Sequence {
            name: String::new(),
            length: digital.len(),
            digital: digital.to_vec(),
        })
    }

    /// Digitizes an in-memory residue string (no name).
    pub fn from_utf8(residues: &[u8]) -> anyhow::Result<Sequence> {
        let digital: Vec<u8> = residues
            .iter()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|&b| digitize_residue(b))
            .collect();
        Ok(Sequence {
            name: String::new(),
            length: digital.len(),
            digital,
        })
    }

    /// Parses one or more `>name\n...` FASTA records, digitizing each
    /// against the amino acid alphabet.
    pub fn amino_from_fasta(path: &Path) -> anyhow::Result<Vec<Sequence>> {
        let text = fs::read_to_string(path)
            .map_err(|e| NaleError::SequenceParse(format!("{}: {e}", path.to_string_lossy())))?;

        let mut sequences = Vec::new();
        let mut name: Option<String> = None;
        let mut residues: Vec<u8> = Vec::new();

        for line in text.lines() {
            if let Some(rest) = line.strip_prefix('>') {
                if let Some(prev_name) = name.take() {
                    sequences.push(Sequence {
                        name: prev_name,
                        length: residues.len(),
                        digital: std::mem::take(&mut residues),
                    });
                }
                name = Some(rest.split_whitespace().next().unwrap_or("").to_string());
            } else {
                residues.extend(line.trim().bytes().map(digitize_residue));
            }
        }

        if let Some(final_name) = name {
            sequences.push(Sequence {
                name: final_name,
                length: residues.len(),
                digital: residues,
            });
        }

        if sequences.is_empty() {
            return Err(NaleError::SequenceParse(format!(
                "no FASTA records found in {}",
                path.to_string_lossy()
            ))
            .into());
        }

        Ok(sequences)
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digitizes_known_residues() {
        assert_eq!(digitize_residue(b'A'), 0);
        assert_eq!(digitize_residue(b'a'), 0);
        assert_eq!(digitize_residue(b'Y'), 19);
        assert_eq!(digitize_residue(b'X'), NUM_AMINO as u8);
        assert_eq!(digitize_residue(b'-'), NUM_AMINO as u8);
    }

    #[test]
    fn from_utf8_strips_whitespace() {
        let seq = Sequence::from_utf8(b"AC DE\nFG").unwrap();
        assert_eq!(seq.length, 6);
        assert_eq!(seq.digital, vec![0, 1, 2, 3, 4, 5]);
    }
}
