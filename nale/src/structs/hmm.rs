//! Parsing for the subset of the HMMER3/f ASCII profile format this system
//! needs: header metadata, background composition, per-node match/insert
//! emission and transition score lines, and the Forward-score calibration
//! line. Exhaustive coverage of every optional header HMMER emits is out of
//! scope; unrecognized header lines are skipped.

use std::fs;

use crate::error::NaleError;
use crate::structs::sequence::NUM_AMINO;

pub const NUM_TRANS_STATES: usize = 7;

/// A freshly parsed HMM record, close to the file's own layout. `Profile`
/// (see [`crate::structs::profile`]) wraps this into the runtime scoring
/// structure the DP core reads from.
#[derive(Debug, Clone)]
pub struct HmmFile {
    pub name: String,
    pub accession: String,
    pub length: usize,
    pub is_local: bool,
    /// Index 0 is an unused sentinel; match/insert/transition data for node
    /// `k` live at index `k`, for `k` in `1..=length`.
    pub match_scores: Vec<[f32; NUM_AMINO]>,
    pub insert_scores: Vec<[f32; NUM_AMINO]>,
    /// `[M2M, M2I, M2D, I2M, I2I, D2M, D2D]` per node.
    pub trans_scores: Vec<[f32; NUM_TRANS_STATES]>,
    pub compo: [f32; NUM_AMINO],
    /// Digitized consensus sequence, 1-indexed (index 0 is a sentinel byte).
    pub consensus_sequence: Vec<u8>,
    pub tau: f32,
    pub lambda: f32,
}

fn parse_score_field(tok: &str) -> anyhow::Result<f32> {
    if tok == "*" {
        Ok(f32::NEG_INFINITY)
    } else {
        tok.parse::<f32>()
            .map_err(|e| NaleError::ProfileParse(format!("bad score token {tok:?}: {e}")).into())
    }
}

fn parse_score_row<const N: usize>(line: &str) -> anyhow::Result<[f32; N]> {
    let mut out = [0f32; N];
    let mut tokens = line.split_whitespace();
    for slot in out.iter_mut() {
        let tok = tokens
            .next()
            .ok_or_else(|| NaleError::ProfileParse(format!("short score row: {line:?}")))?;
        *slot = parse_score_field(tok)?;
    }
    Ok(out)
}

/// Parses every `HMMER3/f ... // ... // ...` record in `path`.
pub fn parse_hmms_from_p7hmm_file(path: &str) -> anyhow::Result<Vec<HmmFile>> {
    let text = fs::read_to_string(path)
        .map_err(|e| NaleError::ProfileParse(format!("failed to read {path}: {e}")))?;

    let mut profiles = Vec::new();
    let mut lines = text.lines().peekable();

    while let Some(&first) = lines.peek() {
        if first.trim().is_empty() {
            lines.next();
            continue;
        }
        profiles.push(parse_one_record(&mut lines)?);
    }

    Ok(profiles)
}

fn parse_one_record<'a, I>(lines: &mut std::iter::Peekable<I>) -> anyhow::Result<HmmFile>
where
    I: Iterator<Item = &'a str>,
{
    let mut name = String::new();
    let mut accession = String::new();
    let mut length = 0usize;
    let mut is_local = true;
    let mut tau = 0f32;
    let mut lambda = 0f32;
    let mut compo = [0f32; NUM_AMINO];

    // header lines, up to the "HMM" column-label line
    loop {
        let line = lines
            .next()
            .ok_or_else(|| NaleError::ProfileParse("unexpected end of file in header".into()))?;
        let mut fields = line.split_whitespace();
        let Some(tag) = fields.next() else { continue };

        match tag {
            "NAME" => name = fields.collect::<Vec<_>>().join(" "),
            "ACC" => accession = fields.collect::<Vec<_>>().join(" "),
            "LENG" => {
                length = fields
                    .next()
                    .ok_or_else(|| NaleError::ProfileParse("LENG missing value".into()))?
                    .parse()?
            }
            "STATS" => {
                let rest: Vec<&str> = fields.collect();
                if rest.first() == Some(&"LOCAL") && rest.get(1) == Some(&"FORWARD") {
                    tau = rest
                        .get(2)
                        .ok_or_else(|| NaleError::ProfileParse("STATS missing tau".into()))?
                        .parse()?;
                    lambda = rest
                        .get(3)
                        .ok_or_else(|| NaleError::ProfileParse("STATS missing lambda".into()))?
                        .parse()?;
                }
            }
            "HMM" => break,
            _ => {}
        }
    }

    // the two label lines following "HMM ...": transition-label row
    lines.next();

    let mut match_scores = vec![[0f32; NUM_AMINO]; length + 1];
    let mut insert_scores = vec![[0f32; NUM_AMINO]; length + 1];
    let mut trans_scores = vec![[0f32; NUM_TRANS_STATES]; length + 1];
    let mut consensus_sequence = vec![0u8; length + 1];

    // COMPO block: match-like composition line, insert line, transition line
    let compo_line = lines
        .next()
        .ok_or_else(|| NaleError::ProfileParse("missing COMPO line".into()))?;
    let mut compo_fields = compo_line.split_whitespace();
    if compo_fields.next() != Some("COMPO") {
        return Err(NaleError::ProfileParse("expected COMPO line".into()).into());
    }
    let rest: Vec<&str> = compo_fields.collect();
    for (slot, tok) in compo.iter_mut().zip(rest.iter()) {
        *slot = parse_score_field(tok)?;
    }
    lines.next(); // background insert-emission line (uniform, unused)
    lines.next(); // background transition line (unused)

    loop {
        let Some(line) = lines.next() else {
            return Err(NaleError::ProfileParse("unexpected end of file in node block".into())
                .into());
        };
        if line.trim() == "//" {
            break;
        }

        let mut tokens = line.split_whitespace();
        let node_idx: usize = tokens
            .next()
            .ok_or_else(|| NaleError::ProfileParse("missing node index".into()))?
            .parse()?;
        let rest_of_line: Vec<&str> = tokens.collect();
        let mut match_row = [0f32; NUM_AMINO];
        for (slot, tok) in match_row.iter_mut().zip(rest_of_line.iter()) {
            *slot = parse_score_field(tok)?;
        }
        match_scores[node_idx] = match_row;
        if let Some(consensus_tok) = rest_of_line.get(NUM_AMINO) {
            consensus_sequence[node_idx] = consensus_tok.bytes().next().unwrap_or(b'X');
        }

        let insert_line = lines
            .next()
            .ok_or_else(|| NaleError::ProfileParse("missing insert score line".into()))?;
        insert_scores[node_idx] = parse_score_row::<NUM_AMINO>(insert_line)?;

        let trans_line = lines
            .next()
            .ok_or_else(|| NaleError::ProfileParse("missing transition score line".into()))?;
        trans_scores[node_idx] = parse_score_row::<NUM_TRANS_STATES>(trans_line)?;
    }

    Ok(HmmFile {
        name,
        accession,
        length,
        is_local,
        match_scores,
        insert_scores,
        trans_scores,
        compo,
        consensus_sequence,
        tau,
        lambda,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = "HMMER3/f [3.3.2]\n\
NAME  tiny\n\
ACC   TINY01\n\
LENG  2\n\
ALPH  amino\n\
STATS LOCAL VITERBI  -9.0 0.3\n\
STATS LOCAL FORWARD  -3.0 0.71\n\
HMM          A        C        D        E        F        G        H        I        K        L        M        N        P        Q        R        S        T        V        W        Y\n\
            m->m     m->i     m->d     i->m     i->i     d->m     d->d\n\
  COMPO   2.1 2.2 2.3 2.4 2.5 2.6 2.7 2.8 2.9 3.0 3.1 3.2 3.3 3.4 3.5 3.6 3.7 3.8 3.9 4.0\n\
          0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1\n\
          0.1 0.1 0.1 0.1 0.1 0.1 0.1\n\
  1       0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 0.9 1.0 1.1 1.2 1.3 1.4 1.5 1.6 1.7 1.8 1.9 2.0 A   -\n\
          0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1\n\
          0.1 0.1 0.1 0.1 0.1 0.1 0.1\n\
  2       0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 0.9 1.0 1.1 1.2 1.3 1.4 1.5 1.6 1.7 1.8 1.9 2.0 C   -\n\
          0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1 0.1\n\
          0.1 0.1 0.1 0.1 * 0.1 0.1\n\
//\n";

    #[test]
    fn parses_small_fixture() {
        let dir = std::env::temp_dir();
        let path = dir.join("nale_hmm_fixture_test.hmm");
        std::fs::write(&path, FIXTURE).unwrap();

        let hmms = parse_hmms_from_p7hmm_file(path.to_str().unwrap()).unwrap();
        assert_eq!(hmms.len(), 1);
        let hmm = &hmms[0];
        assert_eq!(hmm.name, "tiny");
        assert_eq!(hmm.length, 2);
        assert_eq!(hmm.match_scores[1][0], 0.1);
        assert_eq!(hmm.match_scores[2][19], 2.0);
        assert_eq!(hmm.trans_scores[2][4], f32::NEG_INFINITY);
        assert!((hmm.tau - -3.0).abs() < 1e-6);
        assert!((hmm.lambda - 0.71).abs() < 1e-6);

        std::fs::remove_file(&path).ok();
    }
}
