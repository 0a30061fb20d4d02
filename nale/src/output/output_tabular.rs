//! Tabular result output (C10, ambient): the `align`/`search` subcommands'
//! final report, one line per (query, target) pair that clears the
//! E-value cutoff.

use std::io::{self, Write};

use crate::structs::Alignment;

/// Column header for [`write_alignment`]'s tab-separated record, matching
/// the field order of [`Alignment::tab_string`].
pub const HEADER: &str = "query\ttarget\tQ\tT\tnat_sc\tnull_sc\tseq_bias\tpre_sc\tseq_sc\tln_pval\tpvalue\tevalue";

pub fn write_header(writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer, "{HEADER}")
}

/// Writes one result line if `alignment`'s E-value clears `evalue_cutoff`;
/// a no-op otherwise. Returns whether a line was written.
pub fn write_alignment(
    writer: &mut impl Write,
    alignment: &Alignment,
    evalue_cutoff: f64,
) -> io::Result<bool> {
    if alignment.evalue > evalue_cutoff {
        return Ok(false);
    }
    writeln!(writer, "{}", alignment.tab_string())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::alignment::ScoreParams;
    use crate::structs::hmm::{HmmFile, NUM_TRANS_STATES};
    use crate::structs::profile::Profile;
    use crate::structs::sequence::{Sequence, NUM_AMINO};
    use crate::structs::trace::Trace;

    fn tiny_profile() -> Profile {
        let hmm = HmmFile {
            name: "tiny".into(),
            accession: "T01".into(),
            length: 1,
            is_local: true,
            match_scores: vec![[0.0; NUM_AMINO]; 2],
            insert_scores: vec![[0.0; NUM_AMINO]; 2],
            trans_scores: vec![[0.0; NUM_TRANS_STATES]; 2],
            compo: [0.05; NUM_AMINO],
            consensus_sequence: vec![0, b'A'],
            tau: -3.0,
            lambda: 0.7,
        };
        Profile::new(&hmm)
    }

    #[test]
    fn below_cutoff_is_written_above_is_not() {
        let profile = tiny_profile();
        let target = Sequence::from_utf8(b"A").unwrap();
        let trace = Trace::new(target.length, profile.length);

        let mut low = ScoreParams::new(1);
        low.forward_score_nats = 100.0;
        let alignment_low_evalue = Alignment::from_trace(&trace, &profile, &target, low);

        let mut buf = Vec::new();
        let wrote = write_alignment(&mut buf, &alignment_low_evalue, 1e10).unwrap();
        assert!(wrote);
        assert!(!buf.is_empty());

        let mut buf2 = Vec::new();
        let wrote2 = write_alignment(&mut buf2, &alignment_low_evalue, -1.0).unwrap();
        assert!(!wrote2);
        assert!(buf2.is_empty());
    }
}
