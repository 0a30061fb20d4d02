use crate::pvalue::{evalue, exp_logsurv};
use crate::structs::profile::Profile;
use crate::structs::sequence::Sequence;
use crate::structs::trace::{AlignState, Trace};

const NAT_TO_BIT: f32 = std::f32::consts::LN_2;

/// The three score terms [`Alignment::from_trace`] combines into a final bit
/// score, threaded through the pipeline so each stage can fill in its piece
/// without the others needing to know the DP matrices that produced it.
#[derive(Debug, Clone, Copy)]
pub struct ScoreParams {
    pub num_targets: usize,
    pub forward_score_nats: f32,
    pub null_score_nats: f32,
    pub bias_correction_score_nats: f32,
}

impl ScoreParams {
    pub fn new(num_targets: usize) -> ScoreParams {
        ScoreParams {
            num_targets,
            forward_score_nats: f32::NEG_INFINITY,
            null_score_nats: 0.0,
            bias_correction_score_nats: 0.0,
        }
    }
}

/// One scored (query, target) result: the raw nat score decomposition, the
/// derived bit score, and the statistical significance of the hit.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub target_name: String,
    pub query_name: String,
    pub query_length: usize,
    pub target_length: usize,
    pub nat_sc: f32,
    pub null_sc: f32,
    pub seq_bias: f32,
    pub pre_sc: f32,
    pub seq_sc: f32,
    pub ln_pval: f32,
    pub pvalue: f64,
    pub evalue: f64,
    pub alignment_string: Option<String>,
}

impl Alignment {
    pub fn from_trace(
        trace: &Trace,
        profile: &Profile,
        target: &Sequence,
        score_params: ScoreParams,
    ) -> Alignment {
        let nat_sc = score_params.forward_score_nats;
        let null_sc = score_params.null_score_nats;
        let seq_bias = score_params.bias_correction_score_nats;

        let pre_sc = (nat_sc - null_sc) / NAT_TO_BIT;
        let seq_sc = (nat_sc - null_sc - seq_bias) / NAT_TO_BIT;

        let ln_pval = exp_logsurv(seq_sc, profile.tau, profile.lambda);
        let pvalue = (ln_pval as f64).exp();
        let evalue = evalue(pvalue, score_params.num_targets);

        Alignment {
            target_name: target.name.clone(),
            query_name: profile.name.clone(),
            query_length: target.length,
            target_length: profile.length,
            nat_sc,
            null_sc,
            seq_bias,
            pre_sc,
            seq_sc,
            ln_pval,
            pvalue,
            evalue,
            alignment_string: render_trace(trace),
        }
    }

    /// Tab-separated rendering matching the output record of §6: query,
    /// target, Q, T, then the score decomposition and significance.
    pub fn tab_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.4}\t{:.6}\t{:.3e}\t{:.3e}",
            self.query_name,
            self.target_name,
            self.query_length,
            self.target_length,
            self.nat_sc,
            self.null_sc,
            self.seq_bias,
            self.pre_sc,
            self.seq_sc,
            self.ln_pval,
            self.pvalue,
            self.evalue,
        )
    }
}

fn render_trace(trace: &Trace) -> Option<String> {
    if trace.is_empty() {
        return None;
    }
    let mut out = String::with_capacity(trace.steps.len());
    for step in &trace.steps {
        out.push(match step.state {
            AlignState::M => 'M',
            AlignState::I => 'I',
            AlignState::D => 'D',
            AlignState::N => 'N',
            AlignState::C => 'C',
            AlignState::J => 'J',
            AlignState::B => 'B',
            AlignState::E => 'E',
            AlignState::S => 'S',
            AlignState::T => 'T',
        });
    }
    Some(out)
}
