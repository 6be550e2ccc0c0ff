use crate::models::{Applicant, CandidatePair, Program};

/// Build the full applicant x program cross-product.
///
/// This is the universe every later stage narrows; no filtering happens
/// here. Empty input on either side yields an empty set, not an error.
/// Pairs come out ordered by (applicant id, program id).
pub fn build_candidate_pairs(applicants: &[Applicant], programs: &[Program]) -> Vec<CandidatePair> {
    let mut pairs = Vec::with_capacity(applicants.len() * programs.len());
    for applicant in applicants {
        for program in programs {
            pairs.push(CandidatePair {
                applicant_id: applicant.id,
                program_id: program.id,
            });
        }
    }
    pairs
}
