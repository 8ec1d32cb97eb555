use crate::providers::CandidateSource;
use crate::types::Candidate;

/// Fixed candidate list, typically from the runtime config.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates {
    candidates: Vec<Candidate>,
}

impl StaticCandidates {
    /// Symbols are upper-cased; blank symbols are dropped. An empty name falls
    /// back to the symbol.
    pub fn new(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        let candidates = candidates
            .into_iter()
            .filter_map(|c| {
                let symbol = c.symbol.trim().to_uppercase();
                if symbol.is_empty() {
                    return None;
                }
                let name = if c.name.trim().is_empty() {
                    symbol.clone()
                } else {
                    c.name.trim().to_string()
                };
                Some(Candidate::new(symbol, name))
            })
            .collect();
        Self { candidates }
    }
}

impl CandidateSource for StaticCandidates {
    fn list(&self) -> Vec<Candidate> {
        self.candidates.clone()
    }
}
