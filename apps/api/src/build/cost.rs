//! Build pricing: base + per-source surcharge + the highest length tier reached.

use serde::{Deserialize, Serialize};

use crate::extraction::BuildOptions;
use crate::sources::SourceType;

/// (minimum characters, surcharge), highest tier first.
const LENGTH_TIERS: [(usize, u32); 3] = [(20_000, 10), (10_000, 5), (5_000, 2)];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostTable {
    pub base: u32,
    pub pdf_surcharge: u32,
    pub doc_surcharge: u32,
    pub linkedin_surcharge: u32,
    pub text_surcharge: u32,
}

impl Default for CostTable {
    fn default() -> Self {
        Self {
            base: 10,
            pdf_surcharge: 5,
            doc_surcharge: 5,
            linkedin_surcharge: 3,
            text_surcharge: 0,
        }
    }
}

impl CostTable {
    pub fn surcharge(&self, source: SourceType) -> u32 {
        match source {
            SourceType::Text => self.text_surcharge,
            SourceType::Pdf => self.pdf_surcharge,
            SourceType::Doc => self.doc_surcharge,
            SourceType::LinkedIn => self.linkedin_surcharge,
        }
    }
}

fn length_surcharge(text_length: usize) -> u32 {
    LENGTH_TIERS
        .iter()
        .find(|(min, _)| text_length > *min)
        .map(|(_, surcharge)| *surcharge)
        .unwrap_or(0)
}

/// Deterministic price of one build, in credits.
pub fn calculate_cost(table: &CostTable, options: &BuildOptions, text_length: usize) -> u32 {
    table
        .base
        .saturating_add(table.surcharge(options.source_type))
        .saturating_add(length_surcharge(text_length))
}
