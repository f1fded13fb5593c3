use sha2::{Digest, Sha256};

use crate::aggregate::{aggregate, PlatformSummary};
use crate::matcher::{select_best, MatchResult, MIN_COVERAGE, MIN_SCORE};
use crate::models::{
    DealConfig, ExpenseEntry, LineItem, LineKind, RawRecord, SettlementResult, SourceKind,
    ALL_SOURCES,
};
use crate::normalize::normalize;
use crate::present::present;
use crate::settle::{RevenueTotals, SettlementSession};

/// Staged records per source, already scoped by the caller to the
/// requested week and (for dispatch sources) the vehicle plate fragment.
#[derive(Debug, Clone, Default)]
pub struct SourceRecords {
    pub dispatch_a: Vec<RawRecord>,
    pub dispatch_b: Vec<RawRecord>,
    pub platform_a: Vec<RawRecord>,
    pub platform_b: Vec<RawRecord>,
}

impl SourceRecords {
    pub fn get(&self, kind: SourceKind) -> &[RawRecord] {
        match kind {
            SourceKind::DispatchA => &self.dispatch_a,
            SourceKind::DispatchB => &self.dispatch_b,
            SourceKind::PlatformA => &self.platform_a,
            SourceKind::PlatformB => &self.platform_b,
        }
    }

    pub fn get_mut(&mut self, kind: SourceKind) -> &mut Vec<RawRecord> {
        match kind {
            SourceKind::DispatchA => &mut self.dispatch_a,
            SourceKind::DispatchB => &mut self.dispatch_b,
            SourceKind::PlatformA => &mut self.platform_a,
            SourceKind::PlatformB => &mut self.platform_b,
        }
    }
}

/// Everything one evaluate action consumes.
#[derive(Debug, Clone)]
pub struct EngineInput {
    pub driver_name: String,
    pub vehicle: String,
    pub year: i32,
    pub week: u32,
    pub records: SourceRecords,
    pub config: DealConfig,
    pub fuel_input: f64,
    pub new_rider_input: f64,
    pub expenses: Vec<ExpenseEntry>,
}

pub struct Evaluation {
    pub line_items: Vec<LineItem>,
    pub settlement: SettlementResult,
    /// Per-source audit trail of what the matcher selected.
    pub matches: Vec<(SourceKind, MatchResult)>,
}

/// Run one settlement: fuzzy-select each source's record, aggregate,
/// settle under the active deal, and assemble display line items. Always
/// returns a well-formed result, possibly all-zero.
pub fn run(input: &EngineInput) -> Evaluation {
    let mut summaries: Vec<PlatformSummary> = Vec::new();
    let mut matches = Vec::new();

    // Fixed source order keeps detail-line ordering reproducible.
    for &kind in ALL_SOURCES {
        let candidates = input.records.get(kind);
        let Some(m) = select_best(&input.driver_name, candidates, MIN_SCORE, MIN_COVERAGE) else {
            continue;
        };
        let mut summary = aggregate(kind, std::slice::from_ref(&m.record));
        summary.details.push((
            "Matched".to_string(),
            format!("{} ({:.0})", m.matched_name, m.score),
        ));
        summaries.push(summary);
        matches.push((kind, m));
    }

    if matches.is_empty() {
        return Evaluation {
            line_items: present(&[], &SettlementResult::zero()),
            settlement: SettlementResult::zero(),
            matches,
        };
    }

    let mut session = SettlementSession::new(input.config.clone(), input.year);
    session.fuel_input = input.fuel_input;
    session.new_rider_input = input.new_rider_input;
    session.expenses = input.expenses.clone();

    let totals = RevenueTotals::from_summaries(&summaries);
    let settlement = session.settle(&totals, input.week);

    let mut line_items = vec![LineItem {
        kind: LineKind::Title,
        label: format!(
            "{} \u{2013} {} \u{2013} week {}/{}",
            input.driver_name, input.vehicle, input.week, input.year
        ),
        value: String::new(),
        details: Vec::new(),
    }];
    line_items.extend(present(&summaries, &settlement));

    Evaluation {
        line_items,
        settlement,
        matches,
    }
}

/// Stable fallback id for drivers with no database row, derived from the
/// normalized name. Negative so it can never collide with a rowid.
pub fn pseudo_driver_id(name: &str) -> i64 {
    let digest = Sha256::digest(normalize(name).as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    -((u64::from_be_bytes(bytes) >> 1) as i64)
}
