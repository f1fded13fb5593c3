// ---------------------------------------------------------------------------
// Source kinds — enum dispatch instead of stringly-typed sources
// ---------------------------------------------------------------------------

/// The four revenue exports the fleet settles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    DispatchA,
    DispatchB,
    PlatformA,
    PlatformB,
}

/// Fixed query order; keeps detail-line ordering reproducible.
pub const ALL_SOURCES: &[SourceKind] = &[
    SourceKind::DispatchA,
    SourceKind::DispatchB,
    SourceKind::PlatformA,
    SourceKind::PlatformB,
];

impl SourceKind {
    pub fn key(&self) -> &'static str {
        match self {
            Self::DispatchA => "dispatch-a",
            Self::DispatchB => "dispatch-b",
            Self::PlatformA => "platform-a",
            Self::PlatformB => "platform-b",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DispatchA => "Taxi Dispatch A",
            Self::DispatchB => "Taxi Dispatch B",
            Self::PlatformA => "Rideshare A",
            Self::PlatformB => "Rideshare B",
        }
    }

    /// Dispatch exports carry a plate column and are scoped to the vehicle.
    pub fn is_dispatch(&self) -> bool {
        matches!(self, Self::DispatchA | Self::DispatchB)
    }
}

pub fn source_by_key(key: &str) -> Option<SourceKind> {
    ALL_SOURCES.iter().find(|s| s.key() == key).copied()
}

// ---------------------------------------------------------------------------
// Raw records — one closed struct per source schema
// ---------------------------------------------------------------------------

/// One row from a taxi dispatch export. Monetary fields stay raw strings;
/// the aggregator owns the locale-tolerant numeric boundary.
#[derive(Debug, Clone, Default)]
pub struct DispatchRecord {
    pub driver: String,
    pub plate: String,
    pub amount: String,
    pub tip: String,
    pub cash: String,
    pub payment_method: String,
}

/// One row from the gross + cash-collected rideshare export.
#[derive(Debug, Clone, Default)]
pub struct PlatformARecord {
    pub driver: String,
    pub gross: String,
    pub cash: String,
}

/// One row from the net-earnings + rider-tips rideshare export.
#[derive(Debug, Clone, Default)]
pub struct PlatformBRecord {
    pub driver: String,
    pub net_earnings: String,
    pub rider_tips: String,
    pub cash: String,
}

#[derive(Debug, Clone)]
pub enum RawRecord {
    Dispatch(DispatchRecord),
    PlatformA(PlatformARecord),
    PlatformB(PlatformBRecord),
}

impl RawRecord {
    pub fn driver_name(&self) -> &str {
        match self {
            Self::Dispatch(r) => &r.driver,
            Self::PlatformA(r) => &r.driver,
            Self::PlatformB(r) => &r.driver,
        }
    }
}

// ---------------------------------------------------------------------------
// Drivers, vehicles, deals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub deal: DealConfig,
}

#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: i64,
    pub plate: String,
    pub label: Option<String>,
}

/// Per-platform share multipliers, each in [0,1]. Deal defaults may pin a
/// factor to 1.0 (full pass-through) or 0.0 (excluded, fixed-fee style).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factors {
    pub taxi: f64,
    pub rideshare_a: f64,
    pub rideshare_b: f64,
    pub new_rider: f64,
    pub fuel: f64,
    pub garage: f64,
}

impl Factors {
    pub fn uniform(v: f64) -> Self {
        Self {
            taxi: v,
            rideshare_a: v,
            rideshare_b: v,
            new_rider: v,
            fuel: v,
            garage: v,
        }
    }
}

/// The contractual revenue-share model. A closed sum type so the
/// settlement computation is exhaustiveness-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Deal {
    /// Driver keeps a flat half of everything.
    Percentage,
    /// Fixed weekly fee plus 10% of revenue above the threshold, in
    /// exchange for surrendering all platform revenue.
    FixedFee { weekly_fee: f64, bonus_threshold: f64 },
    /// Independently tunable per-platform factors.
    Custom,
}

impl Deal {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedFee { .. } => "fixed_fee",
            Self::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealConfig {
    pub deal: Deal,
    pub factors: Factors,
    pub monthly_garage_cost: f64,
}

impl DealConfig {
    /// Defaults per deal model. Percentage halves everything; FixedFee
    /// zeroes the platform factors (revenue is surrendered); Custom
    /// starts at full pass-through and is tuned per driver.
    pub fn defaults_for(deal: Deal) -> Self {
        let factors = match deal {
            Deal::Percentage => Factors::uniform(0.5),
            Deal::FixedFee { .. } => Factors::uniform(0.0),
            Deal::Custom => Factors::uniform(1.0),
        };
        Self {
            deal,
            factors,
            monthly_garage_cost: 0.0,
        }
    }

    /// Stored deal rows round-trip through string keys; an unknown key
    /// falls back to Percentage defaults (the caller warns).
    pub fn from_stored(
        key: &str,
        weekly_fee: f64,
        bonus_threshold: f64,
        factors: Factors,
        monthly_garage_cost: f64,
    ) -> Option<Self> {
        let deal = match key {
            "percentage" => Deal::Percentage,
            "fixed_fee" => Deal::FixedFee {
                weekly_fee,
                bonus_threshold,
            },
            "custom" => Deal::Custom,
            _ => return None,
        };
        Some(Self {
            deal,
            factors,
            monthly_garage_cost,
        })
    }
}

impl Default for DealConfig {
    fn default() -> Self {
        Self::defaults_for(Deal::Percentage)
    }
}

// ---------------------------------------------------------------------------
// Session inputs and outputs
// ---------------------------------------------------------------------------

/// A pending ad-hoc cost added during the current settlement session.
#[derive(Debug, Clone)]
pub struct ExpenseEntry {
    pub id: Option<i64>,
    pub amount: f64,
    pub category: String,
    pub detail: Option<String>,
}

/// The three derived settlement outputs, as raw decimals for persistence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlementResult {
    /// Driver's base entitlement before deductions.
    pub share: f64,
    /// Share after fuel/garage/expense deductions.
    pub income: f64,
    /// Counter-party's net balance: electronic total minus income.
    pub final_result: f64,
}

impl SettlementResult {
    pub fn zero() -> Self {
        Self {
            share: 0.0,
            income: 0.0,
            final_result: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Display line items — pure data, no rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Summary,
    Value,
    Error,
}

#[derive(Debug, Clone)]
pub struct LineItem {
    pub kind: LineKind,
    pub label: String,
    /// Formatted currency string; empty for title/error lines.
    pub value: String,
    pub details: Vec<(String, String)>,
}

impl LineItem {
    pub fn value_line(label: &str, value: String) -> Self {
        Self {
            kind: LineKind::Value,
            label: label.to_string(),
            value,
            details: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_by_key() {
        assert_eq!(source_by_key("dispatch-a"), Some(SourceKind::DispatchA));
        assert_eq!(source_by_key("platform-b"), Some(SourceKind::PlatformB));
        assert_eq!(source_by_key("uber"), None);
    }

    #[test]
    fn test_deal_defaults() {
        let pct = DealConfig::defaults_for(Deal::Percentage);
        assert_eq!(pct.factors.taxi, 0.5);
        assert_eq!(pct.factors.garage, 0.5);

        let fixed = DealConfig::defaults_for(Deal::FixedFee {
            weekly_fee: 500.0,
            bonus_threshold: 1200.0,
        });
        assert_eq!(fixed.factors.taxi, 0.0);
        assert_eq!(fixed.factors.garage, 0.0);

        let custom = DealConfig::defaults_for(Deal::Custom);
        assert_eq!(custom.factors.rideshare_b, 1.0);
    }

    #[test]
    fn test_deal_from_stored_unknown_key() {
        assert!(DealConfig::from_stored("P", 0.0, 0.0, Factors::uniform(0.5), 0.0).is_none());
    }

    #[test]
    fn test_deal_key_roundtrip() {
        for deal in [
            Deal::Percentage,
            Deal::FixedFee {
                weekly_fee: 1.0,
                bonus_threshold: 2.0,
            },
            Deal::Custom,
        ] {
            let cfg = DealConfig::from_stored(
                deal.key(),
                1.0,
                2.0,
                Factors::uniform(0.5),
                100.0,
            )
            .unwrap();
            assert_eq!(cfg.deal, deal);
        }
    }
}
