use crate::fmt::money;
use crate::models::{RawRecord, SourceKind};

// ---------------------------------------------------------------------------
// Numeric boundary
// ---------------------------------------------------------------------------

/// Dispatch rows with an amount outside this band are corrupted or
/// placeholder rows and are excluded from every downstream sum.
const DISPATCH_AMOUNT_LIMIT: f64 = 250.0;

/// Marker substring in the dispatch payment-method column for rows
/// collected in cash ("Bar"/"Barzahlung" in the exports).
const CASH_MARKER: &str = "bar";

/// Parse a locale-tolerant decimal. Handles German (`1.234,56`) and
/// plain (`1234.56`) separators, currency symbols, and parenthesized
/// negatives. Missing, blank, or non-numeric input yields 0.0 — the
/// aggregation boundary never raises.
pub fn parse_amount(raw: &str) -> f64 {
    let s = raw
        .replace('\u{20ac}', "")
        .replace('$', "")
        .replace('"', "")
        .replace(' ', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return -parse_amount(inner);
    }

    let cleaned = match (s.rfind(','), s.rfind('.')) {
        // Both separators present: the rightmost one is the decimal point.
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) => s.replace(',', "."),
        _ => s.to_string(),
    };

    let v: f64 = cleaned.parse().unwrap_or(0.0);
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn is_cash_row(payment_method: &str) -> bool {
    payment_method.to_lowercase().contains(CASH_MARKER)
}

// ---------------------------------------------------------------------------
// Per-source summaries
// ---------------------------------------------------------------------------

/// Normalized monetary aggregate for one source. All amounts are zero
/// (never null) for a source that contributed no records.
#[derive(Debug, Clone)]
pub struct PlatformSummary {
    pub kind: SourceKind,
    /// Filtered amount sum (dispatch), gross payout (A), net earnings (B).
    pub gross: f64,
    /// Displayed tips: non-cash tips for dispatch, rider tips for B.
    pub tips: f64,
    pub cash: f64,
    /// Gross minus tips where the source reimburses tips separately.
    pub real_revenue: f64,
    pub half_share: f64,
    pub remainder: f64,
    pub details: Vec<(String, String)>,
}

impl PlatformSummary {
    pub fn empty(kind: SourceKind) -> Self {
        Self {
            kind,
            gross: 0.0,
            tips: 0.0,
            cash: 0.0,
            real_revenue: 0.0,
            half_share: 0.0,
            remainder: 0.0,
            details: Vec::new(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.gross == 0.0 && self.tips == 0.0 && self.cash == 0.0
    }
}

/// Apply the source kind's domain-mandated inclusion and summation rules.
pub fn aggregate(kind: SourceKind, records: &[RawRecord]) -> PlatformSummary {
    match kind {
        SourceKind::DispatchA | SourceKind::DispatchB => aggregate_dispatch(kind, records),
        SourceKind::PlatformA => aggregate_platform_a(records),
        SourceKind::PlatformB => aggregate_platform_b(records),
    }
}

fn aggregate_dispatch(kind: SourceKind, records: &[RawRecord]) -> PlatformSummary {
    let mut gross = 0.0;
    let mut tips_all = 0.0;
    let mut tips_displayed = 0.0;
    let mut cash = 0.0;

    for record in records {
        let RawRecord::Dispatch(r) = record else {
            continue;
        };
        let amount = parse_amount(&r.amount);
        let tip = parse_amount(&r.tip);
        // Tips count toward real revenue regardless of the outlier filter;
        // everything else an outlier row carries is dropped.
        tips_all += tip;
        if amount.abs() > DISPATCH_AMOUNT_LIMIT {
            continue;
        }
        if !is_cash_row(&r.payment_method) {
            tips_displayed += tip;
        }
        gross += amount;
        cash += parse_amount(&r.cash);
    }

    let real_revenue = gross - tips_all;
    let half_share = real_revenue / 2.0;
    let remainder = half_share - cash + tips_displayed;

    PlatformSummary {
        kind,
        gross,
        tips: tips_displayed,
        cash,
        real_revenue,
        half_share,
        remainder,
        details: vec![
            ("Gross".to_string(), money(gross)),
            ("Tips (non-cash)".to_string(), money(tips_displayed)),
            ("Cash collected".to_string(), money(cash)),
            ("Real revenue".to_string(), money(real_revenue)),
            ("Half share".to_string(), money(half_share)),
            ("Remainder".to_string(), money(remainder)),
        ],
    }
}

fn aggregate_platform_a(records: &[RawRecord]) -> PlatformSummary {
    let mut gross = 0.0;
    let mut cash = 0.0;
    for record in records {
        let RawRecord::PlatformA(r) = record else {
            continue;
        };
        gross += parse_amount(&r.gross);
        cash += parse_amount(&r.cash);
    }

    // No tip concept on this platform.
    let half_share = gross / 2.0;
    let remainder = half_share - cash;

    PlatformSummary {
        kind: SourceKind::PlatformA,
        gross,
        tips: 0.0,
        cash,
        real_revenue: gross,
        half_share,
        remainder,
        details: vec![
            ("Gross".to_string(), money(gross)),
            ("Cash collected".to_string(), money(cash)),
            ("Half share".to_string(), money(half_share)),
            ("Remainder".to_string(), money(remainder)),
        ],
    }
}

fn aggregate_platform_b(records: &[RawRecord]) -> PlatformSummary {
    let mut net = 0.0;
    let mut tips = 0.0;
    let mut cash = 0.0;
    for record in records {
        let RawRecord::PlatformB(r) = record else {
            continue;
        };
        net += parse_amount(&r.net_earnings);
        tips += parse_amount(&r.rider_tips);
        cash += parse_amount(&r.cash);
    }

    let real_revenue = net - tips;
    let half_share = real_revenue / 2.0;
    let remainder = half_share - cash;

    PlatformSummary {
        kind: SourceKind::PlatformB,
        gross: net,
        tips,
        cash,
        real_revenue,
        half_share,
        remainder,
        details: vec![
            ("Net earnings".to_string(), money(net)),
            ("Rider tips".to_string(), money(tips)),
            ("Cash collected".to_string(), money(cash)),
            ("Real revenue".to_string(), money(real_revenue)),
            ("Half share".to_string(), money(half_share)),
            ("Remainder".to_string(), money(remainder)),
        ],
    }
}
