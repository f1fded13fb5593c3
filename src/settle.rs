use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::aggregate::PlatformSummary;
use crate::models::{Deal, DealConfig, ExpenseEntry, SettlementResult};

/// Bonus rate on revenue above a fixed-fee deal's threshold.
const FIXED_FEE_BONUS_RATE: f64 = 0.10;

/// Fuel share borne by the driver under a percentage deal.
const PERCENTAGE_FUEL_SHARE: f64 = 0.5;

// ---------------------------------------------------------------------------
// Revenue totals
// ---------------------------------------------------------------------------

/// Cross-source totals the settlement runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevenueTotals {
    pub taxi: f64,
    pub rideshare_a: f64,
    pub rideshare_b: f64,
    /// Portion of revenue + tips not collected as cash.
    pub electronic: f64,
}

impl RevenueTotals {
    pub fn from_summaries(summaries: &[PlatformSummary]) -> Self {
        let mut t = Self::default();
        for s in summaries {
            match s.kind {
                crate::models::SourceKind::DispatchA | crate::models::SourceKind::DispatchB => {
                    t.taxi += s.real_revenue;
                }
                crate::models::SourceKind::PlatformA => t.rideshare_a += s.real_revenue,
                crate::models::SourceKind::PlatformB => t.rideshare_b += s.real_revenue,
            }
            t.electronic += s.gross + s.tips - s.cash;
        }
        t
    }

    pub fn total_revenue(&self) -> f64 {
        self.taxi + self.rideshare_a + self.rideshare_b
    }
}

// ---------------------------------------------------------------------------
// Settlement session
// ---------------------------------------------------------------------------

/// Session state for one driver-selection lifetime. Switching driver,
/// vehicle, or week means constructing a fresh session; there is no
/// partial reset.
#[derive(Debug, Clone)]
pub struct SettlementSession {
    pub config: DealConfig,
    pub year: i32,
    pub fuel_input: f64,
    pub new_rider_input: f64,
    pub expenses: Vec<ExpenseEntry>,
    garage_cache: HashMap<u32, f64>,
}

impl SettlementSession {
    pub fn new(config: DealConfig, year: i32) -> Self {
        Self {
            config,
            year,
            fuel_input: 0.0,
            new_rider_input: 0.0,
            expenses: Vec::new(),
            garage_cache: HashMap::new(),
        }
    }

    /// Monthly garage cost prorated over the Mondays of the ISO week's
    /// calendar month, memoized per week number within the session.
    pub fn weekly_garage_cost(&mut self, week: u32) -> f64 {
        if let Some(&cached) = self.garage_cache.get(&week) {
            return cached;
        }
        let monthly = self.config.monthly_garage_cost;
        let cost = match NaiveDate::from_isoywd_opt(self.year, week, Weekday::Mon) {
            Some(monday) => {
                let mondays = mondays_in_month(monday.year(), monday.month());
                if mondays == 0 {
                    // Cannot occur for a Gregorian month; charge unprorated.
                    monthly
                } else {
                    monthly / mondays as f64
                }
            }
            None => monthly,
        };
        self.garage_cache.insert(week, cost);
        cost
    }

    /// Compute Share, Income, and FinalResult for the active deal.
    pub fn settle(&mut self, totals: &RevenueTotals, week: u32) -> SettlementResult {
        let garage_week = self.weekly_garage_cost(week);
        let f = self.config.factors;
        let total_revenue = totals.total_revenue();

        let share = match self.config.deal {
            Deal::Percentage => {
                0.5 * total_revenue + 0.5 * self.new_rider_input
            }
            Deal::FixedFee {
                weekly_fee,
                bonus_threshold,
            } => {
                let bonus = if total_revenue > bonus_threshold {
                    (total_revenue - bonus_threshold) * FIXED_FEE_BONUS_RATE
                } else {
                    0.0
                };
                weekly_fee + bonus
            }
            Deal::Custom => {
                totals.taxi * f.taxi
                    + totals.rideshare_a * f.rideshare_a
                    + totals.rideshare_b * f.rideshare_b
                    + self.new_rider_input * f.new_rider
                    - self.fuel_input * f.fuel
                    - garage_week * f.garage
            }
        };

        let tank_deduction = match self.config.deal {
            Deal::Percentage => self.fuel_input * PERCENTAGE_FUEL_SHARE,
            // Waived for fixed-fee deals, folded into Share for custom.
            Deal::FixedFee { .. } | Deal::Custom => 0.0,
        };
        let garage_deduction = match self.config.deal {
            // Already subtracted inside the Custom share.
            Deal::Custom => 0.0,
            _ => garage_week * f.garage,
        };
        let expense_total: f64 = self.expenses.iter().map(|e| e.amount).sum();

        let income = share - tank_deduction - garage_deduction - expense_total;
        let final_result = totals.electronic - income;

        SettlementResult {
            share,
            income,
            final_result,
        }
    }
}

/// Number of Mondays in a calendar month.
fn mondays_in_month(year: i32, month: u32) -> u32 {
    (1..=31)
        .filter_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .filter(|d| d.weekday() == Weekday::Mon)
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Deal, DealConfig, ExpenseEntry, Factors};

    fn totals(taxi: f64, a: f64, b: f64) -> RevenueTotals {
        RevenueTotals {
            taxi,
            rideshare_a: a,
            rideshare_b: b,
            electronic: taxi + a + b,
        }
    }

    #[test]
    fn test_mondays_in_month() {
        assert_eq!(mondays_in_month(2026, 8), 5); // Aug 2026: 3, 10, 17, 24, 31
        assert_eq!(mondays_in_month(2027, 1), 4); // Jan 2027: 4, 11, 18, 25
        assert_eq!(mondays_in_month(2026, 2), 4);
    }

    #[test]
    fn test_weekly_garage_cost_prorated() {
        let mut cfg = DealConfig::default();
        cfg.monthly_garage_cost = 500.0;
        let mut session = SettlementSession::new(cfg, 2026);
        // Week 34 of 2026 starts Monday 2026-08-17; August has 5 Mondays.
        assert_eq!(session.weekly_garage_cost(34), 100.0);
        // Memoized: second call sees the cache.
        assert_eq!(session.weekly_garage_cost(34), 100.0);
    }

    #[test]
    fn test_weekly_garage_cost_invalid_week_falls_back() {
        let mut cfg = DealConfig::default();
        cfg.monthly_garage_cost = 500.0;
        let mut session = SettlementSession::new(cfg, 2026);
        assert_eq!(session.weekly_garage_cost(60), 500.0);
    }

    #[test]
    fn test_percentage_share() {
        let mut session = SettlementSession::new(DealConfig::default(), 2026);
        session.new_rider_input = 40.0;
        let r = session.settle(&totals(100.0, 200.0, 60.0), 34);
        assert_eq!(r.share, 0.5 * 360.0 + 0.5 * 40.0);
    }

    #[test]
    fn test_percentage_fuel_deduction() {
        let mut session = SettlementSession::new(DealConfig::default(), 2026);
        session.fuel_input = 80.0;
        let r = session.settle(&totals(200.0, 0.0, 0.0), 34);
        assert_eq!(r.share, 100.0);
        assert_eq!(r.income, 100.0 - 40.0);
    }

    #[test]
    fn test_fixed_fee_below_threshold_is_fee_exactly() {
        let cfg = DealConfig::defaults_for(Deal::FixedFee {
            weekly_fee: 500.0,
            bonus_threshold: 1200.0,
        });
        let mut session = SettlementSession::new(cfg, 2026);
        let r = session.settle(&totals(1200.0, 0.0, 0.0), 34);
        assert_eq!(r.share, 500.0);
    }

    #[test]
    fn test_fixed_fee_bonus_above_threshold() {
        let cfg = DealConfig::defaults_for(Deal::FixedFee {
            weekly_fee: 500.0,
            bonus_threshold: 1200.0,
        });
        let mut session = SettlementSession::new(cfg, 2026);
        let r = session.settle(&totals(1000.0, 300.0, 200.0), 34);
        assert_eq!(r.share, 530.0); // 500 + (1500 - 1200) * 0.10
    }

    #[test]
    fn test_fixed_fee_ignores_fuel() {
        let cfg = DealConfig::defaults_for(Deal::FixedFee {
            weekly_fee: 400.0,
            bonus_threshold: 1200.0,
        });
        let mut session = SettlementSession::new(cfg, 2026);
        session.fuel_input = 90.0;
        let r = session.settle(&totals(800.0, 0.0, 0.0), 34);
        assert_eq!(r.income, 400.0);
    }

    #[test]
    fn test_custom_share_uses_factors() {
        let mut cfg = DealConfig::defaults_for(Deal::Custom);
        cfg.factors = Factors {
            taxi: 0.6,
            rideshare_a: 0.4,
            rideshare_b: 0.3,
            new_rider: 1.0,
            fuel: 1.0,
            garage: 1.0,
        };
        cfg.monthly_garage_cost = 500.0;
        let mut session = SettlementSession::new(cfg, 2026);
        session.fuel_input = 50.0;
        session.new_rider_input = 20.0;
        let r = session.settle(&totals(100.0, 100.0, 100.0), 34);
        let expected_share = 60.0 + 40.0 + 30.0 + 20.0 - 50.0 - 100.0;
        assert_eq!(r.share, expected_share);
        // Fuel and garage are folded into Share, not deducted twice.
        assert_eq!(r.income, expected_share);
    }

    #[test]
    fn test_expense_never_increases_income() {
        let mut session = SettlementSession::new(DealConfig::default(), 2026);
        let before = session.settle(&totals(300.0, 0.0, 0.0), 34).income;
        session.expenses.push(ExpenseEntry {
            id: None,
            amount: 25.0,
            category: "wash".to_string(),
            detail: None,
        });
        let after = session.settle(&totals(300.0, 0.0, 0.0), 34).income;
        assert!(after <= before);
        assert_eq!(before - after, 25.0);
    }

    #[test]
    fn test_final_result_is_electronic_minus_income() {
        let mut session = SettlementSession::new(DealConfig::default(), 2026);
        let t = RevenueTotals {
            taxi: 90.0,
            rideshare_a: 0.0,
            rideshare_b: 0.0,
            electronic: 90.0,
        };
        let r = session.settle(&t, 34);
        assert_eq!(r.share, 45.0);
        assert_eq!(r.income, 45.0);
        assert_eq!(r.final_result, 45.0);
    }

    #[test]
    fn test_totals_from_summaries_electronic() {
        use crate::aggregate::{aggregate, PlatformSummary};
        use crate::models::{DispatchRecord, RawRecord, SourceKind};
        let s = aggregate(
            SourceKind::DispatchA,
            &[RawRecord::Dispatch(DispatchRecord {
                driver: "Jose Garcia".to_string(),
                plate: String::new(),
                amount: "100,00".to_string(),
                tip: "10,00".to_string(),
                cash: "20,00".to_string(),
                payment_method: "Card".to_string(),
            })],
        );
        let empty = PlatformSummary::empty(SourceKind::PlatformA);
        let t = RevenueTotals::from_summaries(&[s, empty]);
        assert_eq!(t.taxi, 90.0);
        assert_eq!(t.electronic, 90.0); // 100 + 10 - 20
    }
}
