use crate::aggregate::PlatformSummary;
use crate::fmt::money;
use crate::models::{LineItem, LineKind, SettlementResult, SourceKind};

pub const NO_RECORDS_MESSAGE: &str = "no records found";

/// Assemble matched per-source summaries and the settlement outputs into
/// one ordered list of display line items. Pure data, no rendering.
pub fn present(summaries: &[PlatformSummary], settlement: &SettlementResult) -> Vec<LineItem> {
    if summaries.is_empty() {
        return vec![LineItem {
            kind: LineKind::Error,
            label: NO_RECORDS_MESSAGE.to_string(),
            value: String::new(),
            details: Vec::new(),
        }];
    }

    let mut items = Vec::new();

    if let Some(taxi) = merge_taxi(summaries) {
        items.push(taxi);
    }
    for s in summaries {
        if s.kind.is_dispatch() {
            continue;
        }
        items.push(LineItem {
            kind: LineKind::Summary,
            label: s.kind.name().to_string(),
            value: money(s.real_revenue),
            details: s.details.clone(),
        });
    }

    let cash: f64 = summaries.iter().map(|s| s.cash).sum();
    let electronic: f64 = summaries.iter().map(|s| s.gross + s.tips - s.cash).sum();
    let total: f64 = summaries.iter().map(|s| s.gross + s.tips).sum();
    items.push(LineItem::value_line("Cash", money(cash)));
    items.push(LineItem::value_line("Electronic", money(electronic)));
    items.push(LineItem::value_line("Total", money(total)));

    items.push(LineItem::value_line("Driver share", money(settlement.share)));
    items.push(LineItem::value_line("Driver income", money(settlement.income)));
    items.push(LineItem::value_line(
        "Final balance",
        money(settlement.final_result),
    ));

    items
}

/// The two dispatch exports settle as a single "Taxi" line: summed when
/// both contributed, otherwise whichever is non-zero.
fn merge_taxi(summaries: &[PlatformSummary]) -> Option<LineItem> {
    let taxis: Vec<&PlatformSummary> = summaries.iter().filter(|s| s.kind.is_dispatch()).collect();
    if taxis.is_empty() {
        return None;
    }

    let active: Vec<&&PlatformSummary> = taxis.iter().filter(|s| !s.is_zero()).collect();
    let item = match active.as_slice() {
        [] => LineItem {
            kind: LineKind::Summary,
            label: "Taxi".to_string(),
            value: money(0.0),
            details: taxis[0].details.clone(),
        },
        [only] => LineItem {
            kind: LineKind::Summary,
            label: "Taxi".to_string(),
            value: money(only.real_revenue),
            details: only.details.clone(),
        },
        many => {
            let revenue: f64 = many.iter().map(|s| s.real_revenue).sum();
            let mut details = Vec::new();
            for s in many {
                for (label, value) in &s.details {
                    details.push((format!("{} \u{2013} {}", s.kind.name(), label), value.clone()));
                }
            }
            LineItem {
                kind: LineKind::Summary,
                label: "Taxi".to_string(),
                value: money(revenue),
                details,
            }
        }
    };
    Some(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::models::{DispatchRecord, RawRecord};

    fn dispatch_summary(kind: SourceKind, amount: &str) -> PlatformSummary {
        aggregate(
            kind,
            &[RawRecord::Dispatch(DispatchRecord {
                driver: "Jose Garcia".to_string(),
                amount: amount.to_string(),
                ..Default::default()
            })],
        )
    }

    fn find<'a>(items: &'a [LineItem], label: &str) -> &'a LineItem {
        items
            .iter()
            .find(|i| i.label == label)
            .unwrap_or_else(|| panic!("missing line: {label}"))
    }

    #[test]
    fn test_no_summaries_yields_single_error() {
        let items = present(&[], &SettlementResult::zero());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, LineKind::Error);
        assert_eq!(items[0].label, NO_RECORDS_MESSAGE);
    }

    #[test]
    fn test_all_zero_total_formats_as_zero() {
        let summaries = [PlatformSummary::empty(SourceKind::PlatformA)];
        let items = present(&summaries, &SettlementResult::zero());
        assert_eq!(find(&items, "Total").value, "0,00 \u{20ac}");
        assert_eq!(find(&items, "Driver income").value, "0,00 \u{20ac}");
    }

    #[test]
    fn test_both_dispatch_sources_merge() {
        let a = dispatch_summary(SourceKind::DispatchA, "100,00");
        let b = dispatch_summary(SourceKind::DispatchB, "50,00");
        let items = present(&[a, b], &SettlementResult::zero());
        let taxi = find(&items, "Taxi");
        assert_eq!(taxi.value, "150,00 \u{20ac}");
        // Concatenated detail rows carry their source name.
        assert!(taxi
            .details
            .iter()
            .any(|(l, _)| l.starts_with("Taxi Dispatch A")));
        assert!(taxi
            .details
            .iter()
            .any(|(l, _)| l.starts_with("Taxi Dispatch B")));
    }

    #[test]
    fn test_single_dispatch_source_used_directly() {
        let a = dispatch_summary(SourceKind::DispatchA, "100,00");
        let b = PlatformSummary::empty(SourceKind::DispatchB);
        let items = present(&[a, b], &SettlementResult::zero());
        let taxi = find(&items, "Taxi");
        assert_eq!(taxi.value, "100,00 \u{20ac}");
        assert!(taxi.details.iter().all(|(l, _)| !l.contains("\u{2013}")));
    }

    #[test]
    fn test_aggregate_lines() {
        let a = dispatch_summary(SourceKind::DispatchA, "100,00");
        let items = present(
            &[a],
            &SettlementResult {
                share: 50.0,
                income: 50.0,
                final_result: 50.0,
            },
        );
        assert_eq!(find(&items, "Cash").value, "0,00 \u{20ac}");
        assert_eq!(find(&items, "Electronic").value, "100,00 \u{20ac}");
        assert_eq!(find(&items, "Driver share").value, "50,00 \u{20ac}");
        assert_eq!(find(&items, "Final balance").value, "50,00 \u{20ac}");
    }
}
