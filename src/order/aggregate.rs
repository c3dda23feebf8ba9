//! Supplier grouping, running totals, and dispatch message construction.
//! Pure functions over a snapshot; delivering the message (share intent,
//! deep link) is the caller's job.

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::Serialize;

use crate::translate::Lang;

use super::{OrderLine, Supplier};

/// Pending lines for one supplier, in snapshot order. Derived on every
/// read, never persisted.
#[derive(Debug, Clone)]
pub struct SupplierGroup {
    pub supplier: Supplier,
    pub lines: Vec<OrderLine>,
}

impl SupplierGroup {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Group the open work (not bought, not archived) by supplier.
///
/// Groups appear in first-seen order of the input sequence, which is
/// newest-first when fed from a store snapshot. Lines whose supplier tag
/// was unrecognized already decode to `Supplier::Other` and land in that
/// bucket.
pub fn group_pending_by_supplier(lines: &[OrderLine]) -> Vec<SupplierGroup> {
    let mut groups: Vec<SupplierGroup> = Vec::new();
    for line in lines {
        if line.archived || line.bought {
            continue;
        }
        match groups.iter_mut().find(|g| g.supplier == line.supplier) {
            Some(group) => group.lines.push(line.clone()),
            None => groups.push(SupplierGroup {
                supplier: line.supplier,
                lines: vec![line.clone()],
            }),
        }
    }
    groups
}

/// Running budget across the whole active list: every non-archived line
/// counts, bought or not. Junk costs count as zero.
pub fn compute_total_cost(lines: &[OrderLine]) -> f64 {
    lines
        .iter()
        .filter(|l| !l.archived)
        .map(|l| {
            if l.estimated_cost.is_finite() {
                l.estimated_cost
            } else {
                0.0
            }
        })
        .sum()
}

/// Order message for one supplier group in the given display language,
/// dated today.
pub fn build_dispatch_message(group: &SupplierGroup, lang: Lang) -> String {
    dispatch_message_dated(group, lang, Local::now().date_naive())
}

fn dispatch_message_dated(group: &SupplierGroup, lang: Lang, date: NaiveDate) -> String {
    let header = match lang {
        Lang::Tr => "Sipariş Listesi",
        Lang::De => "Bestellliste",
        Lang::Pa => "ਆਰਡਰ ਸੂਚੀ",
    };

    let mut out = String::new();
    out.push_str(&format!("{header}: {}\n", group.supplier.label(lang)));
    for line in &group.lines {
        out.push_str(&format!(
            "- {} {} {}\n",
            format_quantity(line.quantity),
            line.unit.label(lang),
            line.display_name(lang)
        ));
    }
    out.push_str(&date.format("%d.%m.%Y").to_string());
    out
}

/// Whole quantities render without a decimal point.
fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 {
        format!("{}", quantity as i64)
    } else {
        format!("{quantity}")
    }
}

/// Counts for the report view. Archived lines are included: reports see the
/// full history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportStats {
    pub total: usize,
    pub bought: usize,
    pub pending: usize,
}

pub fn report_stats(lines: &[OrderLine]) -> ReportStats {
    let bought = lines.iter().filter(|l| l.bought).count();
    ReportStats {
        total: lines.len(),
        bought,
        pending: lines.len() - bought,
    }
}

/// Restrict a snapshot to lines created in the given calendar month.
pub fn filter_by_month(lines: &[OrderLine], year: i32, month: u32) -> Vec<OrderLine> {
    lines
        .iter()
        .filter(|l| {
            DateTime::<Utc>::from_timestamp(l.created_at, 0)
                .map(|ts| ts.year() == year && ts.month() == month)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{Category, Requester, Unit};
    use crate::translate::TranslationRecord;

    fn line(name: &str, supplier: Supplier, cost: f64) -> OrderLine {
        OrderLine::new_pending(
            name,
            Lang::Tr,
            Category::Veg,
            2.0,
            Unit::Kg,
            Requester::Chef,
            supplier,
            cost,
        )
    }

    #[test]
    fn groups_by_supplier_in_first_seen_order() {
        let lines = vec![
            line("Domates", Supplier::Metro, 0.0),
            line("Biber", Supplier::Hal, 0.0),
            line("Süt", Supplier::Metro, 0.0),
        ];
        let groups = group_pending_by_supplier(&lines);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].supplier, Supplier::Metro);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].supplier, Supplier::Hal);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn bought_and_archived_lines_never_group() {
        let mut bought = line("Domates", Supplier::Hal, 0.0);
        bought.bought = true;
        let mut archived = line("Biber", Supplier::Hal, 0.0);
        archived.archived = true;
        let open = line("Süt", Supplier::Hal, 0.0);

        let groups = group_pending_by_supplier(&[bought, archived, open]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(groups[0].lines[0].raw_name, "Süt");
    }

    #[test]
    fn total_cost_spans_bought_but_not_archived() {
        let mut bought = line("Domates", Supplier::Hal, 10.0);
        bought.bought = true;
        let mut archived = line("Biber", Supplier::Hal, 99.0);
        archived.archived = true;
        let open = line("Süt", Supplier::Metro, 2.5);

        assert_eq!(compute_total_cost(&[bought, archived, open]), 12.5);
    }

    #[test]
    fn junk_costs_count_as_zero() {
        let mut broken = line("Domates", Supplier::Hal, 0.0);
        broken.estimated_cost = f64::NAN;
        assert_eq!(compute_total_cost(&[broken]), 0.0);
    }

    #[test]
    fn dispatch_message_renders_localized_lines_and_date() {
        let mut resolved = line("Domates", Supplier::Hal, 0.0);
        resolved.names = Some(TranslationRecord {
            tr: "Domates".into(),
            de: "Tomaten".into(),
            pa: "Tamatar".into(),
        });
        resolved.pending = false;
        let unresolved = line("Biber", Supplier::Hal, 0.0);

        let group = &group_pending_by_supplier(&[resolved, unresolved])[0];
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let message = dispatch_message_dated(group, Lang::De, date);

        assert_eq!(
            message,
            "Bestellliste: Großmarkt\n- 2 Kg Tomaten\n- 2 Kg Biber\n05.03.2024"
        );
    }

    #[test]
    fn fractional_quantities_keep_their_decimals() {
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(1.5), "1.5");
    }

    #[test]
    fn report_stats_include_archived_lines() {
        let mut bought = line("Domates", Supplier::Hal, 0.0);
        bought.bought = true;
        let mut archived = line("Biber", Supplier::Hal, 0.0);
        archived.archived = true;
        let open = line("Süt", Supplier::Hal, 0.0);

        let stats = report_stats(&[bought, archived, open]);
        assert_eq!(
            stats,
            ReportStats {
                total: 3,
                bought: 1,
                pending: 2
            }
        );
    }

    #[test]
    fn month_filter_buckets_by_creation_time() {
        let mut march = line("Domates", Supplier::Hal, 0.0);
        march.created_at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();
        let mut april = line("Biber", Supplier::Hal, 0.0);
        april.created_at = NaiveDate::from_ymd_opt(2024, 4, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp();

        let filtered = filter_by_month(&[march, april], 2024, 3);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].raw_name, "Domates");
    }
}
