use disclosure_index::Candidate;
use serde::{Deserialize, Serialize};

/// Anything with a non-negative cost the selector can weigh
pub trait Weighted {
    fn weight(&self) -> u64;
}

impl Weighted for Candidate {
    fn weight(&self) -> u64 {
        self.weight
    }
}

/// Result of a budgeted selection, with what was left out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection<T> {
    pub selected: Vec<T>,
    pub skipped: Vec<T>,

    /// Sum of selected weights
    pub total_weight: u64,

    /// Whether the candidates together exceeded the budget
    pub over_budget: bool,
}

/// Ascending-weight greedy selection under a weight ceiling.
///
/// Maximizes the number of items taken: when everything fits the input comes
/// back unchanged, otherwise the lightest items are taken first (equal
/// weights keep their input order) and any item that does not fit in the
/// remaining room is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetSelector;

impl BudgetSelector {
    pub fn select<T: Weighted + Clone>(&self, candidates: &[T], budget: i64) -> Vec<T> {
        select(candidates, budget)
    }

    pub fn select_with_report<T: Weighted + Clone>(
        &self,
        candidates: &[T],
        budget: i64,
    ) -> Selection<T> {
        select_with_report(candidates, budget)
    }
}

pub fn select<T: Weighted + Clone>(candidates: &[T], budget: i64) -> Vec<T> {
    select_with_report(candidates, budget).selected
}

pub fn select_with_report<T: Weighted + Clone>(candidates: &[T], budget: i64) -> Selection<T> {
    let total = candidates
        .iter()
        .fold(0u64, |acc, c| acc.saturating_add(c.weight()));

    if budget <= 0 {
        return Selection {
            selected: Vec::new(),
            skipped: candidates.to_vec(),
            total_weight: 0,
            over_budget: !candidates.is_empty(),
        };
    }

    let limit = budget.unsigned_abs();
    if total <= limit {
        return Selection {
            selected: candidates.to_vec(),
            skipped: Vec::new(),
            total_weight: total,
            over_budget: false,
        };
    }

    // sort_by_key is stable: equal weights keep their input order
    let mut order: Vec<&T> = candidates.iter().collect();
    order.sort_by_key(|c| c.weight());

    let mut selected = Vec::new();
    let mut skipped = Vec::new();
    let mut used = 0u64;
    for candidate in order {
        let next = used.saturating_add(candidate.weight());
        if next <= limit {
            used = next;
            selected.push(candidate.clone());
        } else {
            skipped.push(candidate.clone());
        }
    }

    log::debug!(
        "Budget {limit}: kept {}/{} candidates ({used} of {total} weight)",
        selected.len(),
        candidates.len()
    );

    Selection {
        selected,
        skipped,
        total_weight: used,
        over_budget: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str, u64);

    impl Weighted for Item {
        fn weight(&self) -> u64 {
            self.1
        }
    }

    fn names(items: &[Item]) -> Vec<&'static str> {
        items.iter().map(|i| i.0).collect()
    }

    #[test]
    fn prefers_breadth_over_one_large_item() {
        let items = [Item("a", 50), Item("b", 30), Item("c", 80), Item("d", 20)];
        let selection = select_with_report(&items, 100);

        assert_eq!(names(&selection.selected), vec!["d", "b", "a"]);
        assert_eq!(names(&selection.skipped), vec!["c"]);
        assert_eq!(selection.total_weight, 100);
        assert!(selection.over_budget);
    }

    #[test]
    fn everything_fits_returns_input_unchanged() {
        let items = [Item("big", 60), Item("small", 10), Item("mid", 30)];
        assert_eq!(select(&items, 100), items.to_vec());
        assert!(!select_with_report(&items, 100).over_budget);
    }

    #[test]
    fn ties_keep_input_order() {
        let items = [
            Item("x", 40),
            Item("first", 10),
            Item("second", 10),
            Item("third", 10),
        ];
        assert_eq!(names(&select(&items, 25)), vec!["first", "second"]);
    }

    #[test]
    fn empty_and_non_positive_budgets() {
        let items = [Item("a", 1)];
        assert!(select::<Item>(&[], 100).is_empty());
        assert!(select(&items, 0).is_empty());
        assert!(select(&items, -5).is_empty());

        let report = select_with_report(&items, 0);
        assert_eq!(report.skipped, items.to_vec());
        assert!(report.over_budget);
        assert!(!select_with_report::<Item>(&[], 0).over_budget);
    }

    #[test]
    fn oversized_items_are_skipped_not_blocking() {
        let items = [Item("huge", 500), Item("a", 40), Item("b", 40)];
        assert_eq!(names(&select(&items, 100)), vec!["a", "b"]);

        let only_huge = [Item("huge", 500), Item("huger", 900)];
        assert!(select(&only_huge, 100).is_empty());
    }

    #[test]
    fn zero_weight_items_always_fit() {
        let items = [Item("heavy", 150), Item("free", 0), Item("light", 90)];
        assert_eq!(names(&select(&items, 100)), vec!["free", "light"]);
    }

    #[test]
    fn saturating_sums_do_not_overflow() {
        let items = [Item("max", u64::MAX), Item("one", 1)];
        assert_eq!(names(&select(&items, i64::MAX)), vec!["one"]);
    }
}
