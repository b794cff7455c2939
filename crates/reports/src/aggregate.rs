// Group-by helpers shared by the page reports

use std::collections::BTreeMap;

use geodash_core::Table;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupSums {
    /// Totals sorted by key.
    pub groups: Vec<GroupTotal>,
    /// Rows whose value was present but not numeric.
    pub skipped: usize,
}

/// Sum `value_col` grouped by `group_col`. Rows with an empty group are
/// ignored; empty values count as zero; non-numeric values are skipped and
/// counted.
pub fn sum_by(table: &Table, group_col: &str, value_col: &str) -> GroupSums {
    let (Some(g), Some(v)) = (table.column_index(group_col), table.column_index(value_col)) else {
        return GroupSums::default();
    };

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut skipped = 0;
    for row in &table.rows {
        let Some(group) = row.get(g).filter(|c| !c.is_empty()) else {
            continue;
        };
        let value = match row.get(v) {
            None => 0.0,
            Some(cell) if cell.is_empty() => 0.0,
            Some(cell) => match cell.as_number() {
                Some(n) => n,
                None => {
                    skipped += 1;
                    continue;
                }
            },
        };
        *totals.entry(group.key_text()).or_insert(0.0) += value;
    }

    GroupSums {
        groups: totals.into_iter().map(|(key, total)| GroupTotal { key, total }).collect(),
        skipped,
    }
}

/// Largest `n` totals, descending; ties keep key order.
pub fn top_n(groups: &[GroupTotal], n: usize) -> Vec<GroupTotal> {
    let mut sorted = groups.to_vec();
    sorted.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodash_core::Cell;

    fn sales() -> Table {
        Table::with_rows(
            vec!["Region".into(), "Sales".into()],
            vec![
                vec![Cell::from("Sur"), Cell::from(10.0)],
                vec![Cell::from("Este"), Cell::from("2.5")],
                vec![Cell::from("Sur"), Cell::from(5.0)],
                vec![Cell::Empty, Cell::from(99.0)],
                vec![Cell::from("Oeste"), Cell::from("n/a")],
                vec![Cell::from("Oeste"), Cell::Empty],
            ],
        )
    }

    #[test]
    fn sums_sorted_by_key() {
        let sums = sum_by(&sales(), "Region", "Sales");
        let keys: Vec<&str> = sums.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Este", "Oeste", "Sur"]);
        assert_eq!(sums.groups[2].total, 15.0);
        assert_eq!(sums.groups[1].total, 0.0);
        assert_eq!(sums.skipped, 1);
    }

    #[test]
    fn missing_columns_give_nothing() {
        assert_eq!(sum_by(&sales(), "Country", "Sales"), GroupSums::default());
    }

    #[test]
    fn top_n_breaks_ties_by_key() {
        let groups = vec![
            GroupTotal { key: "b".into(), total: 3.0 },
            GroupTotal { key: "a".into(), total: 3.0 },
            GroupTotal { key: "c".into(), total: 9.0 },
        ];
        let top: Vec<String> = top_n(&groups, 2).into_iter().map(|g| g.key).collect();
        assert_eq!(top, vec!["c", "a"]);
    }
}
