use serde::Serialize;

use crate::cell::Cell;

/// Headers plus rows, as read from a CSV file or a worksheet.
///
/// Rows may be shorter than the header (ragged CSV, trailing empty Excel
/// cells); `get` treats out-of-range positions as absent, not empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (`row`, `column`). `None` when the column is unknown or the
    /// row is too short to hold it.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn column_values<'a>(&'a self, column: &str) -> Vec<&'a Cell> {
        match self.column_index(column) {
            Some(col) => self.rows.iter().filter_map(|r| r.get(col)).collect(),
            None => Vec::new(),
        }
    }

    /// Distinct display values of a column in first-seen order. Empty cells
    /// are skipped.
    pub fn unique_values(&self, column: &str) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for cell in self.column_values(column) {
            if cell.is_empty() {
                continue;
            }
            let text = cell.key_text();
            if seen.insert(text.clone()) {
                out.push(text);
            }
        }
        out
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        match self.column_index(from) {
            Some(i) => {
                self.headers[i] = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(col) = self.column_index(name) else {
            return false;
        };
        self.headers.remove(col);
        for row in &mut self.rows {
            if col < row.len() {
                row.remove(col);
            }
        }
        true
    }

    /// Drop index columns left behind by dataframe exports: headers of the
    /// form `Unnamed: <n>` and blank headers. Returns the dropped headers.
    pub fn drop_index_columns(&mut self) -> Vec<String> {
        let doomed: Vec<String> = self
            .headers
            .iter()
            .filter(|h| is_index_header(h))
            .cloned()
            .collect();
        for name in &doomed {
            self.drop_column(name);
        }
        doomed
    }

    /// Keep the rows for which `keep` returns true.
    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&Table, &[Cell]) -> bool,
    {
        let rows = std::mem::take(&mut self.rows);
        let kept: Vec<Vec<Cell>> = {
            let this: &Table = self;
            rows.into_iter().filter(|r| keep(this, r)).collect()
        };
        self.rows = kept;
    }

    /// Cell of `row` at `column`, for closures that hold a row slice.
    pub fn cell<'a>(&self, row: &'a [Cell], column: &str) -> Option<&'a Cell> {
        self.column_index(column).and_then(|c| row.get(c))
    }

    /// Copy of the first `n` rows.
    pub fn head(&self, n: usize) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

fn is_index_header(header: &str) -> bool {
    let h = header.trim();
    if h.is_empty() {
        return true;
    }
    match h.strip_prefix("Unnamed:") {
        Some(rest) => rest.trim().chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn municipios() -> Table {
        Table::with_rows(
            vec!["Unnamed: 0".into(), "Municipio".into(), "RandomNumbers".into()],
            vec![
                vec![Cell::from("0"), Cell::from("MERIDA"), Cell::from("500")],
                vec![Cell::from("1"), Cell::from("TICUL"), Cell::from("1200")],
                vec![Cell::from("2"), Cell::from("MOTUL")],
            ],
        )
    }

    #[test]
    fn get_handles_short_rows() {
        let t = municipios();
        assert_eq!(t.get(1, "RandomNumbers"), Some(&Cell::from("1200")));
        assert_eq!(t.get(2, "RandomNumbers"), None);
        assert_eq!(t.get(0, "Nope"), None);
        assert_eq!(t.get(9, "Municipio"), None);
    }

    #[test]
    fn drop_index_columns_removes_unnamed() {
        let mut t = municipios();
        let dropped = t.drop_index_columns();
        assert_eq!(dropped, vec!["Unnamed: 0".to_string()]);
        assert_eq!(t.headers, vec!["Municipio", "RandomNumbers"]);
        assert_eq!(t.rows[0], vec![Cell::from("MERIDA"), Cell::from("500")]);
        assert_eq!(t.rows[2], vec![Cell::from("MOTUL")]);
    }

    #[test]
    fn drop_index_columns_keeps_named_lookalikes() {
        let mut t = Table::new(vec!["Unnamed: total".into(), "".into(), "x".into()]);
        let dropped = t.drop_index_columns();
        assert_eq!(dropped, vec!["".to_string()]);
        assert_eq!(t.headers, vec!["Unnamed: total", "x"]);
    }

    #[test]
    fn unique_values_first_seen_order() {
        let t = Table::with_rows(
            vec!["store".into()],
            vec![
                vec![Cell::from("Motul Centro")],
                vec![Cell::Empty],
                vec![Cell::from("Merida Norte")],
                vec![Cell::from("Motul Centro")],
            ],
        );
        assert_eq!(t.unique_values("store"), vec!["Motul Centro", "Merida Norte"]);
    }

    #[test]
    fn retain_and_rename() {
        let mut t = municipios();
        assert!(t.rename_column("Municipio", "region"));
        assert!(!t.rename_column("Municipio", "again"));
        t.retain_rows(|t, r| t.cell(r, "region").map(|c| c.key_text()) != Some("TICUL".into()));
        assert_eq!(t.len(), 2);
        assert_eq!(t.head(1).len(), 1);
    }
}
