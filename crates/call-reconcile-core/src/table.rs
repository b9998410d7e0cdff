//! Minimal column-named string table.
//!
//! Host adapters decode CSV/JSON into a [`Table`]; the core never sees
//! bytes or encodings. Cells are `Option<String>`, and [`Table::get`]
//! folds empty and whitespace-only cells into `None` so every source
//! format treats missing values the same way.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table from string literals. Mostly useful in tests.
    pub fn from_rows(columns: &[&str], rows: &[&[&str]]) -> Self {
        let mut table = Table::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| Some(c.to_string())).collect());
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding or truncating it to the column count.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    /// Cell value by row index and column name; blank cells are `None`.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows
            .get(row)?
            .get(col)?
            .as_deref()
            .filter(|v| !v.trim().is_empty())
    }

    /// Rename a column in place. No-op when `from` is absent.
    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
    }

    /// Project onto `columns`, silently skipping any that are absent.
    pub fn select(&self, columns: &[&str]) -> Table {
        let picks: Vec<(usize, &str)> = columns
            .iter()
            .filter_map(|c| self.column_index(c).map(|i| (i, *c)))
            .collect();
        let mut out = Table::new(picks.iter().map(|(_, c)| c.to_string()).collect());
        for row in &self.rows {
            out.rows
                .push(picks.iter().map(|(i, _)| row[*i].clone()).collect());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_cells_read_as_missing() {
        let t = Table::from_rows(&["a", "b"], &[&["x", "  "], &["", "y"]]);
        assert_eq!(t.get(0, "a"), Some("x"));
        assert_eq!(t.get(0, "b"), None);
        assert_eq!(t.get(1, "a"), None);
        assert_eq!(t.get(5, "a"), None);
        assert_eq!(t.get(0, "zzz"), None);
    }

    #[test]
    fn test_push_row_pads_short_rows() {
        let mut t = Table::new(vec!["a".into(), "b".into()]);
        t.push_row(vec![Some("1".into())]);
        assert_eq!(t.rows()[0].len(), 2);
        assert_eq!(t.get(0, "b"), None);
    }

    #[test]
    fn test_select_skips_absent_columns() {
        let t = Table::from_rows(&["a", "b", "c"], &[&["1", "2", "3"]]);
        let s = t.select(&["c", "missing", "a"]);
        assert_eq!(s.columns(), &["c".to_string(), "a".to_string()]);
        assert_eq!(s.get(0, "c"), Some("3"));
        assert_eq!(s.get(0, "a"), Some("1"));
    }

    #[test]
    fn test_rename_column() {
        let mut t = Table::from_rows(&["old"], &[&["v"]]);
        t.rename_column("old", "new");
        t.rename_column("absent", "other");
        assert!(t.has_column("new"));
        assert!(!t.has_column("old"));
        assert_eq!(t.get(0, "new"), Some("v"));
    }
}
