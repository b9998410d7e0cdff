//! Column declarations for the two input tables.
//!
//! Defaults are the headers produced by the originating contact database
//! and by the calling platform's result export. Every name can be
//! overridden (the host exposes these structs under `[schema.*]` in its
//! config). Presence is checked once, at the ingestion boundary, and the
//! result is a [`SchemaReport`] rather than an error: missing columns
//! degrade to partial projections.

use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::table::Table;

/// Columns of the contact (source-of-truth) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSchema {
    /// Canonical company-name column.
    pub company: String,
    /// Alternate header some exports use for the company name.
    pub company_alias: String,
    pub phone: String,
    pub external_id: String,
    pub address: String,
    pub talk_judgement: String,
    pub validity: String,
    pub decision_maker: String,
}

impl Default for ContactSchema {
    fn default() -> Self {
        Self {
            company: "社名".to_string(),
            company_alias: "顧客名".to_string(),
            phone: "電話番号".to_string(),
            external_id: "IDの頭にID".to_string(),
            address: "住所統合".to_string(),
            talk_judgement: "最終トーク判定".to_string(),
            validity: "最終有効無効".to_string(),
            decision_maker: "最終決済担当".to_string(),
        }
    }
}

impl ContactSchema {
    /// The company column actually present: the alias wins, otherwise the
    /// canonical name (even if that is absent too).
    pub fn company_column<'a>(&'a self, table: &Table) -> &'a str {
        if table.has_column(&self.company_alias) {
            &self.company_alias
        } else {
            &self.company
        }
    }

    /// Columns copied into the outbound call list, in output order.
    pub fn upload_columns(&self) -> [&str; 3] {
        [
            self.company.as_str(),
            self.phone.as_str(),
            self.address.as_str(),
        ]
    }

    /// Auxiliary disposition columns pulled into the reconciled report.
    pub fn auxiliary_columns(&self) -> [&str; 4] {
        [
            self.address.as_str(),
            self.talk_judgement.as_str(),
            self.validity.as_str(),
            self.decision_maker.as_str(),
        ]
    }

    pub fn validate(&self, table: &Table) -> SchemaReport {
        let company_present =
            table.has_column(&self.company) || table.has_column(&self.company_alias);
        let mut report = SchemaReport::new("contacts");
        if !company_present {
            report.missing_required.push(self.company.clone());
        }
        report.check_required(table, &[self.phone.as_str()]);
        report.check_optional(table, &[self.external_id.as_str()]);
        report.check_optional(table, &self.auxiliary_columns());
        report
    }
}

/// Columns of the call-result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallSchema {
    pub company: String,
    pub phone: String,
    pub status: String,
    pub outcome: String,
    pub summary: String,
    pub duration: String,
}

impl Default for CallSchema {
    fn default() -> Self {
        Self {
            company: "社名".to_string(),
            phone: "電話番号".to_string(),
            status: "ステータス".to_string(),
            outcome: "架電結果".to_string(),
            summary: "要約".to_string(),
            duration: "通話時間".to_string(),
        }
    }
}

impl CallSchema {
    pub fn validate(&self, table: &Table) -> SchemaReport {
        let mut report = SchemaReport::new("calls");
        report.check_required(table, &[self.company.as_str(), self.status.as_str()]);
        report.check_optional(
            table,
            &[
                self.phone.as_str(),
                self.outcome.as_str(),
                self.summary.as_str(),
                self.duration.as_str(),
            ],
        );
        report
    }
}

/// Outcome of a column-presence check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub table: String,
    pub missing_required: Vec<String>,
    pub missing_optional: Vec<String>,
}

impl SchemaReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            ..Default::default()
        }
    }

    fn check_required(&mut self, table: &Table, columns: &[&str]) {
        for c in columns {
            if !table.has_column(c) {
                self.missing_required.push(c.to_string());
            }
        }
    }

    fn check_optional(&mut self, table: &Table, columns: &[&str]) {
        for c in columns {
            if !table.has_column(c) {
                self.missing_optional.push(c.to_string());
            }
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required.is_empty() && self.missing_optional.is_empty()
    }

    /// Missing required columns as [`ReconcileError::MissingColumn`] values.
    pub fn errors(&self) -> Vec<ReconcileError> {
        self.missing_required
            .iter()
            .map(|c| ReconcileError::MissingColumn {
                table: self.table.clone(),
                column: c.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_preferred_when_present() {
        let schema = ContactSchema::default();
        let t = Table::from_rows(&["顧客名", "電話番号"], &[]);
        assert_eq!(schema.company_column(&t), "顧客名");
        let t = Table::from_rows(&["社名", "電話番号"], &[]);
        assert_eq!(schema.company_column(&t), "社名");
    }

    #[test]
    fn test_alias_falls_back_to_canonical() {
        let schema = ContactSchema::default();
        let t = Table::from_rows(&["電話番号"], &[]);
        assert_eq!(schema.company_column(&t), "社名");
    }

    #[test]
    fn test_contact_validation_reports_missing() {
        let schema = ContactSchema::default();
        let t = Table::from_rows(&["顧客名", "住所統合"], &[]);
        let report = schema.validate(&t);
        assert_eq!(report.missing_required, vec!["電話番号".to_string()]);
        assert!(report.missing_optional.contains(&"IDの頭にID".to_string()));
        assert!(!report.missing_optional.contains(&"住所統合".to_string()));
        assert_eq!(report.errors().len(), 1);
    }

    #[test]
    fn test_call_validation_complete() {
        let schema = CallSchema::default();
        let t = Table::from_rows(
            &["社名", "電話番号", "ステータス", "架電結果", "要約", "通話時間"],
            &[],
        );
        assert!(schema.validate(&t).is_complete());
    }
}
