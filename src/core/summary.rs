//! Record aggregation
//!
//! Per-record out-of-spec counts and multi-record comparison statistics.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, StandardId};
use crate::core::tolerance::Dimension;
use crate::entities::measurement::MeasurementVerdict;
use crate::entities::record::ProductionRecord;

/// Issue percentage rounded to two decimals; 0 when `total` is 0
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = count as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

/// Out-of-spec counts per dimension
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub weight: usize,
    pub height: usize,
    pub rim_thickness: usize,
    pub load: usize,
    pub visual: usize,
}

impl IssueCounts {
    /// Count failures across a set of verdicts
    pub fn from_verdicts<'a, I>(verdicts: I) -> Self
    where
        I: IntoIterator<Item = &'a MeasurementVerdict>,
    {
        let mut counts = Self::default();
        for verdict in verdicts {
            for dimension in Dimension::all() {
                if !verdict.passes(*dimension) {
                    *counts.get_mut(*dimension) += 1;
                }
            }
        }
        counts
    }

    pub fn get(&self, dimension: Dimension) -> usize {
        match dimension {
            Dimension::Weight => self.weight,
            Dimension::Height => self.height,
            Dimension::RimThickness => self.rim_thickness,
            Dimension::Load => self.load,
            Dimension::Visual => self.visual,
        }
    }

    fn get_mut(&mut self, dimension: Dimension) -> &mut usize {
        match dimension {
            Dimension::Weight => &mut self.weight,
            Dimension::Height => &mut self.height,
            Dimension::RimThickness => &mut self.rim_thickness,
            Dimension::Load => &mut self.load,
            Dimension::Visual => &mut self.visual,
        }
    }

    pub fn any(&self) -> bool {
        Dimension::all().iter().any(|d| self.get(*d) > 0)
    }

    fn add(&mut self, other: &IssueCounts) {
        for dimension in Dimension::all() {
            *self.get_mut(*dimension) += other.get(*dimension);
        }
    }
}

/// Quality summary of one production record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub record_id: RecordId,
    pub product_name: String,
    pub product_number: String,
    pub machine_number: String,
    pub record_date: NaiveDateTime,
    /// Creator's full name, or "Unknown" if the user no longer exists
    pub created_by: String,
    pub total_measurements: usize,
    pub out_of_spec: IssueCounts,
}

impl RecordSummary {
    /// True iff any dimension has at least one failing item
    pub fn has_issues(&self) -> bool {
        self.out_of_spec.any()
    }
}

/// Inclusive calendar-date range; time of day is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` calendar days ending on `end` (inclusive)
    pub fn last_days(end: NaiveDate, days: u64) -> Self {
        let start = end
            .checked_sub_days(chrono::Days::new(days))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn contains(&self, when: &NaiveDateTime) -> bool {
        let date = when.date();
        self.start <= date && date <= self.end
    }

    /// Display label, e.g. "1 Mar 2024 - 31 Mar 2024"
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%-d %b %Y"),
            self.end.format("%-d %b %Y")
        )
    }
}

/// Keep records inside the range and, optionally, taken against one standard
pub fn filter_records(
    records: Vec<ProductionRecord>,
    range: &DateRange,
    standard: Option<StandardId>,
) -> Vec<ProductionRecord> {
    records
        .into_iter()
        .filter(|r| range.contains(&r.record_date))
        .filter(|r| standard.map_or(true, |s| r.standard_id == s))
        .collect()
}

/// Out-of-spec count and share for one dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionIssues {
    pub dimension: Dimension,
    pub count: usize,
    pub percent: f64,
}

/// Quality comparison across several records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub product_name: String,
    /// Machine number of the selected standard, or "All Machines"
    pub standard_label: String,
    pub date_range: String,
    pub total_records: usize,
    pub total_measurements: usize,
    pub issues: Vec<DimensionIssues>,
}

impl ComparisonReport {
    /// Aggregate a set of record summaries
    pub fn from_summaries(
        product_name: impl Into<String>,
        standard_label: impl Into<String>,
        range: &DateRange,
        summaries: &[RecordSummary],
    ) -> Self {
        let total_measurements: usize = summaries.iter().map(|s| s.total_measurements).sum();
        let mut totals = IssueCounts::default();
        for summary in summaries {
            totals.add(&summary.out_of_spec);
        }

        let issues = Dimension::all()
            .iter()
            .map(|d| DimensionIssues {
                dimension: *d,
                count: totals.get(*d),
                percent: percentage(totals.get(*d), total_measurements),
            })
            .collect();

        Self {
            product_name: product_name.into(),
            standard_label: standard_label.into(),
            date_range: range.label(),
            total_records: summaries.len(),
            total_measurements,
            issues,
        }
    }

    pub fn issue(&self, dimension: Dimension) -> Option<&DimensionIssues> {
        self.issues.iter().find(|i| i.dimension == dimension)
    }
}
