//! Aging data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{DocumentId, PartyId};

/// Which side of the books a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Customer invoice awaiting receipt.
    Receivable,
    /// Vendor bill awaiting payment.
    Payable,
}

/// An invoice or bill with an amount still to settle.
///
/// Documents are supplied by the caller; the ledger does not store them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingDocument {
    /// Document ID.
    pub id: DocumentId,
    /// Receivable or payable.
    pub kind: DocumentKind,
    /// Counterparty.
    pub party_id: PartyId,
    /// Counterparty display name.
    pub party_name: String,
    /// Document number.
    pub reference: String,
    /// Issue date.
    pub issue_date: NaiveDate,
    /// Due date; the issue date when absent.
    pub due_date: Option<NaiveDate>,
    /// Document total.
    pub total: Decimal,
    /// Amount settled so far.
    pub settled: Decimal,
}

impl OutstandingDocument {
    /// Amount still to settle.
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.total - self.settled
    }

    /// Due date used for aging.
    #[must_use]
    pub fn effective_due_date(&self) -> NaiveDate {
        self.due_date.unwrap_or(self.issue_date)
    }

    /// Days past due as of the date, never negative.
    #[must_use]
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.effective_due_date()).num_days().max(0)
    }
}

/// Aging bucket by days overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgingBucket {
    /// Not yet overdue.
    Current,
    /// 1 to 30 days overdue.
    Days1To30,
    /// 31 to 60 days overdue.
    Days31To60,
    /// 61 to 90 days overdue.
    Days61To90,
    /// More than 90 days overdue.
    Over90,
}

impl AgingBucket {
    /// All buckets, youngest first.
    pub const ALL: [Self; 5] = [
        Self::Current,
        Self::Days1To30,
        Self::Days31To60,
        Self::Days61To90,
        Self::Over90,
    ];

    /// Bucket for a non-negative day count.
    #[must_use]
    pub fn for_days(days_overdue: i64) -> Self {
        match days_overdue {
            i64::MIN..=0 => Self::Current,
            1..=30 => Self::Days1To30,
            31..=60 => Self::Days31To60,
            61..=90 => Self::Days61To90,
            _ => Self::Over90,
        }
    }

    /// Column label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Current => "Current",
            Self::Days1To30 => "1-30",
            Self::Days31To60 => "31-60",
            Self::Days61To90 => "61-90",
            Self::Over90 => "Over 90",
        }
    }
}

/// Remaining amounts per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketTotals {
    /// Not yet overdue.
    pub current: Decimal,
    /// 1 to 30 days.
    pub days_1_30: Decimal,
    /// 31 to 60 days.
    pub days_31_60: Decimal,
    /// 61 to 90 days.
    pub days_61_90: Decimal,
    /// Over 90 days.
    pub over_90: Decimal,
}

impl BucketTotals {
    fn slot(&mut self, bucket: AgingBucket) -> &mut Decimal {
        match bucket {
            AgingBucket::Current => &mut self.current,
            AgingBucket::Days1To30 => &mut self.days_1_30,
            AgingBucket::Days31To60 => &mut self.days_31_60,
            AgingBucket::Days61To90 => &mut self.days_61_90,
            AgingBucket::Over90 => &mut self.over_90,
        }
    }

    /// Adds an amount to one bucket.
    pub fn add(&mut self, bucket: AgingBucket, amount: Decimal) {
        *self.slot(bucket) += amount;
    }

    /// Amount in one bucket.
    #[must_use]
    pub fn get(&self, bucket: AgingBucket) -> Decimal {
        match bucket {
            AgingBucket::Current => self.current,
            AgingBucket::Days1To30 => self.days_1_30,
            AgingBucket::Days31To60 => self.days_31_60,
            AgingBucket::Days61To90 => self.days_61_90,
            AgingBucket::Over90 => self.over_90,
        }
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> Decimal {
        AgingBucket::ALL.iter().map(|b| self.get(*b)).sum()
    }
}

/// Selects which documents an aging report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingFilter {
    /// Only this kind; `None` means both.
    pub kind: Option<DocumentKind>,
    /// Only this counterparty.
    pub party_id: Option<PartyId>,
}

impl AgingFilter {
    /// Receivables only.
    #[must_use]
    pub fn receivables() -> Self {
        Self {
            kind: Some(DocumentKind::Receivable),
            party_id: None,
        }
    }

    /// Payables only.
    #[must_use]
    pub fn payables() -> Self {
        Self {
            kind: Some(DocumentKind::Payable),
            party_id: None,
        }
    }

    /// Restricts to one counterparty.
    #[must_use]
    pub fn for_party(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }

    /// Returns true if the document is selected.
    #[must_use]
    pub fn selects(&self, document: &OutstandingDocument) -> bool {
        self.kind.is_none_or(|kind| kind == document.kind)
            && self.party_id.is_none_or(|id| id == document.party_id)
    }
}

/// One document in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgedDocument {
    /// Document ID.
    pub document_id: DocumentId,
    /// Receivable or payable.
    pub kind: DocumentKind,
    /// Document number.
    pub reference: String,
    /// Due date used for aging.
    pub due_date: NaiveDate,
    /// Days past due.
    pub days_overdue: i64,
    /// Bucket the document falls in.
    pub bucket: AgingBucket,
    /// Amount still to settle.
    pub remaining: Decimal,
}

/// Aging of one counterparty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyAging {
    /// Counterparty.
    pub party_id: PartyId,
    /// Counterparty display name.
    pub party_name: String,
    /// Remaining amounts per bucket.
    pub buckets: BucketTotals,
    /// Total outstanding for the counterparty.
    pub total: Decimal,
    /// Documents, oldest due date first.
    pub documents: Vec<AgedDocument>,
}

/// Receivables/payables aging report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingReport {
    /// Reference date.
    pub as_of: NaiveDate,
    /// Filter applied.
    pub filter: AgingFilter,
    /// Remaining amounts per bucket across all counterparties.
    pub buckets: BucketTotals,
    /// Total outstanding.
    pub total_outstanding: Decimal,
    /// Counterparties by total descending, ties by name.
    pub parties: Vec<PartyAging>,
}
