//! Aging computation.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::PartyId;

use super::types::{
    AgedDocument, AgingBucket, AgingFilter, AgingReport, BucketTotals, OutstandingDocument,
    PartyAging,
};

/// Buckets the outstanding documents by days overdue as of a date.
///
/// Documents with nothing left to settle are skipped. Every remaining amount
/// lands in exactly one bucket, so the bucket totals sum to the outstanding
/// total both globally and per counterparty.
#[must_use]
pub fn aging_report(
    documents: &[OutstandingDocument],
    as_of: NaiveDate,
    filter: &AgingFilter,
) -> AgingReport {
    let mut buckets = BucketTotals::default();
    let mut parties: HashMap<PartyId, PartyAging> = HashMap::new();

    for document in documents.iter().filter(|d| filter.selects(d)) {
        let remaining = document.remaining();
        if remaining <= Decimal::ZERO {
            continue;
        }

        let days_overdue = document.days_overdue(as_of);
        let bucket = AgingBucket::for_days(days_overdue);
        buckets.add(bucket, remaining);

        let party = parties
            .entry(document.party_id)
            .or_insert_with(|| PartyAging {
                party_id: document.party_id,
                party_name: document.party_name.clone(),
                buckets: BucketTotals::default(),
                total: Decimal::ZERO,
                documents: Vec::new(),
            });
        party.buckets.add(bucket, remaining);
        party.total += remaining;
        party.documents.push(AgedDocument {
            document_id: document.id,
            kind: document.kind,
            reference: document.reference.clone(),
            due_date: document.effective_due_date(),
            days_overdue,
            bucket,
            remaining,
        });
    }

    let mut parties: Vec<PartyAging> = parties.into_values().collect();
    for party in &mut parties {
        party
            .documents
            .sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.reference.cmp(&b.reference)));
    }
    parties.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.party_name.cmp(&b.party_name))
            .then_with(|| a.party_id.cmp(&b.party_id))
    });

    AgingReport {
        as_of,
        filter: *filter,
        total_outstanding: buckets.total(),
        buckets,
        parties,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aging::types::DocumentKind;
    use chrono::Days;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use tally_shared::types::DocumentId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(party: (PartyId, &str), reference: &str, due: NaiveDate, total: Decimal) -> OutstandingDocument {
        OutstandingDocument {
            id: DocumentId::new(),
            kind: DocumentKind::Receivable,
            party_id: party.0,
            party_name: party.1.to_string(),
            reference: reference.to_string(),
            issue_date: due - Days::new(30),
            due_date: Some(due),
            total,
            settled: Decimal::ZERO,
        }
    }

    #[rstest]
    #[case(-5, AgingBucket::Current)]
    #[case(0, AgingBucket::Current)]
    #[case(1, AgingBucket::Days1To30)]
    #[case(30, AgingBucket::Days1To30)]
    #[case(31, AgingBucket::Days31To60)]
    #[case(60, AgingBucket::Days31To60)]
    #[case(61, AgingBucket::Days61To90)]
    #[case(90, AgingBucket::Days61To90)]
    #[case(91, AgingBucket::Over90)]
    fn test_bucket_boundaries(#[case] days: i64, #[case] expected: AgingBucket) {
        assert_eq!(AgingBucket::for_days(days), expected);
    }

    #[test]
    fn test_invoice_59_days_late_is_in_31_60() {
        let due = date(2026, 3, 1);
        let acme = (PartyId::new(), "Acme");
        let docs = vec![invoice(acme, "INV-1", due, dec!(500))];

        let report = aging_report(&docs, due + Days::new(59), &AgingFilter::default());

        assert_eq!(report.buckets.days_31_60, dec!(500));
        assert_eq!(report.total_outstanding, dec!(500));
        assert_eq!(report.parties.len(), 1);
        assert_eq!(report.parties[0].documents[0].days_overdue, 59);
        assert_eq!(report.parties[0].documents[0].bucket, AgingBucket::Days31To60);
    }

    #[test]
    fn test_not_yet_due_is_current() {
        let due = date(2026, 3, 1);
        let docs = vec![invoice((PartyId::new(), "Acme"), "INV-1", due, dec!(200))];

        let report = aging_report(&docs, date(2026, 2, 1), &AgingFilter::default());
        assert_eq!(report.buckets.current, dec!(200));
        assert_eq!(report.parties[0].documents[0].days_overdue, 0);
    }

    #[test]
    fn test_partial_settlement_ages_remaining_amount() {
        let due = date(2026, 1, 1);
        let mut doc = invoice((PartyId::new(), "Acme"), "INV-1", due, dec!(1000));
        doc.settled = dec!(400);

        let report = aging_report(&[doc], date(2026, 5, 1), &AgingFilter::default());
        assert_eq!(report.buckets.over_90, dec!(600));
        assert_eq!(report.total_outstanding, dec!(600));
    }

    #[test]
    fn test_settled_documents_are_skipped() {
        let due = date(2026, 1, 1);
        let party = (PartyId::new(), "Acme");
        let mut paid = invoice(party, "INV-1", due, dec!(300));
        paid.settled = dec!(300);
        let mut overpaid = invoice(party, "INV-2", due, dec!(300));
        overpaid.settled = dec!(350);

        let report = aging_report(&[paid, overpaid], date(2026, 2, 1), &AgingFilter::default());
        assert_eq!(report.total_outstanding, Decimal::ZERO);
        assert!(report.parties.is_empty());
    }

    #[test]
    fn test_missing_due_date_ages_from_issue_date() {
        let mut doc = invoice((PartyId::new(), "Acme"), "INV-1", date(2026, 3, 1), dec!(100));
        doc.due_date = None;
        doc.issue_date = date(2026, 1, 1);

        let report = aging_report(&[doc], date(2026, 1, 11), &AgingFilter::default());
        assert_eq!(report.buckets.days_1_30, dec!(100));
        assert_eq!(report.parties[0].documents[0].due_date, date(2026, 1, 1));
    }

    #[test]
    fn test_parties_sorted_by_total_then_name() {
        let due = date(2026, 1, 1);
        let beta = (PartyId::new(), "Beta");
        let alpha = (PartyId::new(), "Alpha");
        let gamma = (PartyId::new(), "Gamma");
        let docs = vec![
            invoice(beta, "INV-1", due, dec!(100)),
            invoice(gamma, "INV-2", due, dec!(900)),
            invoice(alpha, "INV-3", due, dec!(100)),
        ];

        let report = aging_report(&docs, due, &AgingFilter::default());
        let names: Vec<&str> = report.parties.iter().map(|p| p.party_name.as_str()).collect();
        assert_eq!(names, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[test]
    fn test_filter_by_kind_and_party() {
        let due = date(2026, 1, 1);
        let acme = (PartyId::new(), "Acme");
        let other = (PartyId::new(), "Other");
        let mut bill = invoice(acme, "BILL-1", due, dec!(70));
        bill.kind = DocumentKind::Payable;
        let docs = vec![
            invoice(acme, "INV-1", due, dec!(100)),
            invoice(other, "INV-2", due, dec!(50)),
            bill,
        ];

        let receivables = aging_report(&docs, due, &AgingFilter::receivables());
        assert_eq!(receivables.total_outstanding, dec!(150));

        let payables = aging_report(&docs, due, &AgingFilter::payables());
        assert_eq!(payables.total_outstanding, dec!(70));

        let acme_only = aging_report(&docs, due, &AgingFilter::receivables().for_party(acme.0));
        assert_eq!(acme_only.total_outstanding, dec!(100));
        assert_eq!(acme_only.parties.len(), 1);
    }

    fn documents() -> impl Strategy<Value = Vec<(usize, i64, i64, i64)>> {
        prop::collection::vec((0usize..4, 0i64..200, 1i64..100_000, 0i64..120_000), 0..40)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Buckets partition the outstanding amount with no double counting.
        #[test]
        fn prop_buckets_partition_outstanding(docs in documents(), as_of_offset in 0u64..400) {
            let parties: Vec<PartyId> = (0..4).map(|_| PartyId::new()).collect();
            let start = date(2026, 1, 1);
            let docs: Vec<OutstandingDocument> = docs
                .into_iter()
                .enumerate()
                .map(|(i, (party, due_offset, total, settled))| {
                    let mut doc = invoice(
                        (parties[party], "Party"),
                        &format!("INV-{i}"),
                        start + Days::new(due_offset.unsigned_abs()),
                        Decimal::new(total, 2),
                    );
                    doc.settled = Decimal::new(settled, 2);
                    doc
                })
                .collect();
            let as_of = start + Days::new(as_of_offset);

            let report = aging_report(&docs, as_of, &AgingFilter::default());

            let expected: Decimal = docs
                .iter()
                .map(OutstandingDocument::remaining)
                .filter(|r| *r > Decimal::ZERO)
                .sum();
            prop_assert_eq!(report.total_outstanding, expected);
            prop_assert_eq!(report.buckets.total(), expected);

            let party_total: Decimal = report.parties.iter().map(|p| p.total).sum();
            prop_assert_eq!(party_total, expected);
            for party in &report.parties {
                prop_assert_eq!(party.buckets.total(), party.total);
            }

            let document_count: usize = report.parties.iter().map(|p| p.documents.len()).sum();
            let outstanding_count = docs.iter().filter(|d| d.remaining() > Decimal::ZERO).count();
            prop_assert_eq!(document_count, outstanding_count);
        }
    }
}
