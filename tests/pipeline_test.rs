//! Integration tests for the extraction pipeline over positioned fragments.

use std::str::FromStr;
use std::sync::Arc;

use bankstmt::table::RoleSource;
use bankstmt::trace::SkipReason;
use bankstmt::validate::RejectReason;
use bankstmt::{
    summarize, CollectingTrace, ExtractConfig, Pipeline, TextFragment, Tier, TraceEvent,
};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Lay out `(y, [(x, text)])` rows as fragments.
fn page(rows: &[(f32, &[(f32, &str)])]) -> Vec<TextFragment> {
    rows.iter()
        .flat_map(|(y, cells)| {
            cells
                .iter()
                .map(move |(x, text)| TextFragment::new(*text, *x, *y))
        })
        .collect()
}

/// Date | Libellé | Débit | Crédit | Solde, with slightly drifting x.
fn five_column_statement() -> Vec<TextFragment> {
    page(&[
        (
            720.0,
            &[
                (40.0, "Date"),
                (120.0, "Libellé"),
                (300.0, "Débit"),
                (380.0, "Crédit"),
                (460.0, "Solde"),
            ],
        ),
        (
            700.0,
            &[
                (41.0, "01-03-2024"),
                (121.5, "PMT TOURISME REF 0041"),
                (302.0, "1,234.56"),
                (461.0, "20,000.00"),
            ],
        ),
        (
            680.0,
            &[
                (40.0, "02-03-2024"),
                (120.0, "Versement ICCN Kinshasa"),
                (381.0, "5,000.00"),
                (460.0, "25,000.00"),
            ],
        ),
        (
            660.0,
            &[
                (42.0, "03-03-2024"),
                (120.0, "FRAIS DE TENUE"),
                (300.0, "10.00"),
                (462.0, "24,990.00"),
            ],
        ),
    ])
}

fn pipeline() -> Pipeline {
    Pipeline::new(&ExtractConfig::default()).unwrap()
}

#[test]
fn test_clean_statement_uses_column_roles() {
    let result = pipeline().extract_fragments(&five_column_statement());

    assert_eq!(result.len(), 2);
    assert_eq!(result.pages[0].tier, Some(Tier::ColumnStructure));

    let first = &result.records[0];
    assert_eq!(first.date(), "01-03-2024");
    assert_eq!(first.designation(), "PMT TOURISME");
    assert_eq!(first.debit_amount(), dec("1234.56"));
    assert_eq!(first.amount(), dec("-1234.56"));

    let second = &result.records[1];
    assert_eq!(second.designation(), "ICCN");
    assert_eq!(second.credit_amount(), dec("5000.00"));
    assert_eq!(second.amount(), dec("5000.00"));

    assert!(result.validation_report().is_valid);
}

#[test]
fn test_account_title_above_header() {
    let mut fragments = vec![TextFragment::new("Type de compte: COURANT", 40.0, 740.0)];
    fragments.extend(five_column_statement());
    let result = pipeline().extract_fragments(&fragments);

    assert_eq!(result.pages[0].tier, Some(Tier::ColumnStructure));
    let amounts: Vec<(&str, Decimal, Decimal)> = result
        .records
        .iter()
        .map(|r| (r.designation(), r.debit_amount(), r.credit_amount()))
        .collect();
    assert_eq!(
        amounts,
        [
            ("PMT TOURISME", dec("1234.56"), Decimal::ZERO),
            ("ICCN", Decimal::ZERO, dec("5000.00")),
        ]
    );
}

#[test]
fn test_trace_reports_decisions() {
    let trace = Arc::new(CollectingTrace::new());
    let pipeline = pipeline().with_trace(trace.clone());
    pipeline.extract_pages([(3, five_column_statement())]);

    let events = trace.take();
    assert!(matches!(
        events.first(),
        Some(TraceEvent::PageStarted { page: 3, fragments: 17 })
    ));
    assert!(events.iter().any(|e| matches!(
        e,
        TraceEvent::RolesDetected { roles, .. }
            if roles.source == RoleSource::Header
                && roles.debit == Some(2)
                && roles.credit == Some(3)
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        TraceEvent::RowSkipped {
            row: 3,
            reason: SkipReason::NoDesignation,
            ..
        }
    )));
    assert!(matches!(
        events.last(),
        Some(TraceEvent::PageFinished {
            page: 3,
            tier: Some(Tier::ColumnStructure),
            records: 2,
        })
    ));

    let emitted = events
        .iter()
        .filter(|e| matches!(e, TraceEvent::RecordEmitted { .. }))
        .count();
    assert_eq!(emitted, 2);

    let json = serde_json::to_string(events.last().unwrap()).unwrap();
    assert!(json.contains("\"event\":\"page_finished\""));
}

#[test]
fn test_configured_designations() {
    let config = ExtractConfig::from_json_str(
        r#"{ "designations": ["FRAIS  DE TENUE"], "limits": { "max_magnitude": 100 } }"#,
    )
    .unwrap();
    let result = Pipeline::new(&config)
        .unwrap()
        .extract_fragments(&five_column_statement());

    assert_eq!(result.len(), 1);
    assert_eq!(result.records[0].designation(), "FRAIS DE TENUE");
    assert_eq!(result.records[0].debit_amount(), dec("10.00"));
}

#[test]
fn test_broken_geometry_falls_back_to_free_text() {
    // One transaction whose parts landed on separate baselines.
    let fragments = page(&[
        (700.0, &[(40.0, "04-03-2024")]),
        (688.0, &[(40.0, "ICCN paiement droits")]),
        (676.0, &[(40.0, "2,500.00")]),
    ]);
    let result = pipeline().extract_fragments(&fragments);

    assert_eq!(result.pages[0].tier, Some(Tier::FreeText));
    assert_eq!(result.len(), 1);
    assert_eq!(result.records[0].date(), "04-03-2024");
    assert_eq!(result.records[0].designation(), "ICCN");
    assert_eq!(result.records[0].debit_amount(), dec("2500.00"));
}

#[test]
fn test_zero_amount_reported_once() {
    let fragments = page(&[(700.0, &[(40.0, "01-03-2024 TRSF 0.00")])]);
    let result = pipeline().extract_fragments(&fragments);

    assert!(result.is_empty());
    assert_eq!(result.pages[0].tier, None);
    assert_eq!(result.rejected.len(), 1);
    assert_eq!(result.rejected[0].reason, RejectReason::MagnitudeTooSmall);

    let report = result.validation_report();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn test_pages_keep_order_and_empty_pages_are_not_errors() {
    let blank: Vec<TextFragment> = Vec::new();
    let result = pipeline().extract_pages([
        (1, five_column_statement()),
        (2, blank),
        (3, five_column_statement()),
    ]);

    let pages: Vec<u32> = result.records.iter().map(|r| r.page()).collect();
    assert_eq!(pages, [1, 1, 3, 3]);
    assert_eq!(result.pages.len(), 3);
    assert_eq!(result.pages[1].records, 0);

    let summaries = summarize(&result.records);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].designation, "PMT TOURISME");
    assert_eq!(summaries[0].count, 2);
    assert_eq!(summaries[0].total, dec("-2469.12"));
}

#[test]
fn test_sign_convention_on_every_record() {
    let result = pipeline().extract_fragments(&five_column_statement());
    for record in &result.records {
        assert!(record.debit_amount() >= Decimal::ZERO);
        assert!(record.credit_amount() >= Decimal::ZERO);
        assert_eq!(record.amount(), record.credit_amount() - record.debit_amount());
    }
}
