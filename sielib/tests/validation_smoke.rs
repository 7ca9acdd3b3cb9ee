mod common;

use sielib::validation::{Origin, Severity};

#[test]
fn clean_export_has_no_findings() {
    let report = sielib::validate_bytes(common::EXPORT.as_bytes());
    assert!(report.document().is_some());
    assert!(report.diagnostics().is_empty(), "{:?}", report.diagnostics());
}

#[test]
fn unbalanced_voucher_reports_the_diff() {
    let text = common::EXPORT.replace("#TRANS 3010 {} -100.00", "#TRANS 3010 {} -99.99");
    let report = sielib::validate_bytes(text.as_bytes());
    let critical: Vec<_> = report
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].origin, Origin::Voucher);
    assert!(critical[0].message.contains("0.01"), "{}", critical[0].message);
    assert_eq!(
        critical[0].line.as_deref(),
        Some(r#"#VER A 1 20230105 "Kontantförsäljning" 20230106 "AS""#)
    );
}

#[test]
fn closing_balance_is_reconciled_against_transactions() {
    let text = "#FLAGGA 0\n#SIETYP 4\n#FNAMN x\n#RAR 0 20230101 20231231\n\
                #KONTO 1510 \"Kundfordringar\"\n#KONTO 3010 \"Försäljning\"\n\
                #IB 0 1510 -100.00\n#UB 0 1510 -50.00\n\
                #VER A 1 20230105\n{\n#TRANS 1510 {} 40.00\n#TRANS 3010 {} -40.00\n}\n";
    let report = sielib::validate_bytes(text.as_bytes());
    let balance: Vec<_> = report
        .diagnostics()
        .iter()
        .filter(|d| d.origin == Origin::Balance)
        .collect();
    assert_eq!(balance.len(), 1);
    let d = balance[0];
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!(d.tag.as_deref(), Some("#UB"));
    for part in ["1510", "year 0", "-50.00", "-60.00"] {
        assert!(d.message.contains(part), "{part} missing in {}", d.message);
    }
}

#[test]
fn overflowing_amounts_are_critical() {
    let text = "#FLAGGA 0\n#SIETYP 4\n#FNAMN x\n#RAR 0 20230101 20231231\n\
                #KONTO 1910 \"Kassa\"\n#UB 0 1910 0.00\n#VER A 1 20230105\n{\n\
                #TRANS 1910 {} 79228162514264337593543950335\n\
                #TRANS 1910 {} 79228162514264337593543950335\n}\n";
    let report = sielib::validate_bytes(text.as_bytes());
    assert!(report.document().is_some());
    let critical: Vec<_> = report
        .diagnostics()
        .iter()
        .filter(|d| d.severity == Severity::Critical)
        .map(|d| d.origin)
        .collect();
    assert!(critical.contains(&Origin::Voucher), "{critical:?}");
    assert!(critical.contains(&Origin::Balance), "{critical:?}");
}

#[test]
fn missing_account_before_object_list() {
    let report = sielib::validate_bytes(
        b"#FLAGGA 0\n#SIETYP 4\n#FNAMN x\n#VER A 1 20230105\n{\n#TRANS {1 \"2\"} 100.00\n}\n",
    );
    assert!(report.document().is_none());
    let trans: Vec<_> = report
        .diagnostics()
        .iter()
        .filter(|d| d.tag.as_deref() == Some("#TRANS"))
        .collect();
    assert_eq!(trans.len(), 2);
    assert!(trans.iter().all(|d| d.severity == Severity::Critical));
    assert!(trans
        .iter()
        .any(|d| d.origin == Origin::Transaction && d.message.contains("no account")));
    assert!(trans.iter().any(|d| d.origin == Origin::Document));
}

#[test]
fn fatal_error_becomes_critical_finding() {
    let report = sielib::validate_bytes(b"#FLAGGA 0\n#SIETYP 4\n#FNAMN x\n#TRANS 1910 {} 1.00\n");
    assert!(report.document().is_none());
    assert!(report.has_critical());
    let d = &report.diagnostics()[0];
    assert_eq!(d.origin, Origin::Document);
    assert_eq!(d.tag.as_deref(), Some("#TRANS"));
    assert_eq!(d.line.as_deref(), Some("#TRANS 1910 {} 1.00"));
}

#[test]
fn raw_text_findings_survive_failed_build() {
    let report = sielib::validate_bytes(b"#SIETYP 4\n#KSUMMA 1\n#TRANS \"\" {}\n");
    assert!(report.document().is_none());
    let tags: Vec<_> = report
        .diagnostics()
        .iter()
        .map(|d| (d.severity, d.tag.as_deref().unwrap_or("")))
        .collect();
    assert!(tags.contains(&(Severity::Critical, "#FLAGGA")));
    assert!(tags.contains(&(Severity::Critical, "#FNAMN")));
    assert!(tags.contains(&(Severity::Warning, "#PROGRAM")));
    assert!(tags.contains(&(Severity::Info, "#KSUMMA")));
    let trans = tags.iter().filter(|t| *t == &(Severity::Critical, "#TRANS")).count();
    // account, amount, and the build failure itself
    assert_eq!(trans, 3);
}

#[test]
fn diagnostics_are_sorted() {
    let report = sielib::validate_bytes(b"#SIETYP 1\n#KSUMMA 1\n#PROSA x\nloose\n");
    let severities: Vec<_> = report.diagnostics().iter().map(|d| d.severity).collect();
    let mut sorted = severities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(severities, sorted);
}

#[test]
fn validate_built_document() {
    let doc = sielib::parse(common::EXPORT.as_bytes()).expect("parse");
    assert!(sielib::validate(&doc).is_empty());

    let text = common::EXPORT.replace("#TRANS 1910 {} 0.00", "#TRANS 9999 {} 0.00");
    let doc = sielib::parse(text.as_bytes()).expect("parse");
    let d = sielib::validate(&doc);
    assert_eq!(d.len(), 1);
    assert_eq!(d[0].origin, Origin::Transaction);
    assert!(d[0].message.contains("9999"));
}
