mod common;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use sielib::{
    model::{
        Account, AccountingPlan, Balance, Document, DocumentType, FinancialYear, MetaData,
        SourceLine, Transaction, Voucher,
    },
    sie::{OutputEncoding, Sie4, WriteOptions},
    traits::{ReadFormat, WriteFormat},
};
use std::io::Cursor;

#[test]
fn parse_render_parse_is_identity() {
    let doc = sielib::parse(common::EXPORT.as_bytes()).expect("parse");
    let rendered = sielib::render(&doc);
    let again = sielib::parse(&rendered).expect("parse rendered");
    assert_eq!(again, doc);
    assert_eq!(sielib::render(&again), rendered);
}

#[test]
fn import_file_keeps_periodical_balances() {
    let text = "#FLAGGA 0\n#SIETYP 4\n#FNAMN x\n#RAR 0 20230101 20231231\n\
                #KONTO 1910 \"Kassa\"\n#PSALDO 0 202301 1910 {} 5.00\n";
    let doc = sielib::parse(text.as_bytes()).expect("parse");
    assert_eq!(doc.meta().document_type, DocumentType::I4);

    let rendered = sielib::render(&doc);
    assert!(rendered.windows(8).any(|w| w == b"#PSALDO "));
    let again = sielib::parse(&rendered).expect("parse rendered");
    assert_eq!(again, doc);
    assert_eq!(again.account("1910").map(|a| a.periodical_balances.len()), Some(1));
}

#[test]
fn annual_export_round_trips() {
    let text = "#FLAGGA 0\n#SIETYP 1\n#FNAMN x\n#RAR 0 20230101 20231231\n\
                #KONTO 1910 \"Kassa\"\n#KONTO 3010 \"Försäljning\"\n\
                #IB 0 1910 5.00\n#UB 0 1910 7.00\n#RES 0 3010 -2.00\n";
    let doc = sielib::parse(text.as_bytes()).expect("parse");
    assert_eq!(doc.meta().document_type, DocumentType::E1);
    let again = sielib::parse(&sielib::render(&doc)).expect("parse rendered");
    assert_eq!(again, doc);
}

#[test]
fn rendering_is_canonical() {
    let doc = sielib::parse(common::EXPORT.as_bytes()).expect("parse");
    let text = String::from_utf8(sielib::render_with(
        &doc,
        &WriteOptions {
            encoding: OutputEncoding::Utf8,
        },
    ))
    .expect("utf-8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "#FLAGGA 0");
    assert_eq!(lines[1], r#"#PROGRAM "Bokföring Plus" "3.1""#);
    assert_eq!(lines[2], "#FORMAT UTF8");
    assert!(lines.contains(&"#RAR 0 20230101 20231231"));
    assert!(lines.contains(&r#"#OIB 0 1910 {1 "100"} 250.00"#));
    assert!(lines.contains(&r#"#PSALDO 0 202301 1910 {} 1050.00"#));
    assert!(lines.contains(&r#"#VER A 2 20230301 "Rättelse""#));
    assert!(lines.contains(&r#"#TRANS 1910 {1 "100"} 100.00 20230105"#));
    assert!(lines.contains(&r#"#TRANS 3010 {} -100.00 20230105 "Sålt \"extra\"""#));

    let rar0 = lines.iter().position(|l| l.starts_with("#RAR 0")).unwrap();
    let rar1 = lines.iter().position(|l| l.starts_with("#RAR -1")).unwrap();
    assert!(rar0 < rar1);
}

#[test]
fn pc8_output_encodes_swedish_letters() {
    let doc = sielib::parse(common::EXPORT.as_bytes()).expect("parse");
    let bytes = sielib::render(&doc);
    // Ö is 0x99 in code page 437
    assert!(bytes.windows(2).any(|w| w == [b'"', 0x99]));
    assert!(bytes.windows(12).any(|w| w == b"#FORMAT PC8\n"));
    assert!(std::str::from_utf8(&bytes).is_err());
}

#[test]
fn every_encoding_reads_the_same_document() {
    let [pc8, utf8, latin1] = common::encodings(common::EXPORT);
    let a = sielib::parse(&pc8).expect("pc8");
    let b = sielib::parse(&utf8).expect("utf-8");
    let c = sielib::parse(&latin1).expect("latin-1");
    assert_eq!(a.meta().company.name, "Övningsbolaget AB");
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn checksum_ignores_source_encoding() {
    let sums: Vec<String> = common::encodings(common::EXPORT)
        .iter()
        .map(|bytes| sielib::checksum(&sielib::parse(bytes).expect("parse")))
        .collect();
    assert_eq!(sums[0], sums[1]);
    assert_eq!(sums[1], sums[2]);
    assert!(sums[0].bytes().all(|b| b.is_ascii_hexdigit()));
}

#[test]
fn checksum_changes_with_content() {
    let a = sielib::parse(common::EXPORT.as_bytes()).expect("parse");
    let b = sielib::parse(common::EXPORT.replace("1100.00", "1100.01").as_bytes()).expect("parse");
    assert_ne!(sielib::checksum(&a), sielib::checksum(&b));
}

#[test]
fn reader_and_writer_traits() {
    let doc = Sie4::read(Cursor::new(common::EXPORT)).expect("read");
    let mut out = Vec::new();
    Sie4::write(&mut out, &doc).expect("write");
    let again = Sie4::read(Cursor::new(out)).expect("read back");
    assert_eq!(again, doc);
}

#[test]
fn built_document_renders_and_reads_back() {
    let date = |m, d| NaiveDate::from_ymd_opt(2023, m, d).unwrap();
    let meta = MetaData {
        financial_years: vec![FinancialYear {
            index: 0,
            start: date(1, 1),
            end: date(12, 31),
        }],
        ..Default::default()
    };

    let mut kassa = Account::new("1910", "Kassa");
    kassa
        .add_balance(
            sielib::model::BalanceKind::Opening,
            Balance {
                year_index: 0,
                amount: Decimal::new(5000, 2),
                quantity: None,
                source: SourceLine::default(),
            },
        )
        .expect("first balance");
    let plan = AccountingPlan {
        plan_type: None,
        accounts: vec![Account::new("3010", "Försäljning"), kassa],
    };

    let mut later = Voucher::new(date(2, 1));
    later.series = Some("B".into());
    let mut first = Voucher::new(date(3, 1));
    first.text = Some("utan serie".into());
    first.transactions.push(Transaction::new("1910", Decimal::new(100, 0)));
    first.transactions.push(Transaction::new("3010", Decimal::new(-100, 0)));

    let doc = Document::builder(meta)
        .plan(plan)
        .voucher(later)
        .voucher(first)
        .build()
        .expect("build");
    assert_eq!(doc.accounts()[0].number, "1910");
    assert_eq!(doc.vouchers()[0].series, None);

    let text = String::from_utf8(sielib::render_with(
        &doc,
        &WriteOptions {
            encoding: OutputEncoding::Utf8,
        },
    ))
    .expect("utf-8");
    assert!(text.contains("#VER \"\" \"\" 20230301 \"utan serie\"\n"));
    assert!(text.contains("#TRANS 1910 {} 100.00 20230301\n"));

    let again = sielib::parse(text.as_bytes()).expect("parse");
    assert_eq!(again.vouchers()[0].transactions[0].date, Some(date(3, 1)));
    assert_eq!(again.account("1910"), doc.account("1910"));
}
