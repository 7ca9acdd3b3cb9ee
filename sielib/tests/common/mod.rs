#![allow(dead_code)]

/// A small but complete export file: two years, balances, objects and two
/// vouchers, one with an escaped quote in its text.
pub const EXPORT: &str = r#"#FLAGGA 0
#PROGRAM "Bokföring Plus" 3.1
#FORMAT PC8
#GEN 20240115 "AS"
#SIETYP 4
#PROSA "Årsbokslut"
#FNR 42
#ORGNR 556677-8899
#ADRESS "Anna Svensson" "Storgatan 1" "123 45 Malmö" "040-123456"
#FNAMN "Övningsbolaget AB"
#FTYP AB
#RAR 0 20230101 20231231
#RAR -1 20220101 20221231
#TAXAR 2024
#KPTYP BAS2014
#VALUTA SEK
#KONTO 1910 "Kassa"
#KONTO 2440 "Leverantörsskulder"
#KONTO 3010 "Försäljning"
#KTYP 1910 T
#SRU 1910 7281
#DIM 1 "Kostnadsställe"
#OBJEKT 1 "100" "Försäljning"
#IB 0 1910 1000.00
#IB -1 1910 800.00
#UB 0 1910 1100.00
#UB -1 1910 1000.00
#IB 0 2440 -500.00
#UB 0 2440 -500.00
#OIB 0 1910 {1 "100"} 250.00
#RES 0 3010 -100.00
#PSALDO 0 202301 1910 {} 1050.00
#PBUDGET 0 202301 3010 {} -200.00
#VER A 1 20230105 "Kontantförsäljning" 20230106 "AS"
{
#TRANS 1910 {1 "100"} 100.00
#TRANS 3010 {} -100.00 20230105 "Sålt \"extra\""
}
#VER A 2 20230301 "Rättelse"
{
#TRANS 1910 {} 0.00
}
"#;

/// The same content as it would arrive in PC8, UTF-8 and Latin-1.
pub fn encodings(text: &str) -> [Vec<u8>; 3] {
    let pc8 = sielib::sie::encoding::encode_pc8(text);
    let (latin1, _, _) = encoding_rs::WINDOWS_1252.encode(text);
    [pc8, text.as_bytes().to_vec(), latin1.into_owned()]
}
