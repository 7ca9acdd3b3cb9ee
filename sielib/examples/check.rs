use std::io::Read;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // SIE file on stdin -> diagnostics and checksum on stdout
    let mut bytes = Vec::new();
    std::io::stdin().read_to_end(&mut bytes)?;

    let report = sielib::validate_bytes(&bytes);
    for d in report.diagnostics() {
        println!("{d}");
    }
    if let Some(doc) = report.document() {
        println!("checksum {}", sielib::checksum(doc));
    }
    if report.has_critical() {
        std::process::exit(1);
    }
    Ok(())
}
