use super::{Context, Diagnostic, Origin, Validator};
use crate::sie::reader::{lines, Line, KNOWN_TAGS};

const REQUIRED: [&str; 6] = ["#FLAGGA", "#PROGRAM", "#FORMAT", "#GEN", "#SIETYP", "#FNAMN"];
const REQUIRED_WITH_BALANCES: [&str; 5] = ["#RAR", "#KONTO", "#IB", "#UB", "#RES"];
const CRITICAL: [&str; 3] = ["#FLAGGA", "#SIETYP", "#FNAMN"];

/// Checks on normalized text that survive a failed build: line shape,
/// unknown and missing tags, and the fields a `#TRANS` cannot do without.
pub struct TextValidator;

impl Validator for TextValidator {
    type Entity = str;

    fn validate(&self, text: &str, ctx: &Context<'_>, out: &mut Vec<Diagnostic>) {
        let lines = lines(text);

        for line in &lines {
            match line.tag() {
                "{" | "}" => {}
                _ if !line.is_tagged() => out.push(
                    Diagnostic::warning(
                        Origin::Text,
                        format!("line {} does not start with a tag", line.number),
                    )
                    .with_line(Some(line.raw)),
                ),
                tag if !KNOWN_TAGS.contains(&tag) => out.push(
                    Diagnostic::info(Origin::Text, format!("unknown tag on line {}", line.number))
                        .with_tag(tag)
                        .with_line(Some(line.raw)),
                ),
                "#FORMAT" => {
                    let format = line.token(1).unwrap_or_default();
                    if !format.eq_ignore_ascii_case("PC8") {
                        out.push(
                            Diagnostic::info(
                                Origin::Text,
                                format!("declared format '{format}' is not PC8"),
                            )
                            .with_tag("#FORMAT")
                            .with_line(Some(line.raw)),
                        );
                    }
                }
                "#TRANS" => transaction(line, out),
                _ => {}
            }
        }

        let mut required = REQUIRED.to_vec();
        if ctx.variant.carries_balances() {
            required.extend(REQUIRED_WITH_BALANCES);
        }
        for tag in required {
            if lines.iter().any(|l| l.tag() == tag) {
                continue;
            }
            let message = format!("mandatory tag missing for {:?}", ctx.variant);
            let d = if CRITICAL.contains(&tag) {
                Diagnostic::critical(Origin::Text, message)
            } else {
                Diagnostic::warning(Origin::Text, message)
            };
            out.push(d.with_tag(tag));
        }
    }
}

fn transaction(line: &Line<'_>, out: &mut Vec<Diagnostic>) {
    let blank = |i: usize| line.token(i).map_or(true, |t| t.trim_matches('"').is_empty());
    let objects_at = |i: usize| line.token(i).is_some_and(|t| t.starts_with('{'));

    // `#TRANS {objects} amount` has lost its account; the amount stays second
    let no_account = blank(1) || objects_at(1);
    let amount_at = if !objects_at(1) && objects_at(2) { 3 } else { 2 };
    for (missing, field) in [(no_account, "account"), (blank(amount_at), "amount")] {
        if missing {
            out.push(
                Diagnostic::critical(
                    Origin::Transaction,
                    format!("transaction on line {} has no {field}", line.number),
                )
                .with_tag("#TRANS")
                .with_line(Some(line.raw)),
            );
        }
    }
}
