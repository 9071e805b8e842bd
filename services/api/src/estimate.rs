use chrono::Local;
use clap::{Args, ValueEnum};
use serde_json::Value;
use std::fmt::Write as _;
use std::path::PathBuf;
use tenant_changes::error::AppError;
use tenant_changes::workflows::changes::estimation::export::write_csv;
use tenant_changes::workflows::changes::estimation::VAT_PERCENT;
use tenant_changes::workflows::changes::intake::items_from_value;
use tenant_changes::workflows::changes::{
    estimate, lookup_price_list, Branch, ChangeItem, Estimate, IntakeError, PriceListEntry,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct EstimateArgs {
    /// JSON file holding the item list, either bare or under an "items" key
    #[arg(long)]
    pub(crate) items: PathBuf,
    /// Output layout
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct PriceListArgs {
    /// Branch label exactly as on the request form, e.g. "Instalacja CO"
    pub(crate) branch: String,
}

pub(crate) fn run_estimate(args: EstimateArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.items)?;
    let items = parse_items(&raw)?;
    let estimate = estimate(&items);

    match args.format {
        OutputFormat::Table => {
            println!(
                "Kosztorys zmian lokatorskich ({})",
                Local::now().date_naive()
            );
            print!("{}", render_table(&estimate));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&estimate).map_err(std::io::Error::from)?;
            println!("{json}");
        }
        OutputFormat::Csv => write_csv(&estimate, std::io::stdout().lock())?,
    }

    Ok(())
}

pub(crate) fn run_price_list(args: PriceListArgs) -> Result<(), AppError> {
    print!("{}", render_price_list(&args.branch, &lookup_price_list(&args.branch)));
    Ok(())
}

pub(crate) fn parse_items(raw: &str) -> Result<Vec<ChangeItem>, IntakeError> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
        Value::Object(mut fields) => items_from_value(fields.remove("items").unwrap_or(Value::Null)),
        other => items_from_value(other),
    }
}

pub(crate) fn render_table(estimate: &Estimate) -> String {
    let mut out = String::new();
    if estimate.rows.is_empty() {
        out.push_str("Brak pozycji\n");
    }

    for row in &estimate.rows {
        let code = row.code.as_ref().map(|code| code.as_str()).unwrap_or("----");
        let quantity = format!("{} {}", row.qty.get(), row.unit.label());
        let pricing = match (row.unit_price, row.line_total) {
            (Some(price), Some(total)) => format!("x {price:.2} = {total:.2}"),
            _ => "do analizy".to_string(),
        };
        let _ = writeln!(
            out,
            "- {} | {} | {} | {} {}",
            row.room,
            code,
            row.title,
            quantity.trim_end(),
            pricing
        );
    }

    let _ = writeln!(out, "\nNetto: {:.2}", estimate.subtotal);
    let _ = writeln!(out, "VAT {VAT_PERCENT}%: {:.2}", estimate.vat);
    let _ = writeln!(out, "Brutto: {:.2}", estimate.total);
    if estimate.manual_count > 0 {
        let _ = writeln!(out, "Pozycje do analizy: {}", estimate.manual_count);
    }
    out
}

pub(crate) fn render_price_list(branch: &str, entries: &[PriceListEntry]) -> String {
    let mut out = String::new();
    if entries.is_empty() {
        let _ = writeln!(out, "Brak pozycji dla branży '{branch}'. Dostępne branże:");
        for known in Branch::ordered() {
            let _ = writeln!(out, "- {}", known.label());
        }
        return out;
    }

    let _ = writeln!(out, "Cennik: {branch}");
    for entry in entries {
        let _ = writeln!(
            out,
            "- {} | {} | {} | {:.2} zł",
            entry.code, entry.item.title, entry.item.unit, entry.item.price
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_wrapped_item_lists() {
        let bare = parse_items(r#"[{"code":"EL-003","qty":3}]"#).expect("bare list");
        let wrapped = parse_items(r#"{"items":[{"code":"EL-003","qty":3}]}"#).expect("wrapped");
        assert_eq!(bare, wrapped);
        assert!(parse_items(r#"{"other":1}"#).expect("no items").is_empty());
        assert!(matches!(
            parse_items("42"),
            Err(IntakeError::UnsupportedItems)
        ));
    }

    #[test]
    fn table_lists_rows_and_totals() {
        let items = parse_items(
            r#"[{"room":"Kuchnia","code":"EL-003","qty":3},{"room":"Pokój","description":"Malowanie"}]"#,
        )
        .expect("items parse");
        let table = render_table(&estimate(&items));

        assert!(table.contains(
            "- Kuchnia | EL-003 | Dodatkowe gniazdo elektryczne | 3 szt. x 220.00 = 660.00"
        ));
        assert!(table.contains("- Pokój | ---- | Malowanie | 1 do analizy"));
        assert!(table.contains("Netto: 660.00"));
        assert!(table.contains("VAT 23%: 151.80"));
        assert!(table.contains("Brutto: 811.80"));
        assert!(table.contains("Pozycje do analizy: 1"));
    }

    #[test]
    fn unknown_branch_lists_known_labels() {
        let listing = render_price_list("Ogrody", &lookup_price_list("Ogrody"));
        assert!(listing.starts_with("Brak pozycji dla branży 'Ogrody'"));
        assert!(listing.contains("- Instalacja CO"));

        let heating = render_price_list("Instalacja CO", &lookup_price_list("Instalacja CO"));
        assert!(heating.contains("- SA-002 | Nowe podejście do grzejnika | kpl. | 500.00 zł"));
    }
}
