use std::io::Write;

use rust_decimal::Decimal;

use super::Estimate;

const HEADER: [&str; 10] = [
    "Pomieszczenie",
    "Branża",
    "Kod",
    "Pozycja",
    "J.m.",
    "Ilość",
    "Cena jedn.",
    "Wartość",
    "Do analizy",
    "Komentarz",
];

fn money(value: Option<Decimal>) -> String {
    value
        .map(|amount| amount.round_dp(2).to_string())
        .unwrap_or_default()
}

/// Writes the priced rows followed by the totals as semicolon separated CSV.
pub fn write_csv<W: Write>(estimate: &Estimate, writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for row in &estimate.rows {
        let code = row.code.as_ref().map(|code| code.to_string()).unwrap_or_default();
        let qty = row.qty.get().to_string();
        csv_writer.write_record([
            row.room.as_str(),
            row.branch.as_str(),
            code.as_str(),
            row.title.as_str(),
            row.unit.label(),
            qty.as_str(),
            money(row.unit_price).as_str(),
            money(row.line_total).as_str(),
            if row.manual { "tak" } else { "nie" },
            row.comment.as_deref().unwrap_or_default(),
        ])?;
    }

    csv_writer.write_record(["Netto", money(Some(estimate.subtotal)).as_str()])?;
    csv_writer.write_record(["VAT 23%", money(Some(estimate.vat)).as_str()])?;
    csv_writer.write_record(["Brutto", money(Some(estimate.total)).as_str()])?;
    csv_writer.write_record([
        "Pozycje do analizy",
        estimate.manual_count.to_string().as_str(),
    ])?;
    csv_writer.flush()?;
    Ok(())
}
