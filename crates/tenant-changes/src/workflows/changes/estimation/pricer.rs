use rust_decimal::Decimal;

use super::super::catalog::{PriceCatalog, PriceCode, Unit};
use super::super::domain::ChangeItem;
use super::PricedRow;

/// Prices a single item against the catalog using an already resolved code.
pub(crate) fn price_line(
    item: &ChangeItem,
    code: Option<PriceCode>,
    catalog: &PriceCatalog,
) -> PricedRow {
    let listed = code.as_ref().and_then(|code| catalog.get(code));

    // A catalog unit overrides whatever unit the buyer typed.
    let unit = match listed {
        Some(entry) if entry.unit.is_specified() => entry.unit,
        _ => item
            .unit
            .or_else(|| listed.map(|entry| entry.unit))
            .unwrap_or(Unit::Unspecified),
    };

    let title = match (listed, &code) {
        (Some(entry), _) if !entry.title.is_empty() => entry.title.clone(),
        _ if !item.description.is_empty() => item.description.clone(),
        (_, Some(code)) => code.to_string(),
        _ => String::new(),
    };

    let unit_price = listed.map(|entry| entry.price);
    let line_total = unit_price.map(|price| price * Decimal::from(item.qty.get()));

    PricedRow {
        room: item.room.clone(),
        branch: item.branch.clone(),
        description: item.description.clone(),
        qty: item.qty,
        comment: item.comment.clone(),
        technical_analysis: item.technical_analysis.clone(),
        code,
        title,
        unit,
        unit_price,
        manual: line_total.is_none(),
        line_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::changes::domain::Quantity;

    fn priced(item: &ChangeItem, code: &str) -> PricedRow {
        price_line(item, PriceCode::parse(code), PriceCatalog::standard())
    }

    #[test]
    fn catalog_unit_overrides_user_unit() {
        let item = ChangeItem::new("Pokój", "Architektura", "ścianka", Quantity::new(4))
            .with_unit(Unit::Piece);
        let row = priced(&item, "RB-001");

        assert_eq!(row.unit, Unit::SquareMeter);
        assert_eq!(row.unit_price, Some(Decimal::from(240)));
        assert_eq!(row.line_total, Some(Decimal::from(960)));
        assert!(!row.manual);
    }

    #[test]
    fn outlet_line_matches_reference_values() {
        let item = ChangeItem::new("Kuchnia", "", "", Quantity::new(3)).with_code("EL-003");
        let row = priced(&item, "EL-003");

        assert_eq!(row.title, "Dodatkowe gniazdo elektryczne");
        assert_eq!(row.unit, Unit::Piece);
        assert_eq!(row.unit_price, Some(Decimal::from(220)));
        assert_eq!(row.line_total, Some(Decimal::from(660)));
        assert!(!row.manual);
    }

    #[test]
    fn unknown_code_is_left_for_manual_pricing() {
        let item = ChangeItem::new("Łazienka", "", "", Quantity::ONE).with_unit(Unit::Set);
        let row = priced(&item, "ZZ-999");

        assert!(row.manual);
        assert_eq!(row.unit_price, None);
        assert_eq!(row.line_total, None);
        assert_eq!(row.unit, Unit::Set);
        assert_eq!(row.title, "ZZ-999");
        assert_eq!(row.code.as_ref().map(PriceCode::as_str), Some("ZZ-999"));
    }

    #[test]
    fn unresolved_item_keeps_description_as_title() {
        let item = ChangeItem::new("Pokój", "Architektura", "malowanie ścian", Quantity::ONE);
        let row = price_line(&item, None, PriceCatalog::standard());

        assert!(row.manual);
        assert_eq!(row.title, "malowanie ścian");
        assert_eq!(row.unit, Unit::Unspecified);
        assert_eq!(row.code, None);
    }
}
