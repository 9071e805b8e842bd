//! Static price list for tenant changes and the branch-to-code index.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unit of measure used by the price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "szt.")]
    Piece,
    #[serde(rename = "m2")]
    SquareMeter,
    #[serde(rename = "mb")]
    LinearMeter,
    #[serde(rename = "kpl.")]
    Set,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl Unit {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Piece => "szt.",
            Self::SquareMeter => "m2",
            Self::LinearMeter => "mb",
            Self::Set => "kpl.",
            Self::Unspecified => "",
        }
    }

    /// Parses a user-supplied unit label. Blank or unknown labels yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "szt." | "szt" => Some(Self::Piece),
            "m2" | "m²" => Some(Self::SquareMeter),
            "mb" => Some(Self::LinearMeter),
            "kpl." | "kpl" => Some(Self::Set),
            _ => None,
        }
    }

    pub const fn is_specified(self) -> bool {
        !matches!(self, Self::Unspecified)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Trade category a change item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "Architektura")]
    Architecture,
    #[serde(rename = "Konstrukcja")]
    Structural,
    #[serde(rename = "Instalacje elektryczne i teletechniczne")]
    ElectricalIct,
    #[serde(rename = "Instalacja wod-kan")]
    WaterSewage,
    #[serde(rename = "Instalacja CO")]
    Heating,
    #[serde(rename = "Instalacja wentylacji")]
    Ventilation,
    #[serde(rename = "Naniesienie zmian")]
    Documentation,
}

impl Branch {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Architecture,
            Self::Structural,
            Self::ElectricalIct,
            Self::WaterSewage,
            Self::Heating,
            Self::Ventilation,
            Self::Documentation,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Architecture => "Architektura",
            Self::Structural => "Konstrukcja",
            Self::ElectricalIct => "Instalacje elektryczne i teletechniczne",
            Self::WaterSewage => "Instalacja wod-kan",
            Self::Heating => "Instalacja CO",
            Self::Ventilation => "Instalacja wentylacji",
            Self::Documentation => "Naniesienie zmian",
        }
    }

    /// Exact match on the branch label as shown on the request form.
    pub fn from_label(raw: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|branch| branch.label() == raw)
    }

    /// Price list codes applicable to the branch, in display order.
    pub const fn codes(self) -> &'static [&'static str] {
        match self {
            Self::Architecture => &[
                "RB-001", "RB-002", "RB-003", "RB-004", "RB-005", "RB-006", "RB-007", "RB-008",
                "RB-009", "RB-010", "RB-011",
            ],
            Self::Structural => &[
                "RB-001", "RB-002", "RB-003", "RB-004", "RB-005", "RB-006", "RB-011",
            ],
            Self::ElectricalIct => &[
                "EL-001", "EL-002", "EL-003", "EL-004", "EL-005", "EL-006", "EL-007", "EL-008",
                "EL-009", "EL-010",
            ],
            Self::WaterSewage => &["SA-001", "SA-003", "SA-005", "SA-006"],
            Self::Heating => &["SA-002", "SA-003", "SA-005", "SA-006"],
            Self::Ventilation => &["SA-004", "SA-005", "SA-006"],
            Self::Documentation => &["DO-001"],
        }
    }
}

/// Normalized price list identifier in the `LL-DDD` form, e.g. `EL-003`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PriceCode(String);

impl PriceCode {
    /// Accepts `el-003` as well as `EL-003` (surrounding whitespace ignored) and
    /// returns the upper-cased form. Anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 6 || bytes[2] != b'-' {
            return None;
        }
        let letters_ok = bytes[..2].iter().all(u8::is_ascii_alphabetic);
        let digits_ok = bytes[3..].iter().all(u8::is_ascii_digit);
        if !letters_ok || !digits_ok {
            return None;
        }

        Some(Self(trimmed.to_ascii_uppercase()))
    }

    pub(crate) fn from_static(code: &'static str) -> Self {
        Self(code.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PriceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PriceCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PriceCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PriceCode::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("'{raw}' is not a LL-DDD price code")))
    }
}

/// A single priced position of the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListItem {
    pub title: String,
    pub unit: Unit,
    pub price: Decimal,
}

/// Catalog row returned by branch lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListEntry {
    pub code: PriceCode,
    pub item: PriceListItem,
}

const PRICE_LIST: &[(&str, &str, Unit, i64)] = &[
    ("RB-001", "Ścianka działowa gips 8 cm – wykonanie", Unit::SquareMeter, 240),
    ("RB-002", "Likwidacja ścianki gips 8 cm (z otworem)", Unit::SquareMeter, 140),
    ("RB-003", "Ścianka działowa gips 10 cm – wykonanie", Unit::SquareMeter, 260),
    ("RB-004", "Likwidacja ścianki gips 10 cm (z otworem)", Unit::SquareMeter, 160),
    ("RB-005", "Ścianka silikat 12 cm – wykonanie", Unit::SquareMeter, 280),
    ("RB-006", "Likwidacja ściany silikat 18/24 cm", Unit::SquareMeter, 180),
    ("RB-007", "Tynk gipsowy + gruntowanie", Unit::SquareMeter, 70),
    ("RB-008", "Szpachlowanie", Unit::SquareMeter, 40),
    ("RB-009", "Usunięcie warstw posadzkowych", Unit::SquareMeter, 90),
    ("RB-010", "Uzupełnienie warstw posadzkowych", Unit::SquareMeter, 150),
    ("RB-011", "Wypełnienie bruzd w tynku", Unit::LinearMeter, 40),
    ("EL-001", "Dodatkowy wypust oświetleniowy (z wyłącznikiem)", Unit::Piece, 250),
    ("EL-002", "Dodatkowy wyłącznik do istniejącego wypustu", Unit::Piece, 170),
    ("EL-003", "Dodatkowe gniazdo elektryczne", Unit::Piece, 220),
    ("EL-004", "Dodatkowy wypust trójfazowy", Unit::Piece, 250),
    ("EL-005", "Gniazdo telefoniczne/RTV/INT", Unit::Piece, 250),
    ("EL-006", "Gniazdo antenowe", Unit::Piece, 250),
    ("EL-007", "Dodatkowy obwód elektryczny z zabezpieczeniem", Unit::Piece, 700),
    ("EL-008", "Demontaż punktu elektrycznego (po rob.)", Unit::Set, 120),
    ("EL-009", "Przesunięcie punktu do 3 m (po rob.)", Unit::Piece, 230),
    ("EL-010", "Bruzdowanie", Unit::LinearMeter, 50),
    ("SA-001", "Dodatkowy punkt wod-kan (do 5 m od pionu)", Unit::Set, 700),
    ("SA-002", "Nowe podejście do grzejnika", Unit::Set, 500),
    ("SA-003", "Demontaż punktu wod-kan/CO (po rob.)", Unit::Set, 200),
    ("SA-004", "Dodatkowy punkt wentylacji bytowej", Unit::Set, 700),
    ("SA-005", "Przesunięcie wod-kan/CO/went. do 3 m (po rob.)", Unit::Set, 400),
    ("SA-006", "Bruzdowanie (sanitarne)", Unit::LinearMeter, 50),
    ("DO-001", "Naniesienie zmian na dokumentację powykonawczą", Unit::Piece, 1000),
];

/// Read-only price list shared by the whole process.
#[derive(Debug)]
pub struct PriceCatalog {
    items: BTreeMap<&'static str, PriceListItem>,
}

static STANDARD_CATALOG: OnceLock<PriceCatalog> = OnceLock::new();

impl PriceCatalog {
    /// The catalog the estimation engine prices against.
    pub fn standard() -> &'static Self {
        STANDARD_CATALOG.get_or_init(|| {
            let items = PRICE_LIST
                .iter()
                .map(|&(code, title, unit, price)| {
                    (
                        code,
                        PriceListItem {
                            title: title.to_string(),
                            unit,
                            price: Decimal::from(price),
                        },
                    )
                })
                .collect();
            Self { items }
        })
    }

    pub fn get(&self, code: &PriceCode) -> Option<&PriceListItem> {
        self.items.get(code.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Catalog rows for a branch label in the branch's declared order. Unknown
    /// branches produce an empty list.
    pub fn price_list_for_branch(&self, branch: &str) -> Vec<PriceListEntry> {
        let Some(branch) = Branch::from_label(branch) else {
            return Vec::new();
        };

        branch
            .codes()
            .iter()
            .filter_map(|&code| {
                self.items.get(code).map(|item| PriceListEntry {
                    code: PriceCode::from_static(code),
                    item: item.clone(),
                })
            })
            .collect()
    }
}

/// Branch price list lookup against the standard catalog.
pub fn lookup_price_list(branch: &str) -> Vec<PriceListEntry> {
    PriceCatalog::standard().price_list_for_branch(branch)
}
