use super::super::catalog::PriceCode;
use super::super::domain::ChangeItem;

/// Lower-cased, trimmed text a keyword rule is evaluated against.
pub(crate) struct Subject {
    description: String,
    branch: String,
}

impl Subject {
    pub(crate) fn new(description: &str, branch: &str) -> Self {
        Self {
            description: description.trim().to_lowercase(),
            branch: branch.trim().to_lowercase(),
        }
    }

    fn says(&self, needle: &str) -> bool {
        self.description.contains(needle)
    }

    fn says_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.description.contains(needle))
    }

    fn branch_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|needle| self.branch.contains(needle))
    }
}

/// Keyword rule mapping a description to a price list code.
pub(crate) struct ClassificationRule {
    pub(crate) code: &'static str,
    pub(crate) matches: fn(&Subject) -> bool,
}

/// Evaluated top to bottom, first hit wins. A description mentioning both an
/// outlet and a switch is priced as an outlet.
pub(crate) const RULES: &[ClassificationRule] = &[
    // electrical
    ClassificationRule {
        code: "EL-003",
        matches: |s| s.says("gniazdo"),
    },
    ClassificationRule {
        code: "EL-001",
        matches: |s| s.says("wypust") && s.says("oświet"),
    },
    ClassificationRule {
        code: "EL-004",
        matches: |s| s.says("trójfaz"),
    },
    ClassificationRule {
        code: "EL-002",
        matches: |s| s.says("wyłącznik"),
    },
    ClassificationRule {
        code: "EL-006",
        matches: |s| s.says("anteno"),
    },
    ClassificationRule {
        code: "EL-005",
        matches: |s| s.says_any(&["telefon", "rtv", "int"]),
    },
    ClassificationRule {
        code: "EL-007",
        matches: |s| s.says_any(&["obwód", "zabezpieczen"]),
    },
    ClassificationRule {
        code: "EL-010",
        matches: |s| s.says("bruzd") && s.branch_any(&["elek", "teletech"]),
    },
    // sanitary
    ClassificationRule {
        code: "SA-001",
        matches: |s| s.says_any(&["wod", "kan", "umywalk", "zlew", "zmywark", "pralk"]),
    },
    ClassificationRule {
        code: "SA-002",
        matches: |s| s.says("grzejnik"),
    },
    ClassificationRule {
        code: "SA-003",
        matches: |s| s.says("demontaż") && s.says_any(&["wod", "co"]),
    },
    ClassificationRule {
        code: "SA-004",
        matches: |s| s.says("wentylac"),
    },
    ClassificationRule {
        code: "SA-005",
        matches: |s| s.says("przesunię") && s.says_any(&["wod", "co", "went"]),
    },
    ClassificationRule {
        code: "SA-006",
        matches: |s| s.says("bruzd") && s.branch_any(&["wod", "sanit", "co"]),
    },
    // construction
    ClassificationRule {
        code: "RB-001",
        matches: |s| s.says("ściank") && s.says_any(&["wykona", "postawi"]),
    },
    ClassificationRule {
        code: "RB-002",
        matches: |s| s.says_any(&["likwid", "rozbiór"]),
    },
    ClassificationRule {
        code: "RB-007",
        matches: |s| s.says("tynk"),
    },
    ClassificationRule {
        code: "RB-008",
        matches: |s| s.says("szpachl"),
    },
    ClassificationRule {
        code: "RB-009",
        matches: |s| s.says("posadzk") && s.says("usun"),
    },
    ClassificationRule {
        code: "RB-010",
        matches: |s| s.says("posadzk") && s.says_any(&["uzup", "wylew"]),
    },
    ClassificationRule {
        code: "RB-011",
        matches: |s| s.says("bruzd") && s.branch_any(&["arch", "konstr"]),
    },
    // documentation
    ClassificationRule {
        code: "DO-001",
        matches: |s| s.says("dokumentac"),
    },
];

/// Guesses a price list code from the free-text description and branch.
pub fn guess_code(description: &str, branch: &str) -> Option<PriceCode> {
    let subject = Subject::new(description, branch);
    RULES
        .iter()
        .find(|rule| (rule.matches)(&subject))
        .map(|rule| PriceCode::from_static(rule.code))
}

/// Resolves the code an item is priced with. A well-formed user code always
/// wins; a malformed one is ignored and the description is classified instead.
pub fn resolve(item: &ChangeItem) -> Option<PriceCode> {
    item.code
        .as_deref()
        .and_then(PriceCode::parse)
        .or_else(|| guess_code(&item.description, &item.branch))
}
