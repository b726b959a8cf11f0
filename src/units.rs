/// Emission-factor unit families the estimator knows how to convert to grams.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnitKind {
    /// g of pollutant per kg of material burned or used.
    GramsPerKilogram,
    /// µg of pollutant per J of energy.
    MicrogramsPerJoule,
    /// mg of pollutant per hour of activity.
    MilligramsPerHour,
    /// mg of pollutant per kg of material.
    MilligramsPerKilogram,
    /// Anything outside the four families above.
    Unrecognized,
}

/// Classification rules, evaluated top to bottom. First hit wins.
///
/// A stem only matches when it is not glued to a preceding prefix letter, so
/// "mg/kg" is never read as "g/kg" and "ug/kg" stays unrecognized. A leading
/// magnitude such as "0.5g/kg" does not block the match.
pub const UNIT_RULES: &[(&str, UnitKind)] = &[
    ("g/kg", UnitKind::GramsPerKilogram),
    ("ug/j", UnitKind::MicrogramsPerJoule),
    ("\u{b5}g/j", UnitKind::MicrogramsPerJoule),
    ("\u{3bc}g/j", UnitKind::MicrogramsPerJoule),
    ("mg/h", UnitKind::MilligramsPerHour),
    ("mg/kg", UnitKind::MilligramsPerKilogram),
];

impl UnitKind {
    /// Classify free-form unit text, e.g. "g/kg-fuel" or " µg/J ".
    pub fn classify(unit: &str) -> UnitKind {
        let u = unit.trim().to_lowercase();
        UNIT_RULES
            .iter()
            .find(|(stem, _)| contains_stem(&u, stem))
            .map(|(_, kind)| *kind)
            .unwrap_or(UnitKind::Unrecognized)
    }

    /// False only for [`UnitKind::Unrecognized`].
    pub fn is_recognized(&self) -> bool {
        !matches!(self, UnitKind::Unrecognized)
    }

    /// Unit the activity amount must be given in for this EF family.
    pub fn amount_hint(&self) -> Option<&'static str> {
        match self {
            UnitKind::GramsPerKilogram | UnitKind::MilligramsPerKilogram => Some("kg"),
            UnitKind::MicrogramsPerJoule => Some("J"),
            UnitKind::MilligramsPerHour => Some("h"),
            UnitKind::Unrecognized => None,
        }
    }

    /// Mass in grams for `amount` of activity at emission factor `factor`.
    /// Returns `None` for unrecognized units.
    pub fn to_grams(&self, amount: f64, factor: f64) -> Option<f64> {
        match self {
            UnitKind::GramsPerKilogram => Some(amount * factor),
            UnitKind::MicrogramsPerJoule => Some(amount * factor / 1e6),
            UnitKind::MilligramsPerHour | UnitKind::MilligramsPerKilogram => {
                Some(amount * factor / 1000.0)
            }
            UnitKind::Unrecognized => None,
        }
    }
}

/// True when `stem` occurs in `haystack` without a letter (micro sign
/// included) directly in front of it.
fn contains_stem(haystack: &str, stem: &str) -> bool {
    haystack.match_indices(stem).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !(c.is_alphabetic() || c == '\u{b5}'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_recognized_families() {
        assert_eq!(UnitKind::classify("g/kg"), UnitKind::GramsPerKilogram);
        assert_eq!(UnitKind::classify("ug/J"), UnitKind::MicrogramsPerJoule);
        assert_eq!(UnitKind::classify("µg/J"), UnitKind::MicrogramsPerJoule);
        assert_eq!(UnitKind::classify("mg/h"), UnitKind::MilligramsPerHour);
        assert_eq!(UnitKind::classify("mg/kg"), UnitKind::MilligramsPerKilogram);
    }

    #[test]
    fn test_classify_is_substring_and_case_insensitive() {
        assert_eq!(UnitKind::classify("  G/KG-fuel "), UnitKind::GramsPerKilogram);
        assert_eq!(UnitKind::classify("g/kg dry"), UnitKind::GramsPerKilogram);
        assert_eq!(UnitKind::classify("mg/h per burner"), UnitKind::MilligramsPerHour);
    }

    #[test]
    fn test_mg_per_kg_is_not_read_as_g_per_kg() {
        assert_eq!(UnitKind::classify("mg/kg"), UnitKind::MilligramsPerKilogram);
        assert_eq!(UnitKind::classify("MG/KG tobacco"), UnitKind::MilligramsPerKilogram);
        assert_eq!(UnitKind::classify("ug/kg"), UnitKind::Unrecognized);
        assert_eq!(UnitKind::classify("\u{b5}g/kg"), UnitKind::Unrecognized);
    }

    #[test]
    fn test_leading_magnitude_does_not_block_stem() {
        assert_eq!(UnitKind::classify("0.5g/kg"), UnitKind::GramsPerKilogram);
        assert_eq!(UnitKind::classify("2mg/kg"), UnitKind::MilligramsPerKilogram);
        assert_eq!(UnitKind::classify("10mg/h"), UnitKind::MilligramsPerHour);
        assert_eq!(UnitKind::classify("1e-3ug/J"), UnitKind::MicrogramsPerJoule);
    }

    #[test]
    fn test_classify_unrecognized() {
        assert_eq!(UnitKind::classify("ppb"), UnitKind::Unrecognized);
        assert_eq!(UnitKind::classify("ng/m3"), UnitKind::Unrecognized);
        assert_eq!(UnitKind::classify(""), UnitKind::Unrecognized);
        assert!(!UnitKind::classify("particles/cm3").is_recognized());
    }

    #[test]
    fn test_to_grams_per_family() {
        assert_eq!(UnitKind::GramsPerKilogram.to_grams(2.5, 3.0), Some(2.5 * 3.0));
        assert_eq!(
            UnitKind::MicrogramsPerJoule.to_grams(4.0e6, 0.25),
            Some(4.0e6 * 0.25 / 1_000_000.0)
        );
        assert_eq!(UnitKind::MilligramsPerHour.to_grams(2.0, 15.0), Some(2.0 * 15.0 / 1000.0));
        assert_eq!(
            UnitKind::MilligramsPerKilogram.to_grams(0.5, 40.0),
            Some(0.5 * 40.0 / 1000.0)
        );
        assert_eq!(UnitKind::Unrecognized.to_grams(1.0, 1.0), None);
    }

    #[test]
    fn test_amount_hint() {
        assert_eq!(UnitKind::GramsPerKilogram.amount_hint(), Some("kg"));
        assert_eq!(UnitKind::MicrogramsPerJoule.amount_hint(), Some("J"));
        assert_eq!(UnitKind::MilligramsPerHour.amount_hint(), Some("h"));
        assert_eq!(UnitKind::Unrecognized.amount_hint(), None);
    }
}
