//! Country code normalization for chapter displays.

use crate::ebml::{ids, Element, Value};

/// Maps country codes to their top-level-domain form.
pub trait CountryCodeMapper {
    /// The ccTLD for `code`, or `None` if no mapping applies.
    fn map_to_cctld(&self, code: &str) -> Option<String>;
}

/// Built-in mapping: ISO 3166 alpha-3 codes to ccTLDs, plus the
/// ccTLDs that differ from their alpha-2 code.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCountryCodes;

const CCTLD_EXCEPTIONS: &[(&str, &str)] = &[("gb", "uk")];

const ALPHA3_TO_CCTLD: &[(&str, &str)] = &[
    ("arg", "ar"),
    ("aus", "au"),
    ("aut", "at"),
    ("bel", "be"),
    ("bra", "br"),
    ("can", "ca"),
    ("che", "ch"),
    ("chn", "cn"),
    ("cze", "cz"),
    ("deu", "de"),
    ("dnk", "dk"),
    ("esp", "es"),
    ("fin", "fi"),
    ("fra", "fr"),
    ("gbr", "uk"),
    ("grc", "gr"),
    ("hkg", "hk"),
    ("hun", "hu"),
    ("ind", "in"),
    ("irl", "ie"),
    ("ita", "it"),
    ("jpn", "jp"),
    ("kor", "kr"),
    ("mex", "mx"),
    ("nld", "nl"),
    ("nor", "no"),
    ("nzl", "nz"),
    ("pol", "pl"),
    ("prt", "pt"),
    ("rus", "ru"),
    ("swe", "se"),
    ("tur", "tr"),
    ("twn", "tw"),
    ("ukr", "ua"),
    ("usa", "us"),
];

impl CountryCodeMapper for BuiltinCountryCodes {
    fn map_to_cctld(&self, code: &str) -> Option<String> {
        let code = code.trim().to_ascii_lowercase();
        CCTLD_EXCEPTIONS
            .iter()
            .chain(ALPHA3_TO_CCTLD)
            .find(|(from, _)| *from == code)
            .map(|(_, to)| (*to).to_string())
    }
}

/// Replace every `ChapterCountry` below `chapters` with its mapped ccTLD.
///
/// Values without a mapping are left untouched.
pub fn fix_country_codes(chapters: &mut Element, mapper: &impl CountryCodeMapper) {
    chapters.walk_mut(&mut |element| {
        if !element.is(ids::CHAPTER_COUNTRY) {
            return;
        }
        if let Some(mapped) = element.as_str().and_then(|code| mapper.map_to_cctld(code)) {
            element.set_value(Value::Utf8(mapped));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(country: &str) -> Element {
        Element::master_with(
            ids::CHAPTER_DISPLAY,
            vec![
                Element::utf8(ids::CHAPTER_STRING, "x"),
                Element::utf8(ids::CHAPTER_COUNTRY, country),
            ],
        )
    }

    #[test]
    fn maps_known_codes_only() {
        let mut atom = Element::master_with(
            ids::CHAPTER_ATOM,
            vec![display("gb"), display("DEU"), display("fr")],
        );

        fix_country_codes(&mut atom, &BuiltinCountryCodes);

        let countries: Vec<_> = atom
            .children()
            .iter()
            .filter_map(|d| d.child_str(ids::CHAPTER_COUNTRY))
            .collect();
        assert_eq!(countries, vec!["uk", "de", "fr"]);
    }
}
