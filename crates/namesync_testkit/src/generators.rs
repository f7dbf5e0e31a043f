//! Property-based test generators using proptest.
//!
//! Provides strategies for MAC addresses rendered in the different
//! textual forms the platforms report.

use proptest::prelude::*;

/// How a MAC address is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacStyle {
    /// `AA:BB:CC:DD:EE:FF`
    Colon,
    /// `AA-BB-CC-DD-EE-FF`
    Hyphen,
    /// `AABBCCDDEEFF`
    Bare,
}

impl MacStyle {
    /// Renders six octets in this style, upper- or lowercase.
    pub fn render(self, octets: &[u8; 6], uppercase: bool) -> String {
        let pairs: Vec<String> = octets
            .iter()
            .map(|b| {
                if uppercase {
                    format!("{b:02X}")
                } else {
                    format!("{b:02x}")
                }
            })
            .collect();
        match self {
            MacStyle::Colon => pairs.join(":"),
            MacStyle::Hyphen => pairs.join("-"),
            MacStyle::Bare => pairs.concat(),
        }
    }
}

/// Strategy for raw MAC octets.
pub fn octets_strategy() -> impl Strategy<Value = [u8; 6]> {
    prop::array::uniform6(any::<u8>())
}

/// Strategy for formatting styles.
pub fn mac_style_strategy() -> impl Strategy<Value = MacStyle> {
    prop_oneof![
        Just(MacStyle::Colon),
        Just(MacStyle::Hyphen),
        Just(MacStyle::Bare)
    ]
}

/// Strategy for well-formed MAC strings in any style and case.
///
/// Yields the octets alongside the rendered string so tests can compare
/// against a canonical rendering.
pub fn mac_string_strategy() -> impl Strategy<Value = ([u8; 6], String)> {
    (octets_strategy(), mac_style_strategy(), any::<bool>())
        .prop_map(|(octets, style, upper)| (octets, style.render(&octets, upper)))
}

/// Strategy for arbitrary, mostly malformed, hardware address strings.
pub fn messy_mac_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9A-Za-z:\\- ]{0,24}").expect("Invalid regex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_styles() {
        let octets = [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff];
        assert_eq!(MacStyle::Colon.render(&octets, true), "AA:BB:CC:DD:EE:FF");
        assert_eq!(MacStyle::Hyphen.render(&octets, false), "aa-bb-cc-dd-ee-ff");
        assert_eq!(MacStyle::Bare.render(&octets, true), "AABBCCDDEEFF");
    }
}
