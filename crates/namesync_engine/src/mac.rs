//! Hardware address normalization.

const SEPARATORS: [char; 2] = [':', '-'];

/// Normalizes a MAC address to lowercase colon-separated pairs.
///
/// Colons and hyphens are stripped, the remainder is lowercased and a colon
/// is inserted after every two characters. Input that is not a valid MAC
/// still produces a grouped string instead of an error, so one bad record
/// can only ever fail to match.
///
/// ```
/// use namesync_engine::normalize_mac;
///
/// assert_eq!(normalize_mac("AA-BB-CC-DD-EE-FF"), "aa:bb:cc:dd:ee:ff");
/// assert_eq!(normalize_mac("aabbccddeeff"), "aa:bb:cc:dd:ee:ff");
/// ```
pub fn normalize_mac(mac: &str) -> String {
    let cleaned = mac
        .chars()
        .filter(|c| !SEPARATORS.contains(c))
        .collect::<String>()
        .to_lowercase();

    let mut normalized = String::with_capacity(cleaned.len() + cleaned.len() / 2);
    for (i, c) in cleaned.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            normalized.push(':');
        }
        normalized.push(c);
    }
    normalized
}

/// Returns true if `mac` is already in canonical `xx:xx:xx:xx:xx:xx` form.
pub fn is_canonical_mac(mac: &str) -> bool {
    let bytes = mac.as_bytes();
    bytes.len() == 17
        && bytes.iter().enumerate().all(|(i, b)| {
            if i % 3 == 2 {
                *b == b':'
            } else {
                b.is_ascii_digit() || (b'a'..=b'f').contains(b)
            }
        })
}
