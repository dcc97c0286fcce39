//! Parsing of configured mail addresses.

use crate::models::Recipient;
use once_cell::sync::Lazy;
use regex::Regex;

static NAMED_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*<(.+?)>$").expect("Invalid address pattern"));

/// Parse `"Display Name <email@domain>"` or a bare `"email@domain"`.
///
/// Never fails: anything that does not match the named form is taken as a
/// bare address with an empty name.
pub fn parse_email_address(address: &str) -> Recipient {
    let trimmed = address.trim();

    match NAMED_ADDRESS.captures(trimmed) {
        Some(caps) => Recipient::new(caps[1].trim(), caps[2].trim()),
        None => Recipient::new("", trimmed),
    }
}
