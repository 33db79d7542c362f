//! Scanners for the parts of `keymap.c` the host tools need: the custom keycode enum and
//! the layer notifier table.

use indexmap::IndexMap;
use log::debug;
use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{CustomKeycodesJson, KeyToLayerJson};

// Pest parser using the grammar files
#[derive(Parser)]
#[grammar = "keymap.pest"]
pub(crate) struct KeymapParser;

/// Remove `/* */` comments, then `//` comments up to the end of line
pub fn strip_c_comments(text: &str) -> String {
    let mut without_block = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        match rest[start + 2..].find("*/") {
            Some(end) => {
                without_block.push_str(&rest[..start]);
                rest = &rest[start + 2 + end + 2..];
            }
            // Unterminated, keep it
            None => break,
        }
    }
    without_block.push_str(rest);

    let mut stripped = String::with_capacity(without_block.len());
    let mut rest = without_block.as_str();
    while let Some(start) = rest.find("//") {
        stripped.push_str(&rest[..start]);
        rest = match rest[start..].find('\n') {
            Some(end) => &rest[start + end..],
            None => "",
        };
    }
    stripped.push_str(rest);
    stripped
}

fn parse_error(what: &str, e: pest::error::Error<Rule>) -> ConfigError {
    ConfigError::Parse(format!("{} not found in keymap.c: {}", what, e))
}

/// Number the entries of `enum custom_keycodes` from `safe_range`.
///
/// `NAME = SAFE_RANGE` restarts the numbering at `safe_range`, other initializers are not evaluated.
pub fn parse_custom_keycodes(source: &str, safe_range: u16) -> ConfigResult<CustomKeycodesJson> {
    let source = strip_c_comments(source);
    let pairs = KeymapParser::parse(Rule::custom_keycodes_source, &source)
        .map_err(|e| parse_error("enum custom_keycodes", e))?;

    let mut keycodes = IndexMap::new();
    let mut current_code = safe_range;
    for entry in pairs.flatten().filter(|p| p.as_rule() == Rule::enum_entry) {
        let mut inner = entry.into_inner();
        let name = inner
            .next()
            .ok_or_else(|| ConfigError::Parse("Missing enum entry name".to_string()))?
            .as_str();
        if let Some(value) = inner.next() {
            if value.as_str().trim() == "SAFE_RANGE" {
                current_code = safe_range;
            }
        }
        debug!("Custom keycode {} = 0x{:04X}", name, current_code);
        keycodes.insert(format!("0x{:04X}", current_code), name.to_string());
        current_code = current_code.wrapping_add(1);
    }
    Ok(keycodes)
}

/// Entries of `notifier_key_to_layer[]`, in layer order
pub fn parse_notifier_keys(source: &str) -> ConfigResult<Vec<String>> {
    let source = strip_c_comments(source);
    let pairs = KeymapParser::parse(Rule::notifier_source, &source)
        .map_err(|e| parse_error("notifier_key_to_layer array", e))?;

    let keys: Vec<String> = pairs
        .flatten()
        .filter(|p| p.as_rule() == Rule::notifier_entry)
        .map(|p: Pair<Rule>| p.as_str().trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keys.is_empty() {
        return Err(ConfigError::Parse("notifier_key_to_layer array is empty".to_string()));
    }
    Ok(keys)
}

/// `KC_F13` or `F13` becomes `f13`
fn normalize_notifier_key(entry: &str) -> ConfigResult<String> {
    let unsupported = || ConfigError::Parse(format!("Unsupported notifier keycode: {}", entry));
    let digits = entry.strip_prefix("KC_").unwrap_or(entry).strip_prefix('F').ok_or_else(unsupported)?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(unsupported());
    }
    let number: u32 = digits.parse().map_err(|_| unsupported())?;
    Ok(format!("f{}", number))
}

/// Map each notifier key to the name of its layer, `"f13" -> "<prefix>L0"`
pub fn key_to_layer(notifier_keys: &[String], prefix: &str) -> ConfigResult<KeyToLayerJson> {
    let mut mapping = IndexMap::new();
    for (idx, entry) in notifier_keys.iter().enumerate() {
        mapping.insert(normalize_notifier_key(entry)?, format!("{}L{}", prefix, idx));
    }
    Ok(mapping)
}
