//! Captions derived from embedded generation metadata.
//!
//! Generated images carry the node graph that produced them as JSON in a PNG
//! text chunk (keyword `prompt` by default):
//!
//! ```json
//! {
//!   "3":   { "class_type": "KSampler",     "inputs": { "seed": 7 } },
//!   "202": { "class_type": "MegaPromptV2", "inputs": { "theme": "🌊 Ocean Sunset" } }
//! }
//! ```
//!
//! Node ids are opaque. The caption is the `inputs.theme` string of the first
//! node (in key order) whose type tag equals the configured node type. The
//! type tag is read from `class_type`, falling back to `type`.
//!
//! ## Normalization
//!
//! 1. Literal `\uXXXX` / `\UXXXXXXXX` escapes are decoded (some producers
//!    double-escape their strings).
//! 2. Pictographic symbols (emoji, dingbats, flags, joiners) are dropped.
//! 3. Anything that is not an ASCII letter, ASCII digit or whitespace is dropped.
//! 4. Whitespace runs collapse to one space; the ends are trimmed.
//!
//! An empty result means no caption. Missing or malformed metadata is never an
//! error, only a `warn!` in the log.

use crate::imaging::CaptionParams;
use crate::types::{Caption, ImageSource};
use log::{debug, warn};
use serde_json::Value;

/// Caption for a loaded source, using the metadata it was decoded with.
pub fn caption_for(source: &ImageSource, params: &CaptionParams) -> Option<Caption> {
    let caption = extract_caption(source.metadata(), &params.node_type);
    if caption.is_none() {
        debug!("No caption for {}", source.label);
    }
    caption
}

/// Derive a caption from raw metadata JSON.
pub fn extract_caption(metadata: Option<&str>, node_type: &str) -> Option<Caption> {
    let raw = metadata?;
    let graph: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Ignoring malformed generation metadata: {e}");
            return None;
        }
    };
    let theme = find_theme(&graph, node_type)?;
    normalize_caption(theme)
}

/// Locate `inputs.theme` on the first node whose type tag matches.
fn find_theme<'a>(graph: &'a Value, node_type: &str) -> Option<&'a str> {
    let nodes = graph.as_object()?;
    nodes
        .values()
        .filter(|node| node_type_tag(node) == Some(node_type))
        .filter_map(|node| node.get("inputs")?.get("theme")?.as_str())
        .find(|theme| !theme.trim().is_empty())
}

fn node_type_tag(node: &Value) -> Option<&str> {
    node.get("class_type")
        .or_else(|| node.get("type"))
        .and_then(Value::as_str)
}

/// Normalize free-form theme text into a caption (see the module docs).
pub fn normalize_caption(raw: &str) -> Option<Caption> {
    let decoded = decode_unicode_escapes(raw);
    let filtered: String = decoded
        .chars()
        .filter(|&c| !is_pictographic(c))
        .filter(|&c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    Caption::new(filtered.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Whether `c` is an emoji or related pictographic symbol.
fn is_pictographic(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF   // mahjong .. pictographs extended-A, incl. regional indicators
            | 0x2600..=0x27BF // misc symbols, dingbats
            | 0x2B00..=0x2BFF // arrows, stars
            | 0x2300..=0x23FF // misc technical (watch, hourglass)
            | 0xFE00..=0xFE0F // variation selectors
            | 0x200D            // zero-width joiner
            | 0x20E3            // combining keycap
            | 0xE0020..=0xE007F // tag characters
    )
}

/// Replace literal `\uXXXX` and `\UXXXXXXXX` sequences with the characters
/// they name. UTF-16 surrogate pairs written as two `\u` escapes are joined.
/// Malformed sequences are kept verbatim.
fn decode_unicode_escapes(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        match parse_escape(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('\\');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Parse one escape at the start of `s`, returning the char and bytes consumed.
fn parse_escape(s: &str) -> Option<(char, usize)> {
    let hex = |digits: &str| -> Option<u32> {
        if digits.chars().all(|c| c.is_ascii_hexdigit()) {
            u32::from_str_radix(digits, 16).ok()
        } else {
            None
        }
    };

    if let Some(body) = s.strip_prefix("\\U") {
        let code = hex(body.get(..8)?)?;
        return char::from_u32(code).map(|c| (c, 10));
    }

    let body = s.strip_prefix("\\u")?;
    let unit = hex(body.get(..4)?)?;
    if (0xD800..0xDC00).contains(&unit) {
        // High surrogate: needs a low surrogate right after
        let low = hex(body.get(4..10)?.strip_prefix("\\u")?)?;
        if !(0xDC00..0xE000).contains(&low) {
            return None;
        }
        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(code).map(|c| (c, 12));
    }
    char::from_u32(unit).map(|c| (c, 6))
}
