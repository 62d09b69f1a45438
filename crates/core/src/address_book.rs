//! Address book domain rules and the client wire format.
//!
//! Two storage models coexist. The legacy model keeps tags and peers per
//! user, with tag colors stored as decimal strings. The shared model groups
//! peers and tags under an address book, with colors stored as packed ARGB
//! integers. Both are exchanged with clients in the same JSON envelope,
//! whose `tag_colors` field is itself a JSON-encoded object.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Reserved name of the address book backing a user's personal flow.
pub const PERSONAL_ADDRESS_BOOK_NAME: &str = "My address book";

/// Note written on lazily created personal address books.
pub const PERSONAL_ADDRESS_BOOK_NOTE: &str = "default address book";

/// Color assigned to tags created implicitly by a peer reference (`0xFF0000FF`).
pub const DEFAULT_TAG_COLOR: i64 = 0xFF00_00FF;

/// Peer cap for newly created personal address books.
pub const DEFAULT_MAX_PEER: i32 = 200;

pub const RULE_NONE: i32 = 0;
pub const RULE_READ: i32 = 1;
pub const RULE_READ_WRITE: i32 = 2;
pub const RULE_FULL_CONTROL: i32 = 3;

/// Longest rustdesk id accepted on manual peer creation.
pub const MAX_RUSTDESK_ID_LEN: usize = 100;

// ---------------------------------------------------------------------------
// Contents
// ---------------------------------------------------------------------------

/// A peer as exchanged with clients. `id` is the rustdesk id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbPeer {
    pub id: String,
    pub hash: String,
    pub username: String,
    pub hostname: String,
    pub platform: String,
    pub alias: String,
    pub tags: Vec<String>,
}

/// Resolved address book contents: ordered tag names, tag colors and peers.
///
/// A tag listed in `tags` may be absent from `tag_colors`; it then has no
/// color. Peers may reference tag names that are not in `tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressBookContents {
    pub tags: Vec<String>,
    pub tag_colors: BTreeMap<String, i64>,
    pub peers: Vec<AbPeer>,
}

impl AddressBookContents {
    /// Build contents from `(name, color)` pairs, keeping the first
    /// occurrence of each tag name.
    pub fn from_tag_pairs<I>(tags: I, peers: Vec<AbPeer>) -> Self
    where
        I: IntoIterator<Item = (String, Option<i64>)>,
    {
        let (tags, tag_colors) = merge_first_seen(tags);
        Self {
            tags,
            tag_colors,
            peers,
        }
    }

    /// Tag names with duplicates collapsed to their first occurrence.
    pub fn unique_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tags
            .iter()
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect()
    }

    pub fn color_of(&self, tag: &str) -> Option<i64> {
        self.tag_colors.get(tag).copied()
    }
}

/// Merge `(name, color)` pairs by first-seen name.
///
/// The first occurrence of a name fixes both its position and its color;
/// later occurrences are ignored even when the first had no color.
pub fn merge_first_seen<I>(pairs: I) -> (Vec<String>, BTreeMap<String, i64>)
where
    I: IntoIterator<Item = (String, Option<i64>)>,
{
    let mut names = Vec::new();
    let mut colors = BTreeMap::new();
    let mut seen = HashSet::new();
    for (name, color) in pairs {
        if !seen.insert(name.clone()) {
            continue;
        }
        if let Some(color) = color {
            colors.insert(name.clone(), color);
        }
        names.push(name);
    }
    (names, colors)
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
struct WireData {
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    peers: Vec<AbPeer>,
    #[serde(default)]
    tag_colors: String,
}

/// Serialize contents into the client `data` string.
pub fn pack(contents: &AddressBookContents) -> Result<String, CoreError> {
    let tag_colors = serde_json::to_string(&contents.tag_colors)
        .map_err(|e| CoreError::Internal(format!("Failed to encode tag colors: {e}")))?;
    let wire = WireData {
        tags: contents.tags.clone(),
        peers: contents.peers.clone(),
        tag_colors,
    };
    serde_json::to_string(&wire)
        .map_err(|e| CoreError::Internal(format!("Failed to encode address book: {e}")))
}

/// Parse a client `data` string.
///
/// An empty `tag_colors` string is treated as an empty map. Malformed JSON
/// in either layer is a validation error.
pub fn unpack(data: &str) -> Result<AddressBookContents, CoreError> {
    let wire: WireData = serde_json::from_str(data)
        .map_err(|e| CoreError::Validation(format!("Invalid address book data: {e}")))?;
    let tag_colors = if wire.tag_colors.trim().is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str(&wire.tag_colors)
            .map_err(|e| CoreError::Validation(format!("Invalid tag colors: {e}")))?
    };
    Ok(AddressBookContents {
        tags: wire.tags,
        tag_colors,
        peers: wire.peers,
    })
}

// ---------------------------------------------------------------------------
// Legacy tag colors
// ---------------------------------------------------------------------------

/// Encode a legacy tag color as a decimal string. No color encodes as `""`.
pub fn encode_legacy_color(color: Option<i64>) -> String {
    color.map(|c| c.to_string()).unwrap_or_default()
}

/// Decode a legacy decimal color string. Unparseable text means no color.
pub fn decode_legacy_color(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject a payload whose peer count exceeds a positive cap.
///
/// A cap of zero or less means unlimited.
pub fn check_peer_cap(cap: i32, peer_count: usize, what: &str) -> Result<(), CoreError> {
    if cap > 0 && peer_count > cap as usize {
        return Err(CoreError::Validation(format!(
            "Number of peers ({peer_count}) exceeds the {what} ({cap})"
        )));
    }
    Ok(())
}

/// Reject a payload whose peer count exceeds the user's licensed devices.
pub fn check_license_cap(licensed_devices: i32, peer_count: usize) -> Result<(), CoreError> {
    check_peer_cap(licensed_devices, peer_count, "licensed device count")
}

/// Validate and normalize a rustdesk id supplied for a manual peer.
pub fn validate_rustdesk_id(raw: &str) -> Result<String, CoreError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(CoreError::Validation("Rustdesk ID is required".to_string()));
    }
    if id.len() > MAX_RUSTDESK_ID_LEN {
        return Err(CoreError::Validation(format!(
            "Rustdesk ID must not exceed {MAX_RUSTDESK_ID_LEN} characters"
        )));
    }
    Ok(id.to_string())
}

/// Validate an address book access rule level.
pub fn validate_rule(rule: i32) -> Result<(), CoreError> {
    if !(RULE_NONE..=RULE_FULL_CONTROL).contains(&rule) {
        return Err(CoreError::Validation(format!(
            "Rule must be between {RULE_NONE} and {RULE_FULL_CONTROL}"
        )));
    }
    Ok(())
}

/// Validate an address book name.
pub fn validate_name(name: &str) -> Result<String, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation(
            "Address book name is required".to_string(),
        ));
    }
    Ok(name.to_string())
}

/// Fresh globally unique address book identifier.
pub fn new_guid() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn peer(id: &str, tags: &[&str]) -> AbPeer {
        AbPeer {
            id: id.to_string(),
            alias: format!("alias-{id}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    // -- merge ---------------------------------------------------------------

    #[test]
    fn first_seen_color_wins() {
        let (names, colors) = merge_first_seen(vec![
            ("work".to_string(), Some(1)),
            ("home".to_string(), None),
            ("work".to_string(), Some(2)),
            ("home".to_string(), Some(3)),
        ]);
        assert_eq!(names, vec!["work", "home"]);
        assert_eq!(colors.get("work"), Some(&1));
        assert_eq!(colors.get("home"), None);
    }

    #[test]
    fn unique_tags_keeps_order() {
        let contents = AddressBookContents {
            tags: vec!["b".into(), "a".into(), "b".into()],
            ..Default::default()
        };
        assert_eq!(contents.unique_tags(), vec!["b", "a"]);
    }

    // -- wire ----------------------------------------------------------------

    #[test]
    fn pack_nests_tag_colors_as_string() {
        let contents = AddressBookContents::from_tag_pairs(
            vec![("work".to_string(), Some(DEFAULT_TAG_COLOR))],
            vec![peer("123", &["work"])],
        );
        let packed = pack(&contents).unwrap();
        let outer: serde_json::Value = serde_json::from_str(&packed).unwrap();
        assert!(outer["tag_colors"].is_string());
        assert_eq!(outer["peers"][0]["id"], "123");
        assert_eq!(outer["tags"][0], "work");
    }

    #[test]
    fn unpack_reads_client_payload() {
        let data = r#"{"tags":["a"],"peers":[{"id":"9","tags":["a"]}],"tag_colors":"{\"a\":42}"}"#;
        let contents = unpack(data).unwrap();
        assert_eq!(contents.tags, vec!["a"]);
        assert_eq!(contents.color_of("a"), Some(42));
        assert_eq!(contents.peers[0].id, "9");
        assert_eq!(contents.peers[0].hostname, "");
    }

    #[test]
    fn unpack_accepts_missing_tag_colors() {
        let contents = unpack(r#"{"tags":[],"peers":[]}"#).unwrap();
        assert!(contents.tag_colors.is_empty());
    }

    #[test]
    fn unpack_rejects_malformed_payload() {
        assert_matches!(unpack("{"), Err(CoreError::Validation(_)));
        assert_matches!(
            unpack(r#"{"tags":[],"peers":[],"tag_colors":"nope"}"#),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn packed_contents_unpack_identically() {
        let contents = AddressBookContents::from_tag_pairs(
            vec![("x".to_string(), Some(7)), ("y".to_string(), None)],
            vec![peer("1", &["x", "dangling"])],
        );
        assert_eq!(unpack(&pack(&contents).unwrap()).unwrap(), contents);
    }

    // -- legacy colors -------------------------------------------------------

    #[test]
    fn legacy_color_round_trips_extremes() {
        for color in [0_i64, 1, DEFAULT_TAG_COLOR, u32::MAX as i64, i64::MAX] {
            assert_eq!(decode_legacy_color(&encode_legacy_color(Some(color))), Some(color));
        }
    }

    #[test]
    fn legacy_color_absent_or_garbage_is_none() {
        assert_eq!(encode_legacy_color(None), "");
        assert_eq!(decode_legacy_color(""), None);
        assert_eq!(decode_legacy_color("red"), None);
        assert_eq!(decode_legacy_color("0xFF"), None);
    }

    // -- validation ----------------------------------------------------------

    #[test]
    fn license_cap_zero_is_unlimited() {
        assert!(check_license_cap(0, 10_000).is_ok());
    }

    #[test]
    fn license_cap_is_inclusive() {
        assert!(check_license_cap(2, 2).is_ok());
        assert_matches!(check_license_cap(2, 3), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rustdesk_id_is_trimmed_and_required() {
        assert_eq!(validate_rustdesk_id("  123456 ").unwrap(), "123456");
        assert_matches!(validate_rustdesk_id("   "), Err(CoreError::Validation(_)));
        let long = "9".repeat(MAX_RUSTDESK_ID_LEN + 1);
        assert_matches!(validate_rustdesk_id(&long), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rule_bounds() {
        assert!(validate_rule(RULE_NONE).is_ok());
        assert!(validate_rule(RULE_FULL_CONTROL).is_ok());
        assert_matches!(validate_rule(4), Err(CoreError::Validation(_)));
        assert_matches!(validate_rule(-1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn guids_are_unique() {
        assert_ne!(new_guid(), new_guid());
    }
}
