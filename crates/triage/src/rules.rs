//! Pure label rules.
//!
//! Each rule is a small function over text so it can be tested on its own.
//! [`derive_labels`] applies the synchronous rules in order (welcome decision,
//! title marker, SDK names found in the body). The key-phrase filter lives here
//! too, but the service call that feeds it is made by [`crate::LabelDeriver`].

use tracing::{debug, info};

use crate::{ArtifactLabelTable, IssueEvent, KeyPhraseResult, LabelDecision, LabelName, LabelSet};

/// Body of the comment posted on newly opened issues.
pub const WELCOME_COMMENT: &str = "Thanks for opening this issue!";

/// Marker introducing the SDK name in the issue template (`Library used: azure-core 1.2.0`).
pub const LIBRARY_USED_MARKER: &str = "Library used:";

/// Opening tag of a Maven dependency snippet pasted into the body.
pub const ARTIFACT_ID_MARKER: &str = "<artifactId>";

/// Closing tag of a Maven dependency snippet.
pub const ARTIFACT_ID_CLOSE_MARKER: &str = "</artifactId>";

/// Only this many leading body lines are scanned for SDK names.
pub const MAX_SCANNED_LINES: usize = 256;

/// Bodies must be strictly longer than this (in characters) to be sent for key phrases.
pub const KEY_PHRASE_MIN_CHARS: usize = 100;

/// Bodies must be strictly shorter than this (in characters) to be sent for key phrases.
pub const KEY_PHRASE_MAX_CHARS: usize = 5120;

const FEATURE_REQUEST_MARKER: &str = "[feature request]";
const BUG_MARKER: &str = "[bug]";
const MANAGEMENT_LABEL: &str = "mgmt";
const MANAGEMENT_TRIGGERS: [&str; 3] = ["fluent", "manager", "management"];

// ---------------------------------------------------------------------------
// Title
// ---------------------------------------------------------------------------

/// Label implied by a marker in the title, matched case-insensitively.
///
/// `[feature request]` takes precedence over `[bug]`.
pub fn title_label(title: &str) -> Option<LabelName> {
    let title = title.to_lowercase();
    if title.contains(FEATURE_REQUEST_MARKER) {
        Some(LabelName::from_static("feature-request"))
    } else if title.contains(BUG_MARKER) {
        Some(LabelName::from_static("bug"))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// SDK name extraction
// ---------------------------------------------------------------------------

/// SDK name following the last `Library used:` marker on `line`.
///
/// The remainder after the marker is trimmed and cut at the first space, so
/// `"Library used: azure-core 1.2.0"` yields `azure-core`.
pub fn library_used_candidate(line: &str) -> Option<&str> {
    let start = line.rfind(LIBRARY_USED_MARKER)? + LIBRARY_USED_MARKER.len();
    let rest = line[start..].trim();
    let name = match rest.find(' ') {
        Some(end) => &rest[..end],
        None => rest,
    }
    .trim();
    (!name.is_empty()).then_some(name)
}

/// SDK name taken from a line containing an `<artifactId>` tag.
///
/// The start offset is anchored on the last `Library used:` marker, not on the
/// tag. When that marker is absent the offset is `LIBRARY_USED_MARKER.len() - 1`,
/// which equals the length of `<artifactId>`: a tag at column zero therefore
/// yields its content, an indented tag yields a fragment that matches nothing.
/// The fallback offset is counted in UTF-16 code units. The name runs to the
/// first closing tag at or after the offset, or to the end of the line.
pub fn artifact_id_candidate(line: &str) -> Option<&str> {
    if !line.contains(ARTIFACT_ID_MARKER) {
        return None;
    }
    let start = match line.rfind(LIBRARY_USED_MARKER) {
        Some(pos) => pos + LIBRARY_USED_MARKER.len(),
        None => utf16_offset(line, LIBRARY_USED_MARKER.len() - 1)?,
    };
    // Out of range offsets produce no candidate.
    let tail = line.get(start..)?;
    let end = tail.find(ARTIFACT_ID_CLOSE_MARKER).unwrap_or(tail.len());
    let name = tail[..end].trim();
    (!name.is_empty()).then_some(name)
}

/// Byte index of the position `units` UTF-16 code units into `line`.
///
/// `None` when the line is shorter or the position splits a surrogate pair.
fn utf16_offset(line: &str, units: usize) -> Option<usize> {
    let mut seen = 0;
    for (index, ch) in line.char_indices() {
        if seen == units {
            return Some(index);
        }
        seen += ch.len_utf16();
        if seen > units {
            return None;
        }
    }
    (seen == units).then_some(line.len())
}

/// Candidate SDK name on one body line; the `Library used:` form wins.
pub fn extract_sdk_name(line: &str) -> Option<&str> {
    library_used_candidate(line).or_else(|| artifact_id_candidate(line))
}

/// Adds the labels of every known SDK named in the first
/// [`MAX_SCANNED_LINES`] lines of `body`.
///
/// A newly added `mgmt-*` label also adds `mgmt`.
pub fn artifact_labels(body: &str, table: &ArtifactLabelTable, labels: &mut LabelSet) {
    let candidates = body
        .split('\n')
        .take(MAX_SCANNED_LINES)
        .filter_map(extract_sdk_name);

    for sdk_name in candidates {
        let Some(label) = table.lookup(sdk_name) else {
            continue;
        };
        if labels.insert(label.clone()) {
            info!(label = %label, sdk = sdk_name, "Added label via artifact id");
            if label.is_management_scoped() {
                labels.insert(LabelName::from_static(MANAGEMENT_LABEL));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Key phrases
// ---------------------------------------------------------------------------

/// Returns `true` if `body` is long enough to be worth analysing but short
/// enough to submit as one document.
pub fn is_key_phrase_eligible(body: &str) -> bool {
    let chars = body.chars().take(KEY_PHRASE_MAX_CHARS).count();
    chars > KEY_PHRASE_MIN_CHARS && chars < KEY_PHRASE_MAX_CHARS
}

/// Label implied by one key phrase, if any.
pub fn key_phrase_label(phrase: &str) -> Option<LabelName> {
    let phrase = phrase.to_lowercase();
    MANAGEMENT_TRIGGERS
        .iter()
        .any(|trigger| phrase.contains(trigger))
        .then(|| LabelName::from_static(MANAGEMENT_LABEL))
}

/// Adds the labels implied by `result`. Returns how many were new.
pub fn apply_key_phrases(result: &KeyPhraseResult, labels: &mut LabelSet) -> usize {
    let mut added = 0;
    for phrase in result.phrases() {
        if let Some(label) = key_phrase_label(phrase) {
            let name = label.to_string();
            if labels.insert(label) {
                info!(label = %name, phrase = %phrase, "Added label via key phrase");
                added += 1;
            }
        }
    }
    added
}

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

/// Applies the synchronous rules to `event`.
///
/// Actions other than `opened`/`edited` yield an empty decision.
pub fn derive_labels(event: &IssueEvent, table: &ArtifactLabelTable) -> LabelDecision {
    let mut decision = LabelDecision {
        post_welcome: event.action.posts_welcome(),
        labels: LabelSet::new(),
    };

    if !event.action.triggers_labeling() {
        debug!(action = %event.action, "Action does not trigger labeling");
        return decision;
    }

    if let Some(label) = title_label(&event.title) {
        info!(label = %label, "Added label via title");
        decision.labels.insert(label);
    }

    artifact_labels(&event.body, table, &mut decision.labels);
    decision
}
