use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::session::{LifecycleEvent, SessionPayload};

const TOKEN_PATTERN: &str = r"\$(event|type)";

fn token_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(TOKEN_PATTERN).ok()).as_ref()
}

/// Substitutes `$event` and `$type` in a single pass.
///
/// Replacement is plain text: nothing is shell-quoted, and tokens this
/// function does not know (or `$type` without a payload) stay as written.
pub(crate) fn interpolate(
    template: &str,
    event: LifecycleEvent,
    payload: Option<&SessionPayload>,
) -> String {
    let Some(pattern) = token_pattern() else {
        return replace_literal(template, event, payload);
    };
    pattern
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "event" => event.as_str().to_string(),
            "type" => match payload {
                Some(payload) => payload.session_type.as_str().to_string(),
                None => caps[0].to_string(),
            },
            _ => caps[0].to_string(),
        })
        .into_owned()
}

// Event names and session types never contain `$`, so two passes match one.
fn replace_literal(
    template: &str,
    event: LifecycleEvent,
    payload: Option<&SessionPayload>,
) -> String {
    let rendered = template.replace("$event", event.as_str());
    match payload {
        Some(payload) => rendered.replace("$type", payload.session_type.as_str()),
        None => rendered,
    }
}
