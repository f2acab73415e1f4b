//! `@` mention autocomplete helpers.
//!
//! Everything here is pure: prefix matching of typed path fragments
//! against candidate paths, mapping key presses onto dropdown actions,
//! and deciding when an outside interaction should dismiss the dropdown.
//! [`MentionPopup`] is the only stateful piece and only holds the
//! selection model.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Character that starts a mention in the composer.
pub const MENTION_TRIGGER: char = '@';

/// Convert Windows-style separators so fragments compare equal across platforms.
pub fn normalize_query(query: &str) -> String {
    query.replace('\\', "/")
}

/// Return the part of `candidate` confirmed by `query`.
///
/// The comparison is case-insensitive, but the returned prefix keeps the
/// candidate's own casing. An empty query or a non-matching candidate
/// yields an empty string.
pub fn match_base_path(candidate: &str, query: &str) -> String {
    let normalized = normalize_query(query);
    if normalized.is_empty() {
        return String::new();
    }
    match prefix_len_ignore_case(candidate, &normalized) {
        Some(end) => candidate[..end].to_string(),
        None => String::new(),
    }
}

/// Byte length of the prefix of `text` that equals `prefix` ignoring case.
///
/// Characters are folded one at a time, so the result always agrees with
/// [`match_base_path`]. `None` when `text` does not start with `prefix`.
pub fn prefix_len_ignore_case(text: &str, prefix: &str) -> Option<usize> {
    let mut text_chars = text.char_indices();
    let mut end = 0;
    for p in prefix.chars() {
        match text_chars.next() {
            Some((idx, c)) if chars_eq_ignore_case(c, p) => end = idx + c.len_utf8(),
            _ => return None,
        }
    }
    Some(end)
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// What a key press does to the mention dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    SelectNext,
    SelectPrevious,
    SelectCurrent,
    CloseDropdown,
    NoAction,
}

/// Keys the dropdown reacts to, named after DOM `KeyboardEvent.key` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionKey {
    ArrowDown,
    ArrowUp,
    Enter,
    Tab,
    Escape,
    Other,
}

impl MentionKey {
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowDown" => MentionKey::ArrowDown,
            "ArrowUp" => MentionKey::ArrowUp,
            "Enter" => MentionKey::Enter,
            "Tab" => MentionKey::Tab,
            "Escape" => MentionKey::Escape,
            _ => MentionKey::Other,
        }
    }
}

/// Resolve a key press into a dropdown action.
///
/// Checks run in a fixed order: an inactive dropdown ignores everything,
/// Escape always closes an active dropdown (even with no results), and
/// navigation or selection require at least one item.
pub fn resolve_key_action(active: bool, has_items: bool, key: &str, shift_key: bool) -> KeyAction {
    if !active {
        return KeyAction::NoAction;
    }
    let key = MentionKey::from_key_name(key);
    if key == MentionKey::Escape {
        return KeyAction::CloseDropdown;
    }
    if !has_items {
        return KeyAction::NoAction;
    }
    match key {
        MentionKey::ArrowDown => KeyAction::SelectNext,
        MentionKey::ArrowUp => KeyAction::SelectPrevious,
        MentionKey::Enter if !shift_key => KeyAction::SelectCurrent,
        MentionKey::Tab => KeyAction::SelectCurrent,
        _ => KeyAction::NoAction,
    }
}

/// Screen position of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Anything that can answer "is this point inside me".
pub trait Region {
    fn contains(&self, point: Point) -> bool;
}

impl<F> Region for F
where
    F: Fn(Point) -> bool,
{
    fn contains(&self, point: Point) -> bool {
        self(point)
    }
}

/// Axis-aligned rectangle, inclusive on `min`, exclusive on `max`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn from_min_size(min: Point, width: f32, height: f32) -> Self {
        Self {
            min,
            max: Point::new(min.x + width, min.y + height),
        }
    }
}

impl Region for Rect {
    fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }
}

/// Whether an interaction at `target` should close the dropdown.
///
/// Interactions inside the input or the dropdown keep it open. A missing
/// region never contains the target; a missing target never dismisses.
pub fn should_dismiss_on_interaction(
    target: Option<Point>,
    input_region: Option<&dyn Region>,
    dropdown_region: Option<&dyn Region>,
) -> bool {
    let Some(point) = target else {
        return false;
    };
    let inside = |region: Option<&dyn Region>| region.is_some_and(|r| r.contains(point));
    !(inside(input_region) || inside(dropdown_region))
}

/// The `@token` under the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionToken {
    /// Text after the trigger character.
    pub query: String,
    /// Byte range of the whole token, trigger included.
    pub range: Range<usize>,
}

/// Find the mention token the cursor sits in, if any.
///
/// Tokens are whitespace-delimited and must begin with the trigger.
pub fn current_mention_token(text: &str, cursor: usize) -> Option<MentionToken> {
    let range = token_bounds(text, cursor);
    let token = &text[range.clone()];
    let query = token.strip_prefix(MENTION_TRIGGER)?;
    Some(MentionToken {
        query: query.to_string(),
        range,
    })
}

/// Replace the active mention token with `@path` and a trailing space.
///
/// Paths containing whitespace are quoted, with any `"` inside escaped as
/// `\"`. Returns the new text and the cursor position just after the
/// inserted space, or `None` when the cursor is not inside a mention.
pub fn replace_mention_token(text: &str, cursor: usize, path: &str) -> Option<(String, usize)> {
    let token = current_mention_token(text, cursor)?;
    let inserted = if path.chars().any(char::is_whitespace) {
        format!("{MENTION_TRIGGER}\"{}\"", path.replace('"', "\\\""))
    } else {
        format!("{MENTION_TRIGGER}{path}")
    };

    let mut out = String::with_capacity(text.len() - token.range.len() + inserted.len() + 1);
    out.push_str(&text[..token.range.start]);
    out.push_str(&inserted);
    out.push(' ');
    out.push_str(&text[token.range.end..]);
    let new_cursor = token.range.start + inserted.len() + 1;
    Some((out, new_cursor))
}

fn token_bounds(text: &str, cursor: usize) -> Range<usize> {
    let mut cursor = cursor.min(text.len());
    while !text.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let (before, after) = text.split_at(cursor);

    let start = before
        .char_indices()
        .rfind(|(_, c)| c.is_whitespace())
        .map(|(idx, c)| idx + c.len_utf8())
        .unwrap_or(0);
    let end = after
        .char_indices()
        .find(|(_, c)| c.is_whitespace())
        .map(|(idx, _)| cursor + idx)
        .unwrap_or(text.len());
    start..end
}

/// Selection model behind the mention dropdown.
#[derive(Debug, Clone, Default)]
pub struct MentionPopup {
    items: Vec<String>,
    selected: usize,
    active: bool,
}

impl MentionPopup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dropdown with a fresh result set.
    pub fn open(&mut self, items: Vec<String>) {
        self.active = true;
        self.set_items(items);
    }

    /// Replace results, keeping the dropdown state. Selection resets to the top.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.selected)
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(|s| s.as_str())
    }

    /// Apply a key press. Returns the chosen item when the key selects one.
    pub fn handle_key(&mut self, key: &str, shift_key: bool) -> (KeyAction, Option<String>) {
        let action = resolve_key_action(self.active, !self.items.is_empty(), key, shift_key);
        let chosen = self.apply(action);
        (action, chosen)
    }

    /// Close when an interaction lands outside both regions.
    pub fn handle_interaction(
        &mut self,
        target: Option<Point>,
        input_region: Option<&dyn Region>,
        dropdown_region: Option<&dyn Region>,
    ) -> bool {
        let dismiss = self.active && should_dismiss_on_interaction(target, input_region, dropdown_region);
        if dismiss {
            self.close();
        }
        dismiss
    }

    fn apply(&mut self, action: KeyAction) -> Option<String> {
        let len = self.items.len();
        match action {
            KeyAction::SelectNext => {
                self.selected = (self.selected + 1) % len;
                None
            }
            KeyAction::SelectPrevious => {
                self.selected = (self.selected + len - 1) % len;
                None
            }
            KeyAction::SelectCurrent => {
                let chosen = self.items.get(self.selected).cloned();
                self.close();
                chosen
            }
            KeyAction::CloseDropdown => {
                self.close();
                None
            }
            KeyAction::NoAction => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("a\\b\\c"), "a/b/c");
        assert_eq!(normalize_query("a/b"), "a/b");
        let once = normalize_query("src\\lib\\mod.rs");
        assert_eq!(normalize_query(&once), once);
    }

    #[test]
    fn test_match_base_path() {
        assert_eq!(match_base_path("src/index.ts", "src/in"), "src/in");
        assert_eq!(match_base_path("SRC/INDEX.TS", "src/in"), "SRC/IN");
        assert_eq!(match_base_path("lib/index.ts", "src"), "");
        assert_eq!(match_base_path("src/index.ts", "src\\in"), "src/in");
        assert_eq!(match_base_path("src", "src/index"), "");
    }

    #[test]
    fn test_match_base_path_empty_query() {
        for path in ["", "src/index.ts", "README.md"] {
            assert_eq!(match_base_path(path, ""), "");
        }
    }

    #[test]
    fn test_match_base_path_non_ascii() {
        assert_eq!(match_base_path("Übersicht/notes.md", "über"), "Über");
        assert_eq!(match_base_path("ΟΔΟΣ/", "οδοσ"), "ΟΔΟΣ");
    }

    #[test]
    fn test_prefix_len_ignore_case() {
        assert_eq!(prefix_len_ignore_case("ΟΔΟΣ/a.md", "οδοσ"), Some("ΟΔΟΣ".len()));
        assert_eq!(prefix_len_ignore_case("οδοσ", "ΟΔΟΣ/"), None);
        assert_eq!(prefix_len_ignore_case("src/", ""), Some(0));
        assert_eq!(prefix_len_ignore_case("Src/Main.rs", "src/m"), Some(5));
    }

    #[test]
    fn test_inactive_dropdown_ignores_keys() {
        for key in ["ArrowDown", "ArrowUp", "Enter", "Tab", "Escape"] {
            assert_eq!(resolve_key_action(false, true, key, false), KeyAction::NoAction);
        }
    }

    #[test]
    fn test_escape_closes_even_without_items() {
        assert_eq!(resolve_key_action(true, false, "Escape", false), KeyAction::CloseDropdown);
        assert_eq!(resolve_key_action(true, true, "Escape", true), KeyAction::CloseDropdown);
    }

    #[test]
    fn test_navigation_needs_items() {
        assert_eq!(resolve_key_action(true, false, "ArrowDown", false), KeyAction::NoAction);
        assert_eq!(resolve_key_action(true, false, "Tab", false), KeyAction::NoAction);
    }

    #[test]
    fn test_key_mapping_with_items() {
        assert_eq!(resolve_key_action(true, true, "ArrowDown", false), KeyAction::SelectNext);
        assert_eq!(resolve_key_action(true, true, "ArrowUp", false), KeyAction::SelectPrevious);
        assert_eq!(resolve_key_action(true, true, "Enter", false), KeyAction::SelectCurrent);
        assert_eq!(resolve_key_action(true, true, "Enter", true), KeyAction::NoAction);
        assert_eq!(resolve_key_action(true, true, "Tab", false), KeyAction::SelectCurrent);
        assert_eq!(resolve_key_action(true, true, "Tab", true), KeyAction::SelectCurrent);
        assert_eq!(resolve_key_action(true, true, "a", false), KeyAction::NoAction);
    }

    #[test]
    fn test_dismiss_without_target() {
        let everywhere = |_: Point| true;
        let nowhere = |_: Point| false;
        assert!(!should_dismiss_on_interaction(None, Some(&everywhere), Some(&nowhere)));
        assert!(!should_dismiss_on_interaction(None, None, None));
    }

    #[test]
    fn test_dismiss_regions() {
        let input = Rect::from_min_size(Point::new(0.0, 100.0), 200.0, 20.0);
        let dropdown = Rect::from_min_size(Point::new(0.0, 40.0), 200.0, 60.0);

        let in_input = Some(Point::new(10.0, 110.0));
        let in_dropdown = Some(Point::new(10.0, 50.0));
        let outside = Some(Point::new(300.0, 300.0));

        assert!(!should_dismiss_on_interaction(in_input, Some(&input), Some(&dropdown)));
        assert!(!should_dismiss_on_interaction(in_dropdown, Some(&input), Some(&dropdown)));
        assert!(should_dismiss_on_interaction(outside, Some(&input), Some(&dropdown)));
        // Missing regions never contain anything.
        assert!(should_dismiss_on_interaction(in_input, None, None));
    }

    #[test]
    fn test_current_mention_token() {
        let text = "look at @src/ma please";
        let token = current_mention_token(text, 12).unwrap();
        assert_eq!(token.query, "src/ma");
        assert_eq!(&text[token.range.clone()], "@src/ma");

        assert!(current_mention_token(text, 2).is_none());
        assert!(current_mention_token("email a@b", 9).is_none());
        assert_eq!(current_mention_token("@", 1).unwrap().query, "");
    }

    #[test]
    fn test_replace_mention_token() {
        let (text, cursor) = replace_mention_token("see @sr now", 7, "src/main.rs").unwrap();
        assert_eq!(text, "see @src/main.rs  now");
        assert_eq!(cursor, "see @src/main.rs ".len());

        let (quoted, _) = replace_mention_token("@my", 3, "My Docs/a.md").unwrap();
        assert_eq!(quoted, "@\"My Docs/a.md\" ");

        assert!(replace_mention_token("plain", 3, "x").is_none());
    }

    #[test]
    fn test_replace_mention_token_escapes_quotes() {
        let (text, _) = replace_mention_token("@my", 3, "My \"Best\" Docs/a.md").unwrap();
        assert_eq!(text, "@\"My \\\"Best\\\" Docs/a.md\" ");

        // Without whitespace the path stays bare.
        let (bare, _) = replace_mention_token("@q", 2, "say\"hi\".md").unwrap();
        assert_eq!(bare, "@say\"hi\".md ");
    }

    #[test]
    fn test_popup_navigation_wraps() {
        let mut popup = MentionPopup::new();
        popup.open(vec!["a".into(), "b".into(), "c".into()]);

        popup.handle_key("ArrowUp", false);
        assert_eq!(popup.selected_item(), Some("c"));
        popup.handle_key("ArrowDown", false);
        assert_eq!(popup.selected_item(), Some("a"));
        popup.handle_key("ArrowDown", false);

        let (action, chosen) = popup.handle_key("Enter", false);
        assert_eq!(action, KeyAction::SelectCurrent);
        assert_eq!(chosen.as_deref(), Some("b"));
        assert!(!popup.is_active());
    }

    #[test]
    fn test_popup_escape_and_outside_click() {
        let mut popup = MentionPopup::new();
        popup.open(Vec::new());
        assert_eq!(popup.selected_index(), None);
        assert_eq!(popup.handle_key("Escape", false).0, KeyAction::CloseDropdown);
        assert!(!popup.is_active());

        popup.open(vec!["x".into()]);
        let input = Rect::from_min_size(Point::default(), 10.0, 10.0);
        assert!(!popup.handle_interaction(Some(Point::new(5.0, 5.0)), Some(&input), None));
        assert!(popup.handle_interaction(Some(Point::new(50.0, 5.0)), Some(&input), None));
        assert!(!popup.is_active());
    }
}
