/// Incremental filter input with prefix-based autocompletion. Suggestions
/// are recomputed from the visible rows by the table state machine.
#[derive(Debug, Clone, Default)]
pub struct FilterInput {
    pub enabled: bool,
    text: String,
    suggestions: Vec<String>,
}

impl FilterInput {
    /// The filter applied to rows: empty unless the input is enabled.
    pub fn active_text(&self) -> &str {
        if self.enabled {
            &self.text
        } else {
            ""
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn set_suggestions(&mut self, suggestions: Vec<String>) {
        self.suggestions = suggestions;
    }

    /// The first suggestion strictly extending the current text.
    pub fn suggestion(&self) -> Option<&str> {
        if self.text.is_empty() {
            return None;
        }
        self.suggestions
            .iter()
            .find(|s| s.starts_with(&self.text) && s.as_str() != self.text)
            .map(|s| s.as_str())
    }

    /// The not-yet-typed remainder of the current suggestion, for ghost text.
    pub fn ghost(&self) -> Option<&str> {
        self.suggestion().map(|s| &s[self.text.len()..])
    }

    /// Accept the current suggestion, replacing the typed text.
    pub fn accept_suggestion(&mut self) {
        if let Some(suggestion) = self.suggestion().map(|s| s.to_string()) {
            self.text = suggestion;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_with(text: &str, suggestions: &[&str]) -> FilterInput {
        let mut f = FilterInput {
            enabled: true,
            ..FilterInput::default()
        };
        for c in text.chars() {
            f.push(c);
        }
        f.set_suggestions(suggestions.iter().map(|s| s.to_string()).collect());
        f
    }

    #[test]
    fn active_text_empty_when_disabled() {
        let mut f = filter_with("pod", &[]);
        assert_eq!(f.active_text(), "pod");
        f.enabled = false;
        assert_eq!(f.active_text(), "");
    }

    #[test]
    fn suggestion_requires_prefix_extension() {
        let f = filter_with("po", &["nginx", "pod-abc", "pod-abc-123"]);
        assert_eq!(f.suggestion(), Some("pod-abc"));
        assert_eq!(f.ghost(), Some("d-abc"));

        let f = filter_with("pod-abc", &["pod-abc"]);
        assert_eq!(f.suggestion(), None);
    }

    #[test]
    fn no_suggestion_for_empty_text() {
        let f = filter_with("", &["pod-abc"]);
        assert_eq!(f.suggestion(), None);
    }

    #[test]
    fn accept_takes_whole_suggestion() {
        let mut f = filter_with("po", &["pod-abc"]);
        f.accept_suggestion();
        assert_eq!(f.text(), "pod-abc");
    }
}
