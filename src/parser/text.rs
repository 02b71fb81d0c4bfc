use super::tokens::{walk, Attrs, MarkupVisitor};

const SKIPPED: &[&str] = &["script", "style"];

/// Visible text of an HTML document, whitespace-collapsed, without
/// script or style content.
pub fn visible_text(html: &str) -> String {
    walk(html, TextExtractor::default()).finish()
}

#[derive(Default)]
struct TextExtractor {
    parts: Vec<String>,
    pending: String,
    skip_depth: usize,
}

impl TextExtractor {
    fn flush(&mut self) {
        let cleaned = collapse_whitespace(&self.pending);
        if !cleaned.is_empty() {
            self.parts.push(cleaned);
        }
        self.pending.clear();
    }

    fn finish(mut self) -> String {
        self.flush();
        self.parts.join(" ")
    }
}

impl MarkupVisitor for TextExtractor {
    fn open(&mut self, name: &str, _attrs: &Attrs<'_>) {
        self.flush();
        if SKIPPED.contains(&name) {
            self.skip_depth += 1;
        }
    }

    fn close(&mut self, name: &str) {
        self.flush();
        if SKIPPED.contains(&name) && self.skip_depth > 0 {
            self.skip_depth -= 1;
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth == 0 {
            self.pending.push_str(text);
        }
    }
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_script_and_style() {
        let html = "<html><head><style>body { color: red }</style>\
                    <script>var secret = 'hidden';</script></head>\
                    <body><p>Hello</p><p>world</p></body></html>";
        assert_eq!(visible_text(html), "Hello world");
    }

    #[test]
    fn style_nested_in_style_is_dropped() {
        let html = "<div><style>a{}<style>b{}</style>still css</style>after</div>";
        let text = visible_text(html);
        assert!(!text.contains("a{}"));
        assert!(!text.contains("b{}"));
        assert!(text.ends_with("after"));
    }

    #[test]
    fn collapses_whitespace_across_nodes() {
        let html = "<p>  Executive\n\n   coaching </p>\t<span> for   leaders</span>";
        assert_eq!(visible_text(html), "Executive coaching for leaders");
    }

    #[test]
    fn keeps_entities_inside_words() {
        assert_eq!(visible_text("<p>AT&amp;T &lt;3</p>"), "AT&T <3");
    }

    #[test]
    fn malformed_markup_degrades() {
        let text = visible_text("<div><p>open <b>bold</div> tail <");
        assert!(text.contains("open"));
        assert!(text.contains("bold"));
        assert!(text.contains("tail"));
    }

    #[test]
    fn empty_input() {
        assert_eq!(visible_text(""), "");
    }
}
