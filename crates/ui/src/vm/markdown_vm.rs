use std::collections::{HashMap, HashSet};

/// Lesson text arrives either as markdown or as HTML authored in the admin
/// editor. Both come out as sanitized HTML.
#[must_use]
pub fn rich_text_html(input: &str) -> String {
    if looks_like_html(input) {
        sanitize_html(input)
    } else {
        markdown_to_html(&normalize_markdown(input))
    }
}

#[must_use]
pub fn markdown_to_html(input: &str) -> String {
    let mut options = pulldown_cmark::Options::empty();
    options.insert(pulldown_cmark::Options::ENABLE_STRIKETHROUGH);
    options.insert(pulldown_cmark::Options::ENABLE_TABLES);

    let parser = pulldown_cmark::Parser::new_ext(input, options);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    sanitize_html(&html)
}

#[must_use]
pub fn sanitize_html(html: &str) -> String {
    let tags: HashSet<&str> = [
        "p", "div", "span", "br", "em", "strong", "b", "i", "u", "sub", "sup", "code", "pre",
        "blockquote", "ul", "ol", "li", "a", "h3", "h4", "table", "thead", "tbody", "tr", "th",
        "td", "img",
    ]
    .into_iter()
    .collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href"].into_iter().collect());
    attributes.insert("img", ["src", "alt"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .clean(html)
        .to_string()
}

#[must_use]
pub fn looks_like_html(input: &str) -> bool {
    let trimmed = input.trim_start();
    if trimmed.is_empty() {
        return false;
    }

    let lower = trimmed.to_ascii_lowercase();
    let Some(start) = lower.find('<') else {
        return false;
    };
    if !lower[start + 1..].contains('>') {
        return false;
    }

    let tags = [
        "<p", "<div", "<span", "<br", "<strong", "<em", "<ul", "<ol", "<a ", "<img", "<table",
    ];
    tags.iter().any(|tag| lower.contains(tag))
}

#[must_use]
pub fn normalize_markdown(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = Vec::new();
    let mut blank_streak = 0usize;

    for line in normalized.split('\n') {
        let trimmed = line.trim_end_matches([' ', '\t']).to_string();
        if trimmed.is_empty() {
            blank_streak += 1;
            if blank_streak > 1 {
                continue;
            }
        } else {
            blank_streak = 0;
        }
        lines.push(trimmed);
    }

    let mut output = lines.join("\n");
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{looks_like_html, markdown_to_html, normalize_markdown, rich_text_html};

    #[test]
    fn html_detection_requires_structure_and_known_tags() {
        assert!(looks_like_html("<p>Half of 4 is 2</p>"));
        assert!(looks_like_html("  <div class=\"x\">Hi</div>"));
        assert!(looks_like_html("<strong>Key</strong> idea"));

        assert!(!looks_like_html("2 < 3 > 1"));
        assert!(!looks_like_html("<math>x</math>"));
        assert!(!looks_like_html("plain text"));
    }

    #[test]
    fn normalize_markdown_trims_and_collapses_blank_lines() {
        let input = "Line one  \r\n\r\n\r\nLine two\t\r\n\r\n";
        assert_eq!(normalize_markdown(input), "Line one\n\nLine two\n");
    }

    #[test]
    fn markdown_to_html_sanitizes_links() {
        let html = markdown_to_html("[Link](javascript:alert(1))");
        assert!(html.contains("Link"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn rich_text_keeps_authored_html_but_drops_scripts() {
        let html = rich_text_html("<p>A <strong>fraction</strong></p><script>alert(1)</script>");
        assert!(html.contains("<strong>fraction</strong>"));
        assert!(!html.contains("script"));

        let from_markdown = rich_text_html("**Numerator** on top");
        assert!(from_markdown.contains("<strong>Numerator</strong>"));
    }
}
