use ammonia::Builder;
use pulldown_cmark::{html, Options, Parser};

const WORDS_PER_MINUTE: usize = 200;

pub struct MarkdownRenderer {
    sanitizer: Builder<'static>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut tags = ammonia::Builder::default().clone_tags();
        tags.insert("pre");
        tags.insert("code");
        tags.insert("table");
        tags.insert("thead");
        tags.insert("tbody");
        tags.insert("tr");
        tags.insert("th");
        tags.insert("td");
        tags.insert("del");
        tags.insert("input");

        let mut attrs = ammonia::Builder::default().clone_tag_attributes();
        attrs.insert(
            "input",
            ["type", "checked", "disabled"].iter().cloned().collect(),
        );
        attrs.insert(
            "img",
            ["src", "alt", "title", "width", "height", "loading"]
                .iter()
                .cloned()
                .collect(),
        );

        let mut sanitizer = Builder::default();
        sanitizer
            .tags(tags)
            .tag_attributes(attrs)
            .link_rel(Some("noopener noreferrer"));

        Self { sanitizer }
    }

    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS;

        let parser = Parser::new_ext(markdown, options);
        let mut unsafe_html = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut unsafe_html, parser);

        self.sanitizer.clean(&unsafe_html).to_string()
    }
}

/// Estimated reading time in minutes: the content is split on single spaces
/// and read at 200 words per minute, rounded up.
pub fn reading_time_minutes(content: &str) -> u32 {
    let words = content.split(' ').count();
    words.div_ceil(WORDS_PER_MINUTE) as u32
}
