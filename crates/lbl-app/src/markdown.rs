//! Markdown formatting of row text

use pulldown_cmark::{html, Event, Options, Parser};

/// Render row text as HTML
///
/// Tables, footnotes and strikethrough are enabled, single newlines become
/// `<br />`, and raw HTML in the text is escaped rather than passed through.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    
    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) => Event::Text(raw),
        other => other,
    });
    
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
