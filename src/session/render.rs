use itertools::Itertools;
use scraper::{CaseSensitivity, ElementRef, Node};

/// Elements whose content never shows up in the visible text.
const SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head", "svg"];

/// Elements that start and end their own line(s) when rendered.
const BLOCKS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th",
    "thead", "tr", "ul",
];

/// Class of the per-map stat containers on a match page.
pub(crate) const GAME_CLASS: &str = "vm-stats-game";
pub(crate) const GAME_ID_ATTR: &str = "data-game-id";

/// Approximates a browser's `innerText`: one line per block, inline runs
/// joined by single spaces, hidden subtrees dropped.
///
/// Of the per-map containers only the selected one renders: `active_game`
/// when an interaction picked one, else whichever the markup marks active.
pub(crate) struct TextRenderer<'a> {
    active_game: Option<&'a str>,
    lines: Vec<String>,
    current: String,
}

impl<'a> TextRenderer<'a> {
    pub(crate) fn render(element: ElementRef<'_>, active_game: Option<&'a str>) -> String {
        let mut renderer = TextRenderer {
            active_game,
            lines: vec![],
            current: String::new(),
        };
        renderer.visit(element);
        renderer.flush();
        renderer.lines.join("\n")
    }

    fn visit(&mut self, element: ElementRef<'_>) {
        if !self.is_visible(&element) {
            return;
        }
        let block = BLOCKS.contains(&element.value().name());
        if block {
            self.flush();
        }
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        self.visit(child);
                    }
                }
                _ => {}
            }
        }
        if block {
            self.flush();
        }
    }

    fn is_visible(&self, element: &ElementRef<'_>) -> bool {
        let value = element.value();
        if SKIPPED.contains(&value.name()) {
            return false;
        }
        if value.has_class(GAME_CLASS, CaseSensitivity::CaseSensitive) {
            if let Some(active) = self.active_game {
                return value.attr(GAME_ID_ATTR) == Some(active);
            }
        }
        !value.attr("style").is_some_and(is_hidden_style)
    }

    fn push_text(&mut self, text: &str) {
        let collapsed = text.split_whitespace().join(" ");
        if collapsed.is_empty() {
            return;
        }
        if !self.current.is_empty() {
            self.current.push(' ');
        }
        self.current.push_str(&collapsed);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }
}

fn is_hidden_style(style: &str) -> bool {
    style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
        .contains("display:none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn render(html: &str, active: Option<&str>) -> String {
        let document = Html::parse_document(html);
        let body = Selector::parse("body").unwrap();
        let body = document.select(&body).next().unwrap();
        TextRenderer::render(body, active)
    }

    #[test]
    fn blocks_become_lines() {
        let text = render(
            "<body><div>13</div><div><span>FNATIC</span></div><p>Ascent <b>PICK</b></p></body>",
            None,
        );
        assert_eq!(text, "13\nFNATIC\nAscent PICK");
    }

    #[test]
    fn hidden_content_is_dropped() {
        let text = render(
            "<body><script>var x = '2:0';</script><div style='display: none'>secret</div><div>shown</div></body>",
            None,
        );
        assert_eq!(text, "shown");
    }

    #[test]
    fn only_the_selected_game_renders() {
        let html = "<body>\
            <div class='vm-stats-game mod-active' data-game-id='all'>overview</div>\
            <div class='vm-stats-game' data-game-id='11' style='display:none'>map one</div>\
            <div class='vm-stats-game' data-game-id='12' style='display:none'>map two</div>\
            </body>";
        assert_eq!(render(html, None), "overview");
        assert_eq!(render(html, Some("12")), "map two");
    }
}
