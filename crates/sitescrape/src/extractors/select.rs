// ABOUTME: Selector Extractor: parses a document and returns the visible text of every node a selector matches.
// ABOUTME: Results keep document order and duplicates; script-like content is skipped and blocks are space-separated.

use scraper::{Html, Node};

use crate::extractors::compiled::get_or_compile;

/// Elements whose contents are never visible text.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line when rendered; their text is space-separated from neighbours.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "html", "li", "main", "nav", "ol", "p", "pre",
    "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Appends the visible text under `node` to `output`.
fn collect_visible_text(node: ego_tree::NodeRef<Node>, output: &mut String) {
    match node.value() {
        Node::Text(text) => output.push_str(&**text),
        Node::Element(el) => {
            let tag = el.name();
            if HIDDEN_TAGS.contains(&tag) {
                return;
            }
            if tag == "br" {
                output.push(' ');
                return;
            }

            let block = BLOCK_TAGS.contains(&tag);
            if block {
                output.push(' ');
            }
            for child in node.children() {
                collect_visible_text(child, output);
            }
            if block {
                output.push(' ');
            }
        }
        _ => {}
    }
}

/// Extracts the visible text of every node matching `selector`.
///
/// Returns one entry per matched node in document order. Nodes without text
/// produce an empty entry so the count always equals the number of matches.
/// Returns `None` if `selector` does not compile.
pub fn extract_texts(html: &str, selector: &str) -> Option<Vec<String>> {
    let selector = get_or_compile(selector)?;
    let doc = Html::parse_document(html);

    let texts = doc
        .select(&selector)
        .map(|el| {
            let mut text = String::new();
            collect_visible_text(*el, &mut text);
            normalize_whitespace(&text)
        })
        .collect();
    Some(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_HTML: &str = r#"<!DOCTYPE html><html><head><title>Test Page</title></head><body>
        <h1>  Main   <em>Title</em>  </h1>
        <ul class="items">
            <li>Item One</li>
            <li>Item <b>Two</b></li>
            <li>Item One</li>
        </ul>
        <div class="empty"></div>
        <p class="intro">Hello <a href="/x">world</a></p>
        <script>var hidden = 1;</script>
    </body></html>"#;

    // Shaped like fetched documents: line breaks already removed.
    const JOINED_HTML: &str = "<html><head><style>.a{color:red}</style></head><body><ul><li>one</li><li>two</li></ul><p>a<br>b</p><div id=\"s\">keep<script>var x = 1;</script><noscript>enable js</noscript></div></body></html>";

    #[test]
    fn test_extract_by_tag_name() {
        let texts = extract_texts(SAMPLE_HTML, "h1").unwrap();
        assert_eq!(texts, vec!["Main Title".to_string()]);
    }

    #[test]
    fn test_extract_keeps_order_and_duplicates() {
        let texts = extract_texts(SAMPLE_HTML, "ul.items li").unwrap();
        assert_eq!(
            texts,
            vec![
                "Item One".to_string(),
                "Item Two".to_string(),
                "Item One".to_string()
            ]
        );
    }

    #[test]
    fn test_extract_descendant_text() {
        let texts = extract_texts(SAMPLE_HTML, "p.intro").unwrap();
        assert_eq!(texts, vec!["Hello world".to_string()]);
    }

    #[test]
    fn test_list_items_are_space_separated() {
        let texts = extract_texts(JOINED_HTML, "ul").unwrap();
        assert_eq!(texts, vec!["one two".to_string()]);
    }

    #[test]
    fn test_line_break_becomes_space() {
        let texts = extract_texts(JOINED_HTML, "p").unwrap();
        assert_eq!(texts, vec!["a b".to_string()]);
    }

    #[test]
    fn test_script_and_noscript_are_skipped() {
        let texts = extract_texts(JOINED_HTML, "#s").unwrap();
        assert_eq!(texts, vec!["keep".to_string()]);
    }

    #[test]
    fn test_whole_document_excludes_styles() {
        let texts = extract_texts(JOINED_HTML, "html").unwrap();
        assert_eq!(texts, vec!["one two a b keep".to_string()]);
    }

    #[test]
    fn test_selected_script_has_no_text() {
        let texts = extract_texts(SAMPLE_HTML, "script").unwrap();
        assert_eq!(texts, vec![String::new()]);
    }

    #[test]
    fn test_empty_node_keeps_its_slot() {
        let texts = extract_texts(SAMPLE_HTML, "div.empty").unwrap();
        assert_eq!(texts, vec![String::new()]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let texts = extract_texts(SAMPLE_HTML, "article").unwrap();
        assert!(texts.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_none() {
        assert!(extract_texts(SAMPLE_HTML, "[[[invalid").is_none());
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("no\textra\nspaces"), "no extra spaces");
        assert_eq!(normalize_whitespace(""), "");
    }
}
