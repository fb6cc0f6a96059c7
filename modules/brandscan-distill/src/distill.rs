use scraper::{ElementRef, Html, Selector};

const REMOVED_TAGS: &[&str] = &["script", "style", "nav", "footer", "header", "noscript"];
const MIN_DISTILLATE_LEN: usize = 50;
const MAX_H2: usize = 3;
const MAX_PARAGRAPHS: usize = 3;
const MAX_UL_BLOCKS: usize = 2;
const MAX_LI_PER_UL: usize = 5;

fn within_removed_container(element: &ElementRef) -> bool {
    let mut current = element.parent();
    while let Some(node) = current {
        if let Some(el) = ElementRef::wrap(node) {
            if REMOVED_TAGS.contains(&el.value().name()) {
                return true;
            }
        }
        current = node.parent();
    }
    false
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Distill one page's HTML into the fixed `TITLE:`/`H1:`/`H2:`/paragraph/
/// list block format the analyzer corpus expects. Returns `None` when the
/// result is too short to be useful (per the minimum-length invariant),
/// matching the reference's "drop pages with distillate shorter than 50
/// characters" rule.
pub fn distill_page(html: &str, url: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let title_sel = Selector::parse("title").expect("static selector");
    let h1_sel = Selector::parse("h1").expect("static selector");
    let h2_sel = Selector::parse("h2").expect("static selector");
    let p_sel = Selector::parse("p").expect("static selector");
    let ul_sel = Selector::parse("ul").expect("static selector");
    let li_sel = Selector::parse("li").expect("static selector");

    let mut blocks: Vec<String> = Vec::new();
    blocks.push(format!("=== {url} ==="));

    if let Some(title) = document.select(&title_sel).next() {
        let text = element_text(&title);
        if !text.is_empty() {
            blocks.push(format!("TITLE: {text}"));
        }
    }

    if let Some(h1) = document
        .select(&h1_sel)
        .find(|el| !within_removed_container(el))
    {
        let text = element_text(&h1);
        if !text.is_empty() {
            blocks.push(format!("H1: {text}"));
        }
    }

    for h2 in document
        .select(&h2_sel)
        .filter(|el| !within_removed_container(el))
        .take(MAX_H2)
    {
        let text = element_text(&h2);
        if !text.is_empty() {
            blocks.push(format!("H2: {text}"));
        }
    }

    for p in document
        .select(&p_sel)
        .filter(|el| !within_removed_container(el))
        .take(MAX_PARAGRAPHS)
    {
        let text = element_text(&p);
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    for ul in document
        .select(&ul_sel)
        .filter(|el| !within_removed_container(el))
        .take(MAX_UL_BLOCKS)
    {
        let items: Vec<String> = ul
            .select(&li_sel)
            .map(|li| element_text(&li))
            .filter(|t| !t.is_empty())
            .take(MAX_LI_PER_UL)
            .collect();
        if !items.is_empty() {
            blocks.push(items.into_iter().map(|i| format!("- {i}")).collect::<Vec<_>>().join("\n"));
        }
    }

    let distillate = blocks.join("\n");
    if distillate.len() < MIN_DISTILLATE_LEN {
        None
    } else {
        Some(distillate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distills_title_h1_and_paragraphs() {
        let html = r#"
            <html><head><title>Acme Corp</title></head>
            <body>
                <nav><a href="/x">skip me</a></nav>
                <h1>Welcome to Acme</h1>
                <p>Acme builds durable widgets for everyone who needs them.</p>
                <footer>Copyright footer text that should not appear</footer>
            </body></html>
        "#;
        let out = distill_page(html, "https://acme.example/").unwrap();
        assert!(out.contains("TITLE: Acme Corp"));
        assert!(out.contains("H1: Welcome to Acme"));
        assert!(out.contains("Acme builds durable widgets"));
        assert!(!out.contains("skip me"));
        assert!(!out.contains("Copyright footer"));
    }

    #[test]
    fn caps_h2_and_paragraph_counts() {
        let mut body = String::new();
        for i in 0..6 {
            body.push_str(&format!("<h2>Heading {i}</h2><p>Paragraph number {i} with plenty of words here.</p>"));
        }
        let html = format!("<html><body>{body}</body></html>");
        let out = distill_page(&html, "https://example.com/").unwrap();
        assert_eq!(out.matches("H2:").count(), MAX_H2);
        assert_eq!(out.matches("Paragraph number").count(), MAX_PARAGRAPHS);
    }

    #[test]
    fn drops_pages_below_minimum_length() {
        let html = "<html><body><p>Hi</p></body></html>";
        assert!(distill_page(html, "https://example.com/").is_none());
    }

    #[test]
    fn limits_list_items_per_block() {
        let mut items = String::new();
        for i in 0..8 {
            items.push_str(&format!("<li>Item number {i}</li>"));
        }
        let html = format!(
            "<html><body><p>Enough introductory text to pass the minimum length check easily here.</p><ul>{items}</ul></body></html>"
        );
        let out = distill_page(&html, "https://example.com/").unwrap();
        assert_eq!(out.matches("- Item number").count(), MAX_LI_PER_UL);
    }
}
