use crate::feed::{html_to_text, Item, SourceKind};

const RULE_WIDTH: usize = 80;

/// Render items as the plain-text block handed to the summarizer.
///
/// One block per item, in input order, each opened by an `ARTICLE n` banner.
/// HTML bodies are flattened to text.
pub fn render(items: &[Item]) -> String {
    let rule = "=".repeat(RULE_WIDTH);

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let author = match (&item.source_kind, &item.author) {
                (SourceKind::SocialList, Some(author)) => format!("Author: {}\n", author),
                _ => String::new(),
            };
            format!(
                "\n{rule}\nARTICLE {}\n{rule}\nTitle: {}\nSource: {}\n{author}Link: {}\nPublished: {}\n\nContent:\n{}\n",
                idx + 1,
                item.title,
                item.source_label,
                item.link,
                item.published_display(),
                html_to_text(&item.body),
            )
        })
        .collect()
}

/// Render items as a markdown listing for terminal previews
pub fn render_markdown(items: &[Item]) -> String {
    let mut out = String::from("# Threat Intelligence Articles\n\n");

    for (idx, item) in items.iter().enumerate() {
        out.push_str(&format!(
            "## Article {}: {}\n**Source:** {}\n**Link:** {}\n**Published:** {}\n\n**Summary:** {}\n\n---\n\n",
            idx + 1,
            item.title,
            item.source_label,
            item.link,
            item.published_display(),
            html_to_text(&item.body),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(title: &str, kind: SourceKind) -> Item {
        Item {
            title: title.to_string(),
            link: format!("https://example.com/{}", title),
            body: format!("{} body", title),
            published_at: None,
            source_label: "Src".to_string(),
            source_kind: kind,
            author: Some("someone".to_string()),
        }
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_single_item_layout() {
        let mut first = item("one", SourceKind::Feed);
        first.published_at = Some(Utc.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap());

        let text = render(&[first]);
        let rule = "=".repeat(80);
        let expected = format!(
            "\n{rule}\nARTICLE 1\n{rule}\nTitle: one\nSource: Src\nLink: https://example.com/one\n\
             Published: 2024-05-14T10:00:00+00:00\n\nContent:\none body\n"
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_preserves_order_and_numbering() {
        let items = vec![
            item("a", SourceKind::Feed),
            item("b", SourceKind::SocialUser),
            item("c", SourceKind::SocialList),
        ];
        let text = render(&items);

        let a = text.find("ARTICLE 1\n").unwrap();
        let b = text.find("ARTICLE 2\n").unwrap();
        let c = text.find("ARTICLE 3\n").unwrap();
        assert!(a < b && b < c);
        assert!(text.contains("Title: b"));
        assert!(text.contains("Published: Unknown"));
        // Only list items carry an author line
        assert_eq!(text.matches("Author: someone").count(), 1);
    }

    #[test]
    fn test_render_flattens_html_bodies() {
        let mut html = item("h", SourceKind::Feed);
        html.body = "<p>Patch <b>now</b></p>".to_string();
        let text = render(&[html]);
        assert!(!text.contains("<p>"));
        assert!(text.contains("Patch"));
    }

    #[test]
    fn test_render_markdown() {
        let text = render_markdown(&[item("x", SourceKind::Feed)]);
        assert!(text.starts_with("# Threat Intelligence Articles\n\n"));
        assert!(text.contains("## Article 1: x\n"));
        assert!(text.contains("**Summary:** x body"));
        assert!(text.ends_with("---\n\n"));
    }

    #[test]
    fn test_render_markdown_layout() {
        let mut first = item("x", SourceKind::Feed);
        first.published_at = Some(Utc.with_ymd_and_hms(2024, 5, 14, 10, 0, 0).unwrap());

        let text = render_markdown(&[first]);
        assert_eq!(
            text,
            "# Threat Intelligence Articles\n\n\
             ## Article 1: x\n\
             **Source:** Src\n\
             **Link:** https://example.com/x\n\
             **Published:** 2024-05-14T10:00:00+00:00\n\n\
             **Summary:** x body\n\n\
             ---\n\n"
        );
    }

    #[test]
    fn test_list_author_line_only_for_lists() {
        let text = render(&[item("l", SourceKind::SocialList)]);
        assert!(text.contains("Source: Src\nAuthor: someone\nLink: https://example.com/l\n"));

        let text = render(&[item("u", SourceKind::SocialUser)]);
        assert!(!text.contains("Author:"));
    }
}
