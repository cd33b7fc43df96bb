//! Resources tool scraper, the fallback when WebDAV yields nothing.
//!
//! Only direct file links of the top-level table are collected; folder rows
//! are skipped and entries are flat (`relative_path` is the display name).

use scraper::ElementRef;

use crate::config::ResourceSelectors;
use crate::fetch::{element_text, selector, Document};
use crate::model::FileEntry;
use crate::naming::derive_display_name;

/// File entries of a resources page, in table order.
///
/// `display_name` holds the link text as shown (possibly empty, in which case
/// a downloader may still learn a better name from `Content-Disposition`);
/// `relative_path` is the name derived without that header.
pub fn scrape_resource_entries(doc: &Document, selectors: &ResourceSelectors) -> Vec<FileEntry> {
    let (Some(title_sel), Some(folder_sel), Some(link_sel)) = (
        selector(&selectors.title_cell),
        selector(&selectors.folder_marker),
        selector(&selectors.content_link),
    ) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    for row in doc.select_all(&selectors.row) {
        let Some(cell) = row.select(&title_sel).next() else {
            continue;
        };
        if cell.select(&folder_sel).next().is_some() {
            continue;
        }
        let Some(link) = cell.select(&link_sel).find(|a| !is_icon_link(a)) else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(url) = doc.resolve(href) else {
            continue;
        };
        let text = element_text(&link);
        let name = derive_display_name(&text, None, url.as_str());
        entries.push(FileEntry {
            download_url: url.to_string(),
            relative_path: name,
            display_name: text,
        });
    }
    tracing::debug!(url = %doc.url(), files = entries.len(), "resources page scraped");
    entries
}

/// Icon anchors (`class="fa-..."`) sit next to the real link and are not files.
fn is_icon_link(a: &ElementRef<'_>) -> bool {
    a.value().classes().any(|c| c.starts_with("fa-") || c == "fa")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    const PAGE: &str = "https://panda.example/portal/site/abc/tool/res";

    fn doc(rows: &str) -> Document {
        let html = format!(
            r#"<html><body><form name="showForm"><table><tbody>{}</tbody></table></form></body></html>"#,
            rows
        );
        Document::parse(&html, Url::parse(PAGE).unwrap())
    }

    #[test]
    fn collects_file_rows_and_skips_folders() {
        let d = doc(r#"
            <tr><td class="specialLink title">
                <a class="fa-file-pdf-o" href="/access/content/group/abc/w1.pdf"></a>
                <a href="/access/content/group/abc/w1.pdf"> Week 1 </a>
            </td></tr>
            <tr><td class="specialLink title">
                <span class="fa fa-folder-open"></span>
                <a href="/access/content/group/abc/sub/">Sub</a>
            </td></tr>
            <tr><td class="specialLink title"><a href="/portal/elsewhere">Not content</a></td></tr>
            <tr><td class="other">no title cell</td></tr>
        "#);
        let entries = scrape_resource_entries(&d, &ResourceSelectors::default());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].display_name, "Week 1");
        assert_eq!(entries[0].relative_path, "Week 1");
        assert_eq!(
            entries[0].download_url,
            "https://panda.example/access/content/group/abc/w1.pdf"
        );
    }

    #[test]
    fn empty_link_text_uses_url_name() {
        let d = doc(r#"
            <tr><td class="specialLink title">
                <a href="/access/content/group/abc/%E8%AC%9B%E7%BE%A9.pdf"></a>
            </td></tr>
        "#);
        let entries = scrape_resource_entries(&d, &ResourceSelectors::default());
        assert_eq!(entries[0].display_name, "");
        assert_eq!(entries[0].relative_path, "講義.pdf");
    }

    #[test]
    fn no_table_no_entries() {
        let d = Document::parse("<p>login</p>", Url::parse(PAGE).unwrap());
        assert!(scrape_resource_entries(&d, &ResourceSelectors::default()).is_empty());
    }
}
