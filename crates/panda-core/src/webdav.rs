//! Recursive WebDAV collection crawler.
//!
//! Walks the HTML listing a WebDAV server renders for a collection GET,
//! depth-first in document order, and flattens every file below the root
//! into a [`FileEntry`] whose `relative_path` mirrors the directory layout.
//!
//! A collection that cannot be fetched contributes nothing; the walk carries
//! on with its siblings. Revisited collections and collections deeper than
//! [`CrawlLimits::max_depth`] are skipped, so cyclic or pathological listings
//! terminate.

use std::collections::HashSet;

use url::Url;

use crate::config::CrawlConfig;
use crate::fetch::{element_text, fetch_document, Document, Fetch};
use crate::model::FileEntry;
use crate::naming::{last_segment, percent_decode};

/// Anchor texts that mark a link back to the parent collection.
const PARENT_MARKERS: &[&str] = &["../", "..", "parent directory"];

#[derive(Debug, Clone, Copy)]
pub struct CrawlLimits {
    /// Deepest sub-collection level below the root that is still listed.
    pub max_depth: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        CrawlConfig::default().into()
    }
}

impl From<CrawlConfig> for CrawlLimits {
    fn from(cfg: CrawlConfig) -> Self {
        Self {
            max_depth: cfg.max_depth,
        }
    }
}

/// One anchor of a collection listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    pub href: String,
    pub text: String,
}

/// Anchors of a listing page in document order (anchors without `href` are dropped).
pub fn parse_listing(doc: &Document) -> Vec<ListingLink> {
    doc.select_all("a")
        .iter()
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            Some(ListingLink {
                href: href.to_string(),
                text: element_text(a),
            })
        })
        .collect()
}

/// Lists every file transitively under `root_url`.
///
/// Never fails: unreachable subtrees (including the root) yield no entries.
/// Order is document order, depth-first; callers must not rely on it.
pub fn crawl(fetcher: &dyn Fetch, root_url: &str, limits: CrawlLimits) -> Vec<FileEntry> {
    let root = match Url::parse(root_url) {
        Ok(u) => collection_url(u),
        Err(e) => {
            tracing::warn!(url = root_url, "WebDAV root is not a URL: {}", e);
            return Vec::new();
        }
    };

    let mut crawl = Crawl {
        fetcher,
        limits,
        root: root.clone(),
        visited: HashSet::new(),
        files: Vec::new(),
    };
    crawl.walk(root, String::new(), 0);
    tracing::info!(url = root_url, files = crawl.files.len(), "WebDAV crawl finished");
    crawl.files
}

struct Crawl<'a> {
    fetcher: &'a dyn Fetch,
    limits: CrawlLimits,
    root: Url,
    visited: HashSet<String>,
    files: Vec<FileEntry>,
}

impl Crawl<'_> {
    fn walk(&mut self, collection: Url, prefix: String, depth: usize) {
        if !self.visited.insert(visit_key(&collection)) {
            tracing::debug!(url = %collection, "collection already visited, skipping");
            return;
        }

        let Some(doc) = fetch_document(self.fetcher, collection.as_str()) else {
            tracing::warn!(url = %collection, "WebDAV listing unavailable; subtree skipped");
            return;
        };

        for link in parse_listing(&doc) {
            if is_parent_marker(&link) || link.href.starts_with('?') || link.href.starts_with('#') {
                continue;
            }
            let Some(target) = doc.resolve(&link.href) else {
                continue;
            };
            if !self.within_root(&target) || is_ancestor(&target, &collection) {
                continue;
            }

            if link.href.ends_with('/') {
                if depth + 1 > self.limits.max_depth {
                    tracing::warn!(url = %target, depth = depth + 1, "max crawl depth exceeded; branch skipped");
                    continue;
                }
                let Some(name) = last_segment(target.as_str()) else {
                    continue;
                };
                let sub_prefix = format!("{}{}/", prefix, name);
                self.walk(collection_url(target), sub_prefix, depth + 1);
            } else {
                let decoded = percent_decode(&link.text);
                let name = if decoded.trim().is_empty() {
                    match last_segment(target.as_str()) {
                        Some(n) => n,
                        None => continue,
                    }
                } else {
                    decoded.trim().to_string()
                };
                self.files.push(FileEntry {
                    download_url: target.to_string(),
                    relative_path: format!("{}{}", prefix, name),
                    display_name: name,
                });
            }
        }
    }

    fn within_root(&self, target: &Url) -> bool {
        target.origin() == self.root.origin() && target.path().starts_with(self.root.path())
    }
}

fn is_parent_marker(link: &ListingLink) -> bool {
    let text = link.text.trim().to_lowercase();
    PARENT_MARKERS.contains(&text.as_str()) || link.href == "../" || link.href == ".."
}

/// True when `target` is `collection` itself or one of its ancestors.
fn is_ancestor(target: &Url, collection: &Url) -> bool {
    let t = target.path().trim_end_matches('/');
    let c = collection.path().trim_end_matches('/');
    t.len() <= c.len() && c.starts_with(t) && (c.len() == t.len() || c.as_bytes()[t.len()] == b'/')
}

/// Normalizes a collection URL: no fragment or query, trailing `/` on the path.
fn collection_url(mut url: Url) -> Url {
    url.set_fragment(None);
    url.set_query(None);
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn visit_key(url: &Url) -> String {
    url.as_str().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;

    const ROOT: &str = "https://panda.example/dav/group/site-1/";

    fn listing(links: &[(&str, &str)]) -> String {
        let mut html = String::from("<html><body><ul>");
        for (href, text) in links {
            html.push_str(&format!("<li><a href=\"{}\">{}</a></li>", href, text));
        }
        html.push_str("</ul></body></html>");
        html
    }

    fn paths(files: &[FileEntry]) -> Vec<String> {
        let mut p: Vec<String> = files.iter().map(|f| f.relative_path.clone()).collect();
        p.sort();
        p
    }

    #[test]
    fn flat_listing_one_entry_per_file_anchor() {
        let fetcher = StaticFetcher::new().page(
            ROOT,
            &listing(&[("a.txt", "a.txt"), ("b%20c.pdf", "b%20c.pdf"), ("d.md", "d.md")]),
        );
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(files.len(), 3);
        assert_eq!(files[1].relative_path, "b c.pdf");
        assert_eq!(files[1].download_url, "https://panda.example/dav/group/site-1/b%20c.pdf");
    }

    #[test]
    fn recurses_into_sub_collections() {
        let fetcher = StaticFetcher::new()
            .page(ROOT, &listing(&[("sub/", "sub/"), ("a.txt", "a.txt")]))
            .page(&format!("{}sub/", ROOT), &listing(&[("b.txt", "b.txt")]));
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(paths(&files), vec!["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn parent_markers_never_listed() {
        let fetcher = StaticFetcher::new()
            .page(ROOT, &listing(&[("../", "../"), ("sub/", "sub/")]))
            .page(
                &format!("{}sub/", ROOT),
                &listing(&[("../", "Parent Directory"), ("/dav/group/site-1/", "up"), ("x.txt", "x.txt")]),
            );
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(paths(&files), vec!["sub/x.txt"]);
    }

    #[test]
    fn decoded_collection_names_in_prefix() {
        let sub = format!("{}%E8%B3%87%E6%96%99/", ROOT);
        let fetcher = StaticFetcher::new()
            .page(ROOT, &listing(&[("%E8%B3%87%E6%96%99/", "資料/")]))
            .page(&sub, &listing(&[("%E7%AC%AC1%E5%9B%9E.pdf", "第1回.pdf")]));
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(paths(&files), vec!["資料/第1回.pdf"]);
    }

    #[test]
    fn failed_subtree_is_empty_but_crawl_continues() {
        let fetcher = StaticFetcher::new()
            .page(ROOT, &listing(&[("broken/", "broken/"), ("ok.txt", "ok.txt")]))
            .status(&format!("{}broken/", ROOT), 500);
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(paths(&files), vec!["ok.txt"]);
    }

    #[test]
    fn root_404_yields_nothing() {
        let fetcher = StaticFetcher::new().status(ROOT, 404);
        assert!(crawl(&fetcher, ROOT, CrawlLimits::default()).is_empty());
    }

    #[test]
    fn cyclic_listing_terminates() {
        // a/ and b/ link to each other through absolute hrefs.
        let a = format!("{}a/", ROOT);
        let b = format!("{}b/", ROOT);
        let fetcher = StaticFetcher::new()
            .page(ROOT, &listing(&[("a/", "a/"), ("./", "self/")]))
            .page(&a, &listing(&[("/dav/group/site-1/b/", "b/"), ("x.txt", "x.txt")]))
            .page(&b, &listing(&[("/dav/group/site-1/a/", "a/"), ("y.txt", "y.txt")]));
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(paths(&files), vec!["a/b/y.txt", "a/x.txt"]);
        let a_fetches = fetcher.requests().iter().filter(|u| **u == a).count();
        assert_eq!(a_fetches, 1);
    }

    #[test]
    fn depth_limit_abandons_only_deep_branch() {
        let fetcher = StaticFetcher::new()
            .page(ROOT, &listing(&[("a/", "a/"), ("top.txt", "top.txt")]))
            .page(&format!("{}a/", ROOT), &listing(&[("b/", "b/"), ("mid.txt", "mid.txt")]))
            .page(&format!("{}a/b/", ROOT), &listing(&[("deep.txt", "deep.txt")]));
        let files = crawl(&fetcher, ROOT, CrawlLimits { max_depth: 1 });
        assert_eq!(paths(&files), vec!["a/mid.txt", "top.txt"]);
    }

    #[test]
    fn skips_links_outside_root_and_sort_links() {
        let fetcher = StaticFetcher::new().page(
            ROOT,
            &listing(&[
                ("?C=N;O=D", "Name"),
                ("https://elsewhere.example/x.pdf", "x.pdf"),
                ("/dav/group/other-site/y.pdf", "y.pdf"),
                ("z.pdf", "z.pdf"),
            ]),
        );
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(paths(&files), vec!["z.pdf"]);
    }

    #[test]
    fn empty_anchor_text_falls_back_to_href_name() {
        let fetcher = StaticFetcher::new().page(ROOT, &listing(&[("w2.pdf", "")]));
        let files = crawl(&fetcher, ROOT, CrawlLimits::default());
        assert_eq!(paths(&files), vec!["w2.pdf"]);
    }
}
