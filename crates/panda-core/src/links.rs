//! External study links for a course: KULASIS syllabus, ku1025 and kuwiki
//! past-exam archives.
//!
//! The syllabus link starts as the catalogue's entry page and is upgraded to
//! the course's own page once its id is found in that catalogue. Ids are
//! cached by course name.

use std::sync::LazyLock;

use encoding_rs::SHIFT_JIS;
use regex::Regex;
use url::Url;

use crate::fetch::{element_text, Document, Fetch};
use crate::state::{SyllabusCache, SyllabusId};

const KULASIS_ENTRY: &str = "https://www.k.kyoto-u.ac.jp/student/la/entry/";
const KULASIS_LA_DETAIL: &str = "https://www.k.kyoto-u.ac.jp/student/la/support/lecture_detail";
const KULASIS_DETAIL: &str = "https://www.k.kyoto-u.ac.jp/student/u/t/support/syllabus_detail";
const KU1025_BASE: &str = "https://ku1025.netlify.app/";
const KUWIKI_BASE: &str = "https://www.kuwiki.net/";

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d{4})").expect("year regex"));
static BRACKET_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[.*?\]\s*").expect("bracket regex"));
static HREF_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"no=(\d+)").expect("href id regex"));
static ONCLICK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{5})").expect("onclick id regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Semester {
    Zenki,
    Kouki,
}

impl Semester {
    pub fn as_str(self) -> &'static str {
        match self {
            Semester::Zenki => "zenki",
            Semester::Kouki => "kouki",
        }
    }
}

/// A portal site title split into its parts, e.g. `[2024前期月2]線形代数学`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseTitle {
    pub name: String,
    pub year: Option<i32>,
    pub semester: Semester,
}

pub fn parse_course_string(full: &str) -> CourseTitle {
    let full = full.trim();
    let year = YEAR.captures(full).and_then(|c| c[1].parse().ok());
    let semester = if full.contains("前期") && !full.contains("後期") {
        Semester::Zenki
    } else {
        Semester::Kouki
    };
    let name = BRACKET_PREFIX.replace(full, "").trim().to_string();
    CourseTitle {
        name,
        year,
        semester,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalLinks {
    /// Syllabus catalogue entry page until the course page is resolved.
    pub syllabus: String,
    pub ku1025: String,
    pub kuwiki: String,
}

impl ExternalLinks {
    pub fn for_course(title: &CourseTitle) -> Result<Self, url::ParseError> {
        let mut ku1025 = Url::parse(KU1025_BASE)?;
        ku1025
            .path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithoutBase)?
            .pop_if_empty()
            .push(&format!("{}.html", title.name));
        let kuwiki = Url::parse_with_params(KUWIKI_BASE, &[("q", title.name.as_str())])?;
        Ok(Self {
            syllabus: entry_url(title.semester),
            ku1025: ku1025.to_string(),
            kuwiki: kuwiki.to_string(),
        })
    }

    /// Replaces the catalogue entry link with the course's syllabus page.
    pub fn with_syllabus(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.syllabus = url;
        }
        self
    }
}

/// KULASIS catalogue entry page for a semester.
pub fn entry_url(semester: Semester) -> String {
    format!("{}{}", KULASIS_ENTRY, semester.as_str())
}

/// Detail page URL for a syllabus id.
pub fn syllabus_url(id: &SyllabusId) -> String {
    let base = if id.liberal_arts {
        KULASIS_LA_DETAIL
    } else {
        KULASIS_DETAIL
    };
    format!("{}?no={}", base, id.id)
}

/// Finds the course in the catalogue entry page (Shift_JIS unless declared
/// otherwise) and returns its syllabus page. Any failure is `None`; found ids
/// are stored in `cache`.
pub fn resolve_syllabus(
    fetcher: &dyn Fetch,
    title: &CourseTitle,
    cache: &mut SyllabusCache,
) -> Option<String> {
    if title.name.is_empty() {
        return None;
    }
    if let Some(hit) = cache.get(&title.name) {
        return Some(syllabus_url(hit));
    }

    let url = entry_url(title.semester);
    let body = match fetcher.get(&url) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(url = %url, "syllabus catalogue unavailable: {}", e);
            return None;
        }
    };
    let doc = Document::parse(&body.text_or(SHIFT_JIS), Url::parse(&url).ok()?);
    let id = find_syllabus_id(&doc, &title.name)?;
    tracing::debug!(course = %title.name, id = %id.id, "syllabus id resolved");
    let resolved = syllabus_url(&id);
    cache.insert(&title.name, id);
    Some(resolved)
}

/// Id of the first catalogue anchor whose text mentions `course_name`.
pub fn find_syllabus_id(doc: &Document, course_name: &str) -> Option<SyllabusId> {
    let anchor = doc
        .select_all("a")
        .into_iter()
        .find(|a| element_text(a).contains(course_name))?;
    let href = anchor.value().attr("href").unwrap_or("");
    let id = if href.contains("no=") {
        HREF_ID.captures(href).map(|c| c[1].to_string())
    } else {
        anchor
            .value()
            .attr("onclick")
            .and_then(|js| ONCLICK_ID.captures(js))
            .map(|c| c[1].to_string())
    }?;
    Some(SyllabusId {
        id,
        liberal_arts: href.contains("/la/"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::StaticFetcher;
    use crate::fetch::FetchedBody;

    #[test]
    fn parses_title_parts() {
        let t = parse_course_string("[2024前期月2]線形代数学A ");
        assert_eq!(t.name, "線形代数学A");
        assert_eq!(t.year, Some(2024));
        assert_eq!(t.semester, Semester::Zenki);

        let t = parse_course_string("Physics");
        assert_eq!(t.name, "Physics");
        assert_eq!(t.year, None);
        assert_eq!(t.semester, Semester::Kouki);
    }

    #[test]
    fn external_links_encode_name() {
        let links = ExternalLinks::for_course(&parse_course_string("[2024後期]情報 基礎")).unwrap();
        assert_eq!(links.syllabus, "https://www.k.kyoto-u.ac.jp/student/la/entry/kouki");
        assert_eq!(
            links.ku1025,
            "https://ku1025.netlify.app/%E6%83%85%E5%A0%B1%20%E5%9F%BA%E7%A4%8E.html"
        );
        assert_eq!(
            links.kuwiki,
            "https://www.kuwiki.net/?q=%E6%83%85%E5%A0%B1+%E5%9F%BA%E7%A4%8E"
        );
    }

    fn catalogue(body: &str) -> FetchedBody {
        let (sjis, _, _) = SHIFT_JIS.encode(body);
        FetchedBody {
            status: 200,
            content_type: Some("text/html".into()),
            bytes: sjis.into_owned(),
            ..FetchedBody::default()
        }
    }

    #[test]
    fn resolves_from_shift_jis_catalogue_and_caches() {
        let fetcher = StaticFetcher::new().body(
            "https://www.k.kyoto-u.ac.jp/student/la/entry/zenki",
            catalogue(
                r#"<a href="/student/la/support/lecture_detail?no=34567">線形代数学A</a>
                   <a href="x?no=1">線形代数学A(再)</a>"#,
            ),
        );
        let title = parse_course_string("[2024前期]線形代数学A");
        let mut cache = SyllabusCache::default();
        let url = resolve_syllabus(&fetcher, &title, &mut cache);
        assert_eq!(
            url.as_deref(),
            Some("https://www.k.kyoto-u.ac.jp/student/la/support/lecture_detail?no=34567")
        );
        assert!(cache.get("線形代数学A").is_some());

        let again = resolve_syllabus(&fetcher, &title, &mut cache);
        assert_eq!(again, url);
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn onclick_id_uses_faculty_catalogue() {
        let fetcher = StaticFetcher::new().body(
            "https://www.k.kyoto-u.ac.jp/student/la/entry/kouki",
            catalogue(r#"<a href="javascript:void(0)" onclick="openDetail('2024', '12345')">力学</a>"#),
        );
        let mut cache = SyllabusCache::default();
        let url = resolve_syllabus(&fetcher, &parse_course_string("力学"), &mut cache);
        assert_eq!(
            url.as_deref(),
            Some("https://www.k.kyoto-u.ac.jp/student/u/t/support/syllabus_detail?no=12345")
        );
    }

    #[test]
    fn unresolvable_is_none() {
        let fetcher = StaticFetcher::new().body(
            "https://www.k.kyoto-u.ac.jp/student/la/entry/kouki",
            catalogue("<a href=\"x\">別の科目</a>"),
        );
        let mut cache = SyllabusCache::default();
        assert!(resolve_syllabus(&fetcher, &parse_course_string("力学"), &mut cache).is_none());
        let offline = StaticFetcher::new();
        assert!(resolve_syllabus(&offline, &parse_course_string("力学"), &mut cache).is_none());
        assert!(cache.entries.is_empty());
    }
}
