//! Course and assignment scraper.
//!
//! Courses come from the portal's top navigation. Each course is scanned on
//! its own: course page, then the assignment tool's list, then each pending
//! assignment's detail page for its description. Courses are processed one
//! after another and a course that fails to load is skipped.

use chrono::NaiveDateTime;

use crate::config::{AssignmentSelectors, NavigationSelectors};
use crate::due::is_expired;
use crate::fetch::{element_text, fetch_document, selector, Document, Fetch};
use crate::model::Assignment;

/// A course site linked from the portal navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseLink {
    pub title: String,
    pub url: String,
}

/// Course links of a portal page, skipping the home site.
pub fn list_courses(doc: &Document, selectors: &NavigationSelectors) -> Vec<CourseLink> {
    doc.select_all(&selectors.course_link)
        .iter()
        .filter_map(|a| {
            let title = match a.value().attr("title") {
                Some(t) if !t.trim().is_empty() => t.trim().to_string(),
                _ => element_text(a),
            };
            if selectors.home_labels.iter().any(|h| title.contains(h.as_str())) {
                return None;
            }
            let url = doc.resolve(a.value().attr("href")?)?;
            Some(CourseLink {
                title,
                url: url.to_string(),
            })
        })
        .collect()
}

/// Scans every course for pending assignments, reporting progress through `on_status`.
///
/// An assignment is pending when its due date is not in the past (unparsable
/// dates count as pending) and its status is not a submitted one.
pub fn scan_assignments(
    fetcher: &dyn Fetch,
    courses: &[CourseLink],
    nav: &NavigationSelectors,
    selectors: &AssignmentSelectors,
    now: NaiveDateTime,
    on_status: &mut dyn FnMut(&str),
) -> Vec<Assignment> {
    let total = courses.len();
    on_status(&format!("Found {} courses. Scanning...", total));

    let mut found = Vec::new();
    for (i, course) in courses.iter().enumerate() {
        let before = found.len();
        scan_course(fetcher, course, nav, selectors, now, &mut found);
        tracing::debug!(course = %course.title, pending = found.len() - before, "course scanned");
        on_status(&format!("Scanned {}/{} courses...", i + 1, total));
    }

    if found.is_empty() {
        on_status("No active assignments found.");
    }
    tracing::info!(courses = total, pending = found.len(), "assignment scan finished");
    found
}

fn scan_course(
    fetcher: &dyn Fetch,
    course: &CourseLink,
    nav: &NavigationSelectors,
    selectors: &AssignmentSelectors,
    now: NaiveDateTime,
    out: &mut Vec<Assignment>,
) {
    let Some(course_doc) = fetch_document(fetcher, &course.url) else {
        return;
    };
    let Some(tool_url) = assignment_tool_url(&course_doc, nav, selectors) else {
        tracing::debug!(course = %course.title, "no assignment tool");
        return;
    };
    let Some(list) = fetch_document(fetcher, &tool_url) else {
        return;
    };

    let (Some(title_sel), Some(status_sel), Some(due_sel), Some(a_sel)) = (
        selector(&selectors.title_cell),
        selector(&selectors.status_cell),
        selector(&selectors.due_cell),
        selector("a"),
    ) else {
        return;
    };

    for row in list.select_all(&selectors.row) {
        let (Some(title_cell), Some(status_cell), Some(due_cell)) = (
            row.select(&title_sel).next(),
            row.select(&status_sel).next(),
            row.select(&due_sel).next(),
        ) else {
            continue;
        };
        let Some(link) = title_cell.select(&a_sel).next() else {
            continue;
        };
        let Some(detail_url) = link.value().attr("href").and_then(|h| list.resolve(h)) else {
            continue;
        };

        let status = element_text(&status_cell);
        let due_date = element_text(&due_cell);
        if is_expired(&due_date, now) {
            continue;
        }
        if selectors
            .submitted_prefixes
            .iter()
            .any(|p| status.starts_with(p.as_str()))
        {
            continue;
        }

        let description = fetch_description(fetcher, detail_url.as_str(), &selectors.description);
        out.push(Assignment {
            course: course.title.clone(),
            title: element_text(&link),
            status,
            due_date,
            description,
            url: detail_url.to_string(),
        });
    }
}

/// URL of the first tool-menu link labelled as the assignment tool.
pub fn assignment_tool_url(
    doc: &Document,
    nav: &NavigationSelectors,
    selectors: &AssignmentSelectors,
) -> Option<String> {
    doc.select_all(&nav.tool_link)
        .into_iter()
        .find(|a| {
            let text = element_text(a);
            selectors.tool_labels.iter().any(|l| *l == text)
        })
        .and_then(|a| doc.resolve(a.value().attr("href")?))
        .map(|u| u.to_string())
}

fn fetch_description(fetcher: &dyn Fetch, url: &str, css: &str) -> String {
    fetch_document(fetcher, url)
        .and_then(|doc| doc.select_first(css).map(|el| element_text(&el)))
        .unwrap_or_default()
}
