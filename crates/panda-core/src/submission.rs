//! Share text for a submitted assignment.
//!
//! Reads the portal's submission confirmation page, looks up the
//! assignment's due date in the course's assignment list, and composes a
//! post with the time that was left.

use chrono::NaiveDateTime;

use crate::config::AssignmentSelectors;
use crate::due::parse_due;
use crate::fetch::{element_text, selector, Document};

const SUCCESS_BANNER: &str = ".sak-banner-success";
const SUCCESS_TEXT: &str = "あなたの課題は提出されました";
const SUMMARY_ROWS: &str = "table.itemSummary tr";
const SHARE_BASE: &str = "https://twitter.com/intent/tweet";

/// Message shown by the portal after a successful submission.
pub const CONFIRMATION_MESSAGE: &str =
    "あなたの課題は提出されました． この情報が記された確認のためのメールがあなた宛に送信されます．";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub course: String,
    pub title: String,
    pub submitted_at: String,
}

/// Fields of the confirmation summary, or `None` unless the page confirms a
/// submission and names the course, the assignment and the time.
pub fn parse_confirmation(doc: &Document) -> Option<Submission> {
    let banner = doc.select_first(SUCCESS_BANNER)?;
    if !element_text(&banner).contains(SUCCESS_TEXT) {
        return None;
    }
    let (th_sel, td_sel) = (selector("th")?, selector("td")?);

    let mut course = String::new();
    let mut title = String::new();
    let mut submitted_at = String::new();
    for row in doc.select_all(SUMMARY_ROWS) {
        let Some(td) = row.select(&td_sel).next() else {
            continue;
        };
        let header = row.select(&th_sel).next().map(|th| element_text(&th)).unwrap_or_default();
        let value = element_text(&td);
        if header.contains("クラスサイト") {
            course = value.clone();
        }
        if header.contains("課題") {
            title = value.clone();
        }
        if header.contains("提出日時") {
            submitted_at = value;
        }
    }

    if course.is_empty() || title.is_empty() || submitted_at.is_empty() {
        return None;
    }
    Some(Submission {
        course,
        title,
        submitted_at,
    })
}

fn normalize(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Due text of the first list row whose title contains, or is contained in,
/// `title` once all whitespace is removed.
pub fn find_due_in_list(list: &Document, title: &str, selectors: &AssignmentSelectors) -> Option<String> {
    let wanted = normalize(title);
    if wanted.is_empty() {
        return None;
    }
    let (title_sel, due_sel, a_sel) = (
        selector(&selectors.title_cell)?,
        selector(&selectors.due_cell)?,
        selector("a")?,
    );
    for row in list.select_all(&selectors.row) {
        let Some(cell) = row.select(&title_sel).next() else {
            continue;
        };
        let row_title = match cell.select(&a_sel).next() {
            Some(a) => a
                .value()
                .attr("title")
                .map(str::to_string)
                .unwrap_or_else(|| element_text(&a)),
            None => element_text(&cell),
        };
        let have = normalize(&row_title);
        if have.is_empty() || !(have.contains(&wanted) || wanted.contains(&have)) {
            continue;
        }
        return row.select(&due_sel).next().map(|d| element_text(&d));
    }
    None
}

/// Time between submission and deadline in Japanese units, or `None` when
/// either does not parse or the submission was late.
pub fn remaining(submitted_at: &str, due: &str) -> Option<String> {
    let submitted: NaiveDateTime = parse_due(submitted_at)?;
    let due = parse_due(due)?;
    let minutes = (due - submitted).num_minutes();
    if minutes < 0 {
        return None;
    }
    let (days, hours, mins) = (minutes / (60 * 24), (minutes % (60 * 24)) / 60, minutes % 60);
    Some(if days > 0 {
        format!("{}日{}時間{}分", days, hours, mins)
    } else if hours > 0 {
        format!("{}時間{}分", hours, mins)
    } else {
        format!("{}分", mins)
    })
}

pub fn share_text(submission: &Submission, remaining: Option<&str>) -> String {
    let mut text = format!(
        "{}\nクラスサイト: {}\n課題: {}\n提出日時: {}",
        CONFIRMATION_MESSAGE, submission.course, submission.title, submission.submitted_at
    );
    if let Some(left) = remaining {
        text.push_str(&format!(" (期限まで {})", left));
    }
    text
}

pub fn share_url(text: &str) -> String {
    url::Url::parse_with_params(SHARE_BASE, &[("text", text)])
        .map(|u| u.to_string())
        .unwrap_or_else(|_| SHARE_BASE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page(html: &str) -> Document {
        Document::parse(html, Url::parse("https://panda.example/portal/site/x/tool/y").unwrap())
    }

    const CONFIRM: &str = r##"
        <div class="sak-banner-success">あなたの課題は提出されました． この情報が記された…</div>
        <table class="itemSummary">
          <tr><th>クラスサイト</th><td> 線形代数学A </td></tr>
          <tr><th>課題</th><td><a href="#">第3回 レポート</a></td></tr>
          <tr><th>提出日時</th><td>2024/05/10 21:30</td></tr>
        </table>"##;

    #[test]
    fn parses_confirmation() {
        let s = parse_confirmation(&page(CONFIRM)).unwrap();
        assert_eq!(s.course, "線形代数学A");
        assert_eq!(s.title, "第3回 レポート");
        assert_eq!(s.submitted_at, "2024/05/10 21:30");
    }

    #[test]
    fn no_banner_no_submission() {
        assert!(parse_confirmation(&page("<table class=\"itemSummary\"></table>")).is_none());
        let wrong = CONFIRM.replace("あなたの課題は提出されました", "Saved");
        assert!(parse_confirmation(&page(&wrong)).is_none());
    }

    #[test]
    fn due_lookup_ignores_whitespace() {
        let list = page(r#"<form name="listAssignmentsForm"><table><tbody>
            <tr><td headers="title"><a href="/a/1">第1回</a></td><td headers="dueDate">2024/04/20 23:59</td></tr>
            <tr><td headers="title"><a href="/a/3">第3回
                レポート</a></td><td headers="dueDate">2024/05/11 23:59</td></tr>
        </tbody></table></form>"#);
        let due = find_due_in_list(&list, "第3回 レポート", &AssignmentSelectors::default());
        assert_eq!(due.as_deref(), Some("2024/05/11 23:59"));
        assert!(find_due_in_list(&list, "  ", &AssignmentSelectors::default()).is_none());
    }

    #[test]
    fn remaining_units() {
        assert_eq!(remaining("2024/05/10 21:30", "2024/05/11 23:59").as_deref(), Some("1日2時間29分"));
        assert_eq!(remaining("2024/05/11 21:30", "2024/05/11 23:59").as_deref(), Some("2時間29分"));
        assert_eq!(remaining("2024/05/11 23:50", "2024/05/11 23:59").as_deref(), Some("9分"));
        assert_eq!(remaining("2024/05/12 00:00", "2024/05/11 23:59"), None);
        assert_eq!(remaining("?", "2024/05/11 23:59"), None);
    }

    #[test]
    fn share_text_and_url() {
        let s = Submission {
            course: "C".into(),
            title: "T".into(),
            submitted_at: "2024/05/10 21:30".into(),
        };
        let text = share_text(&s, Some("9分"));
        assert!(text.ends_with("提出日時: 2024/05/10 21:30 (期限まで 9分)"));
        let url = share_url("a b");
        assert_eq!(url, "https://twitter.com/intent/tweet?text=a+b");
    }
}
