//! CSS selectors and labels for portal markup.
//!
//! Every set has container-level serde defaults so a config file only needs
//! to name the selectors it overrides.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub navigation: NavigationSelectors,
    pub assignments: AssignmentSelectors,
    pub resources: ResourceSelectors,
}

/// Site navigation: course list, per-site tool menu, site title.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSelectors {
    pub course_link: String,
    pub tool_link: String,
    pub site_name: String,
    /// Course links whose title contains one of these are skipped.
    pub home_labels: Vec<String>,
}

impl Default for NavigationSelectors {
    fn default() -> Self {
        Self {
            course_link: "nav#linkNav ul#topnav li.Mrphs-sitesNav__menuitem a.link-container"
                .to_string(),
            tool_link: "nav#toolMenu ul li a".to_string(),
            site_name: ".Mrphs-hierarchy--siteName-label".to_string(),
            home_labels: vec!["ホーム".to_string(), "Home".to_string()],
        }
    }
}

/// Assignment tool: list rows, cells, detail text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignmentSelectors {
    pub row: String,
    pub title_cell: String,
    pub status_cell: String,
    pub due_cell: String,
    pub description: String,
    /// Tool menu labels identifying the assignment tool.
    pub tool_labels: Vec<String>,
    /// Status prefixes meaning the work was already handed in.
    pub submitted_prefixes: Vec<String>,
}

impl Default for AssignmentSelectors {
    fn default() -> Self {
        Self {
            row: r#"form[name="listAssignmentsForm"] table tbody tr"#.to_string(),
            title_cell: r#"td[headers="title"]"#.to_string(),
            status_cell: r#"td[headers="status"]"#.to_string(),
            due_cell: r#"td[headers="dueDate"]"#.to_string(),
            description: ".textPanel".to_string(),
            tool_labels: vec!["課題".to_string(), "Assignments".to_string()],
            submitted_prefixes: vec!["提出済み".to_string(), "Submitted".to_string()],
        }
    }
}

/// Resources tool table, used by the page-scrape fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSelectors {
    pub row: String,
    pub title_cell: String,
    /// Icon marking a row as a folder rather than a file.
    pub folder_marker: String,
    /// Direct content link inside the title cell.
    pub content_link: String,
}

impl Default for ResourceSelectors {
    fn default() -> Self {
        Self {
            row: r#"form[name="showForm"] table tbody tr"#.to_string(),
            title_cell: "td.specialLink.title".to_string(),
            folder_marker: ".fa-folder-open, .fa-folder".to_string(),
            content_link: r#"a[href*="/access/content/"]"#.to_string(),
        }
    }
}
