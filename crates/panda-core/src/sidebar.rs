//! Terminal rendering of the assignment sidebar.
//!
//! The layout state (width in pixels, collapsed flag) is a plain value: the
//! caller loads it, passes it to [`render`], mutates it with [`SidebarState::toggle`]
//! or [`SidebarState::resize`], and persists it again.

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::due::{classify, parse_due, time_left};
use crate::model::Assignment;
use crate::state::{load_json, save_json, sidebar_state_path};

pub const DEFAULT_WIDTH: u32 = 300;
pub const COLLAPSED_WIDTH: u32 = 30;
pub const MIN_WIDTH: u32 = 150;
pub const MAX_WIDTH: u32 = 600;
/// Pixels per terminal column when mapping the sidebar width to text.
const PX_PER_COLUMN: u32 = 8;
const DESCRIPTION_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarState {
    pub width: u32,
    pub collapsed: bool,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            collapsed: false,
        }
    }
}

impl SidebarState {
    pub fn toggle(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Sets the expanded width, clamped to `[MIN_WIDTH, MAX_WIDTH]`.
    /// A collapsed sidebar cannot be resized; returns whether the width changed.
    pub fn resize(&mut self, px: u32) -> bool {
        if self.collapsed {
            return false;
        }
        let width = px.clamp(MIN_WIDTH, MAX_WIDTH);
        let changed = width != self.width;
        self.width = width;
        changed
    }

    /// Width currently on screen.
    pub fn effective_width(&self) -> u32 {
        if self.collapsed {
            COLLAPSED_WIDTH
        } else {
            self.width
        }
    }

    /// Persisted state, or the default when none was saved. A stored width
    /// outside the allowed range is clamped on load.
    pub fn load() -> Result<Self> {
        let mut state: Self = load_json(&sidebar_state_path()?)?;
        state.width = state.width.clamp(MIN_WIDTH, MAX_WIDTH);
        Ok(state)
    }

    pub fn save(&self) -> Result<()> {
        save_json(&sidebar_state_path()?, self)
    }
}

/// Renders the sidebar as text.
pub fn render(state: &SidebarState, assignments: &[Assignment], now: NaiveDateTime) -> String {
    if state.collapsed {
        return format!("> Assignments ({})\n", assignments.len());
    }

    let columns = (state.width / PX_PER_COLUMN).max(1) as usize;
    let rule = "-".repeat(columns);
    let mut out = String::new();
    out.push_str("< Assignments\n");
    out.push_str(&rule);
    out.push('\n');

    for a in assignments {
        let (tag, left) = match parse_due(&a.due_date) {
            Some(due) => (classify(due, now).label(), time_left(due, now)),
            None => ("LATER", String::new()),
        };
        let mut card = vec![format!("[{}] {}", tag, a.title), a.course.clone()];
        card.push(format!("Due: {}", a.due_date));
        if !left.is_empty() {
            card.push(left);
        }
        card.push(format!("Status: {}", a.status));
        if !a.description.is_empty() {
            card.push(truncate(&a.description, DESCRIPTION_LIMIT));
        }
        for line in card {
            for wrapped in wrap(&line, columns) {
                out.push_str(&wrapped);
                out.push('\n');
            }
        }
        out.push_str(&rule);
        out.push('\n');
    }
    out
}

/// Cuts `s` to `limit - 1` characters plus `...` when longer than `limit`.
pub fn truncate(s: &str, limit: usize) -> String {
    if s.chars().count() > limit {
        let head: String = s.chars().take(limit.saturating_sub(1)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Hard-wraps at `columns` characters.
fn wrap(line: &str, columns: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(columns).map(|c| c.iter().collect()).collect()
}
