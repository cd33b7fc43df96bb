//! `panda sidebar toggle|width|show`.

use anyhow::Result;
use panda_core::sidebar::SidebarState;

use crate::cli::SidebarAction;

pub fn run_sidebar(action: SidebarAction) -> Result<()> {
    let mut state = SidebarState::load()?;
    match action {
        SidebarAction::Toggle => {
            state.toggle();
            state.save()?;
        }
        SidebarAction::Width { px } => {
            if !state.resize(px) && state.collapsed {
                println!("sidebar is collapsed; expand it first");
            }
            state.save()?;
        }
        SidebarAction::Show => {}
    }
    println!(
        "{} ({}px, expanded width {}px)",
        if state.collapsed { "collapsed" } else { "expanded" },
        state.effective_width(),
        state.width
    );
    Ok(())
}
