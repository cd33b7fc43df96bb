pub mod config;
pub mod logging;

pub mod archive;
pub mod assignments;
pub mod due;
pub mod fetch;
pub mod links;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod relay;
pub mod resources;
pub mod sidebar;
pub mod state;
pub mod storage;
pub mod submission;
pub mod webdav;
