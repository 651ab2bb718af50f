// feedsift: incremental post harvesting with sentiment reporting
//
// This is the library root. Each module corresponds to one stage of the
// collect -> classify -> report flow, plus the glue around it.

pub mod browser;
pub mod config;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod status;
pub mod store;
pub mod text;
