//! UI module root: exposes drawing functions for individual panels.

pub mod charts;
pub mod header;
pub mod status;
pub mod theme;
pub mod util;
