//! Terminal presentation: colours, shared output lines and the interactive menu.

pub mod menu;
pub mod output;
pub mod theme;
