//! Commands restricted to members holding the guild's `Staff_Member` role.

pub mod network;
pub mod ui;
