#[path = "../common/mod.rs"]
mod common;

mod compiler;
mod end_to_end;
mod forward_compat;
mod format_validation;
mod round_trip;
mod version_selection;
