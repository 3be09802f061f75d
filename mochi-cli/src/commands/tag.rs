//! Group tag command

use mochi_core::domain::group_tag::GroupTag;

/// Print a group tag of the kind the launcher attaches to a run
pub fn print_tag() {
    println!("{}", GroupTag::generate());
}
