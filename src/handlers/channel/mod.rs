//! Channel membership handlers: JOIN, PART and NAMES.
//!
//! All three are refused with ERR_NOTREGISTERED before registration.

mod join;
mod names;
mod part;

pub use join::JoinHandler;
pub use names::NamesHandler;
use names::send_names;
pub use part::PartHandler;

use std::sync::Arc;

use crate::state::{Channel, Session};

/// Split a comma list, skipping empty items.
fn split_targets(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').filter(|name| !name.is_empty())
}

fn find_channel(session: &Session, name: &str) -> Option<Arc<dyn Channel>> {
    session
        .matrix
        .channels
        .as_ref()
        .and_then(|directory| directory.get_channel(name))
}
