//! The recipe browser's feature views: their [`Markup`](`crate::view::Markup`) producers, default texts,
//! and event payload extraction.

use crate::host::{self, Host};
use core::str::FromStr;

pub mod pagination;
pub mod preview;
pub mod recipe;
pub mod search;
pub mod upload;

/// Parses the `data-…` attribute `name` of the closest element with `class`, starting at `target` and staying below `within`.
fn closest_data<H: Host + ?Sized, T: FromStr>(host: &H, target: &H::Node, class: &str, within: &H::Node, name: &str) -> Option<T> {
	let control = host::closest(host, target, class, within)?;
	host.attribute(&control, name)?.trim().parse().ok()
}
