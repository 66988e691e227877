#![doc(html_root_url = "https://docs.rs/recipe-dom/0.1.0")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod diff;
pub mod dom;
pub mod events;
pub mod features;
pub mod host;
pub mod load;
pub mod markup;
pub mod patch;
pub mod vdom;
pub mod view;

#[cfg(feature = "web")]
pub mod web;

mod error;
pub use error::{Error, ProducerError};

/// Page content as it may appear in log records.
pub(crate) fn loggable(text: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		text
	} else {
		"<redacted>"
	}
}
