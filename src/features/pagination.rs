//! Page navigation below the search results.

use super::closest_data;
use crate::{
	config::Config,
	events::{EventKind, Handlers, SubscriptionId},
	host::Host,
	markup::escape,
	view::{Markup, View, ViewConfig},
	ProducerError,
};
use core::{fmt::Write as _, hash::Hash, ops::Range};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
	/// 1-based.
	pub page: usize,
	pub result_count: usize,
	pub results_per_page: usize,
}

impl PageState {
	/// `⌈result_count / results_per_page⌉`, or 0 without a page size.
	#[must_use]
	pub fn total_pages(&self) -> usize {
		if self.results_per_page == 0 {
			return 0;
		}
		self.result_count.div_ceil(self.results_per_page)
	}

	/// The indices of the results shown on the current page, clamped to the result count.
	#[must_use]
	pub fn results(&self) -> Range<usize> {
		let start = self.page.saturating_sub(1).saturating_mul(self.results_per_page).min(self.result_count);
		let end = start.saturating_add(self.results_per_page).min(self.result_count);
		start..end
	}
}

/// A navigation button and the page it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
	Previous(usize),
	Next(usize),
}

/// Which buttons to show, in display order.
///
/// | position | controls |
/// |---|---|
/// | first of several pages | next |
/// | last of several pages | previous |
/// | strictly between | previous, next |
/// | single page, no pages, or out of range | none |
#[must_use]
pub fn controls(page: usize, total_pages: usize) -> Vec<Control> {
	if page == 1 && total_pages > 1 {
		return vec![Control::Next(2)];
	}
	if page == total_pages && total_pages > 1 {
		return vec![Control::Previous(page - 1)];
	}
	if 1 < page && page < total_pages {
		return vec![Control::Previous(page - 1), Control::Next(page + 1)];
	}
	vec![]
}

#[derive(Debug, Clone)]
pub struct Pagination {
	icons: String,
}

impl Pagination {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self { icons: config.icons.clone() }
	}

	fn button(&self, control: Control, markup: &mut String) {
		let (page, direction, arrow) = match control {
			Control::Previous(page) => (page, "prev", "left"),
			Control::Next(page) => (page, "next", "right"),
		};
		let label = format!("<span>Page {}</span>", page);
		let icon = format!("<svg class=\"search__icon\"><use href=\"{}#icon-arrow-{}\"></use></svg>", escape(&self.icons), arrow);
		let (first, second) = match control {
			Control::Previous(_) => (icon, label),
			Control::Next(_) => (label, icon),
		};
		// Writing to a `String` can't fail.
		let _ = write!(
			markup,
			"<button data-goto=\"{page}\" class=\"btn--inline pagination__btn--{direction}\">{first}{second}</button>",
			page = page,
			direction = direction,
			first = first,
			second = second,
		);
	}
}

impl Markup for Pagination {
	type Data = PageState;

	fn markup(&self, state: &PageState) -> Result<String, ProducerError> {
		let controls = controls(state.page, state.total_pages());
		trace!(page = state.page, total_pages = state.total_pages(), ?controls);
		let mut markup = String::new();
		for control in controls {
			self.button(control, &mut markup);
		}
		Ok(markup)
	}
}

#[must_use]
pub fn view<H: Host>(mount: H::Node, config: &Config) -> View<Pagination, H> {
	View::new(mount, Pagination::new(config), ViewConfig::default().with_icons(config))
}

/// The page a click on `target` asks for, if it hit a navigation button below `mount`.
#[must_use]
pub fn goto_page<H: Host + ?Sized>(host: &H, mount: &H::Node, target: &H::Node) -> Option<usize> {
	closest_data(host, target, "btn--inline", mount, "data-goto")
}

/// Calls `handler` with the requested page whenever a navigation button below `mount` is clicked.
pub fn add_handler_click<H>(handlers: &mut Handlers<H>, mount: H::Node, mut handler: impl FnMut(&mut H, usize) + 'static) -> SubscriptionId
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	handlers.subscribe(mount.clone(), EventKind::Click, move |host, event| match goto_page(host, &mount, &event.target) {
		Some(page) => handler(host, page),
		None => debug!("Click outside of any page button."),
	})
}
