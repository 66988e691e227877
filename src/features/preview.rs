//! Recipe previews, as listed in the search results and the bookmarks panel.

use crate::{
	config::Config,
	events::{EventKind, Handlers, SubscriptionId},
	host::Host,
	markup::escape,
	view::{Markup, View, ViewConfig},
	ProducerError,
};
use core::{fmt::Write as _, hash::Hash};
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub image: String,
	/// Uploaded by the current user.
	pub user_generated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewList {
	pub items: Vec<Preview>,
	/// The recipe currently open in the detail view. Its preview is highlighted.
	pub active_id: Option<String>,
}

impl PreviewList {
	#[must_use]
	pub fn new(items: Vec<Preview>, active_id: Option<String>) -> Self {
		Self { items, active_id }
	}
}

/// The previews shown on 1-based `page`. Out-of-range pages are empty.
#[must_use]
pub fn page_slice<T>(items: &[T], page: usize, results_per_page: usize) -> &[T] {
	let start = page.saturating_sub(1).saturating_mul(results_per_page).min(items.len());
	let end = start.saturating_add(results_per_page).min(items.len());
	&items[start..end]
}

#[derive(Debug, Clone)]
pub struct PreviewMarkup {
	icons: String,
}

impl PreviewMarkup {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self { icons: config.icons.clone() }
	}

	fn item(&self, preview: &Preview, active: bool, markup: &mut String) {
		let link_class = if active { "preview__link preview__link--active" } else { "preview__link" };
		let user_class = if preview.user_generated { "preview__user-generated" } else { "preview__user-generated hidden" };
		// Writing to a `String` can't fail.
		let _ = write!(
			markup,
			concat!(
				"<li class=\"preview\">",
				"<a class=\"{link_class}\" href=\"#{id}\">",
				"<figure class=\"preview__fig\"><img src=\"{image}\" alt=\"{title}\" /></figure>",
				"<div class=\"preview__data\">",
				"<h4 class=\"preview__title\">{title}</h4>",
				"<p class=\"preview__publisher\">{publisher}</p>",
				"<div class=\"{user_class}\"><svg><use href=\"{icons}#icon-user\"></use></svg></div>",
				"</div>",
				"</a>",
				"</li>",
			),
			link_class = link_class,
			id = escape(&preview.id),
			image = escape(&preview.image),
			title = escape(&preview.title),
			publisher = escape(&preview.publisher),
			user_class = user_class,
			icons = escape(&self.icons),
		);
	}
}

impl Markup for PreviewMarkup {
	type Data = PreviewList;

	fn markup(&self, list: &PreviewList) -> Result<String, ProducerError> {
		trace!(items = list.items.len(), active = list.active_id.is_some());
		let mut markup = String::new();
		for preview in &list.items {
			let active = list.active_id.as_deref() == Some(preview.id.as_str());
			self.item(preview, active, &mut markup);
		}
		Ok(markup)
	}

	fn is_empty(&self, list: &PreviewList) -> bool {
		list.items.is_empty()
	}
}

/// The search results list.
#[must_use]
pub fn results_view<H: Host>(mount: H::Node, config: &Config) -> View<PreviewMarkup, H> {
	View::new(
		mount,
		PreviewMarkup::new(config),
		ViewConfig::new("No recipes found for your query! Please try again ;)", "").with_icons(config),
	)
}

/// The bookmarks panel.
#[must_use]
pub fn bookmarks_view<H: Host>(mount: H::Node, config: &Config) -> View<PreviewMarkup, H> {
	View::new(
		mount,
		PreviewMarkup::new(config),
		ViewConfig::new("No recipe found. Please try another one!", "No bookmarks yet, Find a nice recipe and bookmark it.").with_icons(config),
	)
}

/// Calls `handler` once the page has loaded, to restore stored bookmarks.
pub fn add_handler_render<H>(handlers: &mut Handlers<H>, root: H::Node, mut handler: impl FnMut(&mut H) + 'static) -> SubscriptionId
where
	H: Host,
	H::Node: Hash + Eq + 'static,
{
	handlers.subscribe(root, EventKind::Load, move |host, _| handler(host))
}
