//! The render lifecycle shared by every feature view.
//!
//! A [`View`] owns one mount point in a [`Host`] tree and a [`Markup`] producer.
//! [`render`](`View::render`) replaces the mount point's contents wholesale.
//! [`render_update`](`View::render_update`) diffs the producer's output against what is mounted and patches only what changed,
//! so that nodes without structural changes keep their identity (and with it focus, selection or scroll position).

use crate::{
	config::{self, Config},
	diff::TreeDiffer,
	host::{self, Host},
	load::load_child_nodes,
	markup,
	patch,
	vdom::{Attribute, Element, Node},
	Error, ProducerError,
};
use core::marker::PhantomData;
use tracing::{debug, instrument, trace, warn};

/// Turns feature data into markup.
///
/// Implementations must be pure: the same data always yields the same markup.
pub trait Markup {
	type Data;

	/// # Errors
	///
	/// Iff `data` can't be rendered. The error reaches the caller of [`View::render`] or [`View::render_update`] unchanged.
	fn markup(&self, data: &Self::Data) -> Result<String, ProducerError>;

	/// Whether `data` should be shown as the view's "not found" error instead of being rendered.
	fn is_empty(&self, _data: &Self::Data) -> bool {
		false
	}
}

/// What a mount point currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
	Empty,
	Spinner,
	Error,
	Message,
	Rendered,
}

/// How a [`View::render_update`] call reached its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// The mounted tree was patched in place with this many patches (possibly zero).
	Patched(usize),
	/// The mount point's contents were replaced wholesale.
	Replaced,
}

/// Per-view texts and icons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
	pub error_message: String,
	pub message: String,
	pub icons: String,
}

impl ViewConfig {
	#[must_use]
	pub fn new(error_message: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			error_message: error_message.into(),
			message: message.into(),
			icons: Config::default().icons,
		}
	}

	#[must_use]
	pub fn with_icons(mut self, config: &Config) -> Self {
		self.icons.clone_from(&config.icons);
		self
	}
}

impl Default for ViewConfig {
	fn default() -> Self {
		Self::new("Something went wrong. Please try again!", "")
	}
}

/// A transient window shown on top of the page, with the backdrop behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay<N> {
	pub window: N,
	pub backdrop: N,
}

const HIDDEN: &str = "hidden";

impl<N> Overlay<N> {
	/// # Errors
	///
	/// Iff the host fails.
	pub fn hide<H: Host<Node = N> + ?Sized>(&self, host: &mut H) -> Result<(), Error> {
		host::add_class(host, &self.window, HIDDEN)?;
		host::add_class(host, &self.backdrop, HIDDEN)?;
		Ok(())
	}

	/// # Errors
	///
	/// Iff the host fails.
	pub fn show<H: Host<Node = N> + ?Sized>(&self, host: &mut H) -> Result<(), Error> {
		host::remove_class(host, &self.window, HIDDEN)?;
		host::remove_class(host, &self.backdrop, HIDDEN)?;
		Ok(())
	}

	/// # Errors
	///
	/// Iff the host fails.
	pub fn toggle<H: Host<Node = N> + ?Sized>(&self, host: &mut H) -> Result<(), Error> {
		if self.is_open(host) {
			self.hide(host)
		} else {
			self.show(host)
		}
	}

	/// The window counts as open while it doesn't carry the `hidden` class.
	#[must_use]
	pub fn is_open<H: Host<Node = N> + ?Sized>(&self, host: &H) -> bool {
		!host::has_class(host, &self.window, HIDDEN)
	}
}

pub struct View<M: Markup, H: Host> {
	mount: H::Node,
	producer: M,
	config: ViewConfig,
	data: Option<M::Data>,
	state: MountState,
	overlay: Option<Overlay<H::Node>>,
	differ: TreeDiffer,
	_host: PhantomData<fn(&mut H)>,
}

impl<M: Markup, H: Host> View<M, H> {
	/// Binds a view to `mount`. The mount point is assumed to be empty or to hold nothing this view needs to keep.
	#[must_use]
	pub fn new(mount: H::Node, producer: M, config: ViewConfig) -> Self {
		Self {
			mount,
			producer,
			config,
			data: None,
			state: MountState::Empty,
			overlay: None,
			differ: TreeDiffer::default(),
			_host: PhantomData,
		}
	}

	#[must_use]
	pub fn with_overlay(mut self, window: H::Node, backdrop: H::Node) -> Self {
		self.overlay = Some(Overlay { window, backdrop });
		self
	}

	#[must_use]
	pub fn mount(&self) -> &H::Node {
		&self.mount
	}

	#[must_use]
	pub fn producer(&self) -> &M {
		&self.producer
	}

	#[must_use]
	pub fn config(&self) -> &ViewConfig {
		&self.config
	}

	/// The data of the last successful [`render`](`View::render`) or [`render_update`](`View::render_update`).
	#[must_use]
	pub fn data(&self) -> Option<&M::Data> {
		self.data.as_ref()
	}

	#[must_use]
	pub fn state(&self) -> MountState {
		self.state
	}

	#[must_use]
	pub fn overlay(&self) -> Option<&Overlay<H::Node>> {
		self.overlay.as_ref()
	}

	/// The producer's markup for `data`, without mounting anything.
	///
	/// # Errors
	///
	/// Iff the producer fails.
	pub fn markup(&self, data: &M::Data) -> Result<String, Error> {
		self.producer.markup(data).map_err(Error::Producer)
	}

	/// Replaces the mount point's contents with `data` rendered from scratch.
	///
	/// Empty data is shown as the default error message instead.
	///
	/// # Errors
	///
	/// Iff the producer fails, its markup doesn't parse, or the host fails.
	/// The mount point is untouched in the first two cases.
	#[instrument(skip(self, host, data), fields(mount = ?self.mount))]
	pub fn render(&mut self, host: &mut H, data: M::Data) -> Result<(), Error> {
		if self.producer.is_empty(&data) {
			debug!("Empty data. Showing the default error message.");
			return self.render_error(host, None);
		}

		let nodes = self.produce(&data)?;
		self.replace(host, &nodes)?;
		self.data = Some(data);
		Ok(())
	}

	/// Brings the mount point in line with `data` by patching the mounted tree in place.
	///
	/// Produces the same tree as [`render`](`View::render`) would.
	/// Falls back to a full replace if the mount point doesn't currently hold rendered content,
	/// or if the mounted tree can't be patched.
	///
	/// # Errors
	///
	/// Iff the producer fails, its markup doesn't parse, or the host fails during a full replace.
	#[instrument(skip(self, host, data), fields(mount = ?self.mount))]
	pub fn render_update(&mut self, host: &mut H, data: M::Data) -> Result<Outcome, Error> {
		if self.producer.is_empty(&data) {
			debug!("Empty data. Showing the default error message.");
			self.render_error(host, None)?;
			return Ok(Outcome::Replaced);
		}

		let outcome = self.reconcile(host, &data)?;
		self.data = Some(data);
		Ok(outcome)
	}

	/// [`render_update`](`View::render_update`) with the last rendered data.
	///
	/// Returns [`None`] without touching the mount point if nothing was rendered yet.
	///
	/// # Errors
	///
	/// As [`render_update`](`View::render_update`). The stored data is kept either way.
	pub fn rerender(&mut self, host: &mut H) -> Result<Option<Outcome>, Error> {
		let data = match self.data.take() {
			Some(data) => data,
			None => return Ok(None),
		};
		let outcome = self.reconcile(host, &data);
		self.data = Some(data);
		outcome.map(Some)
	}

	fn reconcile(&mut self, host: &mut H, data: &M::Data) -> Result<Outcome, Error> {
		let candidate = self.produce(data)?;

		if self.state != MountState::Rendered {
			debug!(state = ?self.state, "Nothing rendered to patch. Replacing.");
			self.replace(host, &candidate)?;
			return Ok(Outcome::Replaced);
		}

		let current = load_child_nodes(host, &self.mount);
		let patches = self.differ.diff(&current, &candidate);
		trace!(
			visited = self.differ.visited(),
			patches = patches.len(),
			structural = patches.iter().filter(|p| p.is_structural()).count(),
			"Diffed mounted tree."
		);
		if patches.is_empty() {
			return Ok(Outcome::Patched(0));
		}

		match patch::apply(host, &self.mount, &patches) {
			Ok(()) => Ok(Outcome::Patched(patches.len())),
			Err(error) => {
				warn!("Could not patch the mounted tree ({}). Falling back to a full replace.", error);
				self.replace(host, &candidate)?;
				Ok(Outcome::Replaced)
			}
		}
	}

	fn produce(&self, data: &M::Data) -> Result<Vec<Node>, Error> {
		let markup = self.markup(data)?;
		Ok(markup::parse(&markup)?)
	}

	fn replace(&mut self, host: &mut H, nodes: &[Node]) -> Result<(), Error> {
		// Whatever was mounted is gone from here on, even if the host fails halfway.
		self.state = MountState::Empty;
		patch::replace_children(host, &self.mount, nodes)?;
		self.state = MountState::Rendered;
		Ok(())
	}

	/// Shows the loading indicator. Does nothing if it's already showing.
	///
	/// # Errors
	///
	/// Iff the host fails.
	#[instrument(skip(self, host), fields(mount = ?self.mount))]
	pub fn render_spinner(&mut self, host: &mut H) -> Result<(), Error> {
		if self.state == MountState::Spinner {
			trace!("Spinner already showing.");
			return Ok(());
		}
		let spinner = Element {
			name: "div".to_owned(),
			attributes: vec![Attribute::new("class", "spinner")],
			children: vec![self.icon("loader")],
		};
		self.show(host, spinner.into(), MountState::Spinner)
	}

	/// Shows `message`, or the configured error text.
	///
	/// # Errors
	///
	/// Iff the host fails.
	#[instrument(skip(self, host, message), fields(mount = ?self.mount))]
	pub fn render_error(&mut self, host: &mut H, message: Option<&str>) -> Result<(), Error> {
		let message = message.unwrap_or(&self.config.error_message).to_owned();
		let notice = self.notice("error", "alert-triangle", message);
		self.show(host, notice, MountState::Error)
	}

	/// Shows `message`, or the configured success text.
	///
	/// # Errors
	///
	/// Iff the host fails.
	#[instrument(skip(self, host, message), fields(mount = ?self.mount))]
	pub fn render_message(&mut self, host: &mut H, message: Option<&str>) -> Result<(), Error> {
		let message = message.unwrap_or(&self.config.message).to_owned();
		let notice = self.notice("message", "smile", message);
		self.show(host, notice, MountState::Message)
	}

	/// Empties the mount point.
	///
	/// # Errors
	///
	/// Iff the host fails.
	pub fn clear(&mut self, host: &mut H) -> Result<(), Error> {
		self.state = MountState::Empty;
		host.clear(&self.mount)?;
		Ok(())
	}

	fn show(&mut self, host: &mut H, node: Node, state: MountState) -> Result<(), Error> {
		self.state = MountState::Empty;
		patch::replace_children(host, &self.mount, core::slice::from_ref(&node))?;
		self.state = state;
		Ok(())
	}

	fn icon(&self, icon: &str) -> Node {
		Element {
			name: "svg".to_owned(),
			attributes: vec![],
			children: vec![Element {
				name: "use".to_owned(),
				attributes: vec![Attribute::new("href", config::icon_href(&self.config.icons, icon))],
				children: vec![],
			}
			.into()],
		}
		.into()
	}

	fn notice(&self, class: &str, icon: &str, message: String) -> Node {
		Element {
			name: "div".to_owned(),
			attributes: vec![Attribute::new("class", class)],
			children: vec![
				Element {
					name: "div".to_owned(),
					attributes: vec![],
					children: vec![self.icon(icon)],
				}
				.into(),
				Element {
					name: "p".to_owned(),
					attributes: vec![],
					children: vec![Node::Text(message)],
				}
				.into(),
			],
		}
		.into()
	}

	/// Hides the overlay window, if this view has one.
	///
	/// # Errors
	///
	/// Iff the host fails.
	pub fn hide_window(&mut self, host: &mut H) -> Result<(), Error> {
		match &self.overlay {
			Some(overlay) => overlay.hide(host),
			None => Ok(()),
		}
	}

	/// Shows the overlay window, if this view has one.
	///
	/// # Errors
	///
	/// Iff the host fails.
	pub fn show_window(&mut self, host: &mut H) -> Result<(), Error> {
		match &self.overlay {
			Some(overlay) => overlay.show(host),
			None => Ok(()),
		}
	}

	/// # Errors
	///
	/// Iff the host fails.
	pub fn toggle_window(&mut self, host: &mut H) -> Result<(), Error> {
		match &self.overlay {
			Some(overlay) => overlay.toggle(host),
			None => Ok(()),
		}
	}

	/// Whether the overlay window is currently shown. [`false`] without an overlay.
	#[must_use]
	pub fn is_window_open(&self, host: &H) -> bool {
		self.overlay.as_ref().map_or(false, |overlay| overlay.is_open(host))
	}
}
