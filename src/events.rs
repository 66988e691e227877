//! Event subscription, outside of the render lifecycle.
//!
//! [`View`](`crate::view::View`)s never hold callbacks. Feature modules offer `add_handler_*` functions that subscribe here
//! and translate the raw [`Event`] into a typed payload before calling back.

use crate::host::Host;
use core::{fmt, hash::Hash};
use hashbrown::HashMap;
use tracing::{instrument, trace, trace_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// The page finished loading. Dispatched at the document root.
	Load,
	Click,
	Submit,
	/// The location hash changed. Dispatched at the document root.
	HashChange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event<N> {
	pub kind: EventKind,
	pub target: N,
}

impl<N> Event<N> {
	pub fn new(kind: EventKind, target: N) -> Self {
		Self { kind, target }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Callback<H> = Box<dyn FnMut(&mut H, &Event<<H as Host>::Node>)>;

/// Callbacks keyed by the node they listen on.
///
/// Dispatch bubbles: callbacks on the target run first, then those on each ancestor, each level in subscription order.
/// The propagation path is fixed before the first callback runs, so callbacks may freely mutate the host.
pub struct Handlers<H: Host>
where
	H::Node: Hash + Eq,
{
	listeners: HashMap<(H::Node, EventKind), Vec<(SubscriptionId, Callback<H>)>>,
	subscriptions: HashMap<SubscriptionId, (H::Node, EventKind)>,
	next_id: u64,
}

impl<H: Host> Default for Handlers<H>
where
	H::Node: Hash + Eq,
{
	fn default() -> Self {
		Self::new()
	}
}

impl<H: Host> fmt::Debug for Handlers<H>
where
	H::Node: Hash + Eq,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handlers").field("subscriptions", &self.subscriptions).field("next_id", &self.next_id).finish_non_exhaustive()
	}
}

impl<H: Host> Handlers<H>
where
	H::Node: Hash + Eq,
{
	#[must_use]
	pub fn new() -> Self {
		Self {
			listeners: HashMap::new(),
			subscriptions: HashMap::new(),
			next_id: 0,
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.subscriptions.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.subscriptions.is_empty()
	}

	#[instrument(skip(self, callback))]
	pub fn subscribe(&mut self, target: H::Node, kind: EventKind, callback: impl FnMut(&mut H, &Event<H::Node>) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.listeners.entry((target.clone(), kind)).or_default().push((id, Box::new(callback)));
		self.subscriptions.insert(id, (target, kind));
		id
	}

	/// Returns whether `id` was still subscribed.
	#[instrument(skip(self))]
	pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let key = match self.subscriptions.remove(&id) {
			Some(key) => key,
			None => return false,
		};
		if let Some(callbacks) = self.listeners.get_mut(&key) {
			callbacks.retain(|(i, _)| *i != id);
			if callbacks.is_empty() {
				self.listeners.remove(&key);
			}
		}
		true
	}

	/// Runs the callbacks for `event` and returns how many ran.
	#[instrument(skip(self, host))]
	pub fn dispatch(&mut self, host: &mut H, event: &Event<H::Node>) -> usize {
		let mut path = vec![event.target.clone()];
		while let Some(parent) = path.last().and_then(|node| host.parent(node)) {
			path.push(parent);
		}

		let mut count = 0;
		for node in path {
			let span = trace_span!("Dispatching", node = ?node);
			let _enter = span.enter();
			if let Some(callbacks) = self.listeners.get_mut(&(node, event.kind)) {
				for (_, callback) in callbacks {
					callback(&mut *host, event);
					count += 1;
				}
			}
		}
		trace!("Ran {} callback(s).", count);
		count
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::Document;
	use std::{cell::RefCell, rc::Rc};

	#[test]
	fn bubbles_from_target_to_root() {
		let mut document = Document::from_markup("<div><button><span>x</span></button></div>").unwrap();
		let root = document.root();
		let div = document.child_ids(root)[0];
		let button = document.child_ids(div)[0];
		let span = document.child_ids(button)[0];

		let order = Rc::new(RefCell::new(Vec::new()));
		let mut handlers = Handlers::<Document>::new();
		for (node, name) in [(root, "root"), (div, "div"), (button, "button")] {
			let order = Rc::clone(&order);
			handlers.subscribe(node, EventKind::Click, move |_, _| order.borrow_mut().push(name));
		}
		handlers.subscribe(button, EventKind::Submit, |_, _| panic!("wrong kind"));

		assert_eq!(handlers.dispatch(&mut document, &Event::new(EventKind::Click, span)), 3);
		assert_eq!(*order.borrow(), vec!["button", "div", "root"]);
	}

	#[test]
	fn unsubscribed_callbacks_stop_running() {
		let mut document = Document::new();
		let root = document.root();
		let mut handlers = Handlers::<Document>::new();
		let id = handlers.subscribe(root, EventKind::Load, |_, _| ());
		assert_eq!(handlers.len(), 1);
		assert!(handlers.unsubscribe(id));
		assert!(!handlers.unsubscribe(id));
		assert!(handlers.is_empty());
		assert_eq!(handlers.dispatch(&mut document, &Event::new(EventKind::Load, root)), 0);
	}

	#[test]
	fn callbacks_may_remove_their_own_target() {
		let mut document = Document::from_markup("<div><button>x</button></div>").unwrap();
		let root = document.root();
		let div = document.child_ids(root)[0];
		let button = document.child_ids(div)[0];

		let mut handlers = Handlers::<Document>::new();
		handlers.subscribe(button, EventKind::Click, move |host: &mut Document, event| {
			crate::host::Host::remove_child(host, &div, &event.target).unwrap();
		});
		let reached_root = Rc::new(RefCell::new(false));
		let flag = Rc::clone(&reached_root);
		handlers.subscribe(root, EventKind::Click, move |_, _| *flag.borrow_mut() = true);

		assert_eq!(handlers.dispatch(&mut document, &Event::new(EventKind::Click, button)), 2);
		assert!(*reached_root.borrow());
		assert!(!document.contains(button));
	}
}
