//! The live UI tree a [`View`](`crate::view::View`) renders into.
//!
//! [`Document`](`crate::dom::Document`) implements this in memory.
//! With the `web` feature, [`WebHost`](`crate::web::WebHost`) implements it on top of a browser DOM.

use crate::vdom::Attribute;
use core::fmt::Debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
	#[error("expected an element")]
	NotAnElement,

	#[error("expected a text node")]
	NotText,

	#[error("node is not a child of the given parent")]
	NotAChild,

	#[error("node was removed from the document")]
	Stale,

	#[error("inserting the node would create a cycle")]
	Cycle,

	#[error("host rejected the operation: {0}")]
	Rejected(String),
}

/// What a host node looks like to the differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
	Element { name: String, attributes: Vec<Attribute> },
	Text(String),
}

/// Element namespace. SVG content has to be created in its own namespace to render in a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
	Html,
	Svg,
}

impl Namespace {
	#[must_use]
	pub const fn uri(self) -> &'static str {
		match self {
			Namespace::Html => "http://www.w3.org/1999/xhtml",
			Namespace::Svg => "http://www.w3.org/2000/svg",
		}
	}

	/// Namespace of an element named `name` whose parent's content is in `self`.
	/// Its own content goes into the same namespace.
	#[must_use]
	pub fn enter(self, name: &str) -> Self {
		if name.eq_ignore_ascii_case("svg") {
			Namespace::Svg
		} else {
			self
		}
	}
}

/// Structural access to a UI tree.
///
/// `Node` is a handle, so cloning it never clones the node it refers to.
/// Handle equality is node identity.
///
/// Removing a node through [`remove_child`](`Host::remove_child`), [`replace_child`](`Host::replace_child`)
/// or [`clear`](`Host::clear`) discards its whole subtree. Callers must not reinsert it.
pub trait Host {
	type Node: Clone + Debug + PartialEq;

	/// Element and text children in order. Other node kinds (comments etc.) are skipped consistently by every method here.
	fn children(&self, parent: &Self::Node) -> Vec<Self::Node>;

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

	/// [`None`] for nodes this crate doesn't model.
	fn shape(&self, node: &Self::Node) -> Option<Shape>;

	fn attribute(&self, element: &Self::Node, name: &str) -> Option<String>;

	/// Creates a detached element.
	///
	/// # Errors
	///
	/// Iff the host rejects `name`.
	fn create_element(&mut self, name: &str) -> Result<Self::Node, HostError>;

	/// Creates a detached element in `namespace`.
	///
	/// Hosts without namespaces create a plain element.
	///
	/// # Errors
	///
	/// Iff the host rejects `name`.
	fn create_element_ns(&mut self, namespace: Namespace, name: &str) -> Result<Self::Node, HostError> {
		let _ = namespace;
		self.create_element(name)
	}

	/// Namespace that new children of `element` belong in.
	fn namespace(&self, element: &Self::Node) -> Namespace {
		let mut current = Some(element.clone());
		while let Some(node) = current {
			if matches!(self.shape(&node), Some(Shape::Element { name, .. }) if name.eq_ignore_ascii_case("svg")) {
				return Namespace::Svg;
			}
			current = self.parent(&node);
		}
		Namespace::Html
	}

	/// Creates a detached text node.
	fn create_text(&mut self, text: &str) -> Self::Node;

	/// # Errors
	///
	/// Iff `parent` isn't a live element or `child` can't be inserted there.
	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

	/// Puts `new` in `old`'s place and discards `old`.
	///
	/// # Errors
	///
	/// Iff `old` isn't a child of `parent`.
	fn replace_child(&mut self, parent: &Self::Node, new: &Self::Node, old: &Self::Node) -> Result<(), HostError>;

	/// # Errors
	///
	/// Iff `child` isn't a child of `parent`.
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), HostError>;

	/// # Errors
	///
	/// Iff `element` isn't a live element.
	fn set_attribute(&mut self, element: &Self::Node, name: &str, value: &str) -> Result<(), HostError>;

	/// Removing an absent attribute is not an error.
	///
	/// # Errors
	///
	/// Iff `element` isn't a live element.
	fn remove_attribute(&mut self, element: &Self::Node, name: &str) -> Result<(), HostError>;

	/// # Errors
	///
	/// Iff `text` isn't a live text node.
	fn set_text(&mut self, text: &Self::Node, data: &str) -> Result<(), HostError>;

	/// Removes all children of `parent`.
	///
	/// # Errors
	///
	/// Iff any removal fails.
	fn clear(&mut self, parent: &Self::Node) -> Result<(), HostError> {
		for child in self.children(parent) {
			self.remove_child(parent, &child)?;
		}
		Ok(())
	}
}

#[must_use]
pub fn has_class<H: Host + ?Sized>(host: &H, element: &H::Node, class: &str) -> bool {
	host.attribute(element, "class").map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
}

/// Adds `class` if it's missing. Doesn't touch the attribute otherwise.
///
/// # Errors
///
/// Iff `element` isn't a live element.
pub fn add_class<H: Host + ?Sized>(host: &mut H, element: &H::Node, class: &str) -> Result<(), HostError> {
	let classes = host.attribute(element, "class").unwrap_or_default();
	if classes.split_whitespace().any(|c| c == class) {
		return Ok(());
	}
	let updated = if classes.trim().is_empty() { class.to_owned() } else { format!("{} {}", classes.trim_end(), class) };
	host.set_attribute(element, "class", &updated)
}

/// Removes every occurrence of `class`. Doesn't touch the attribute if there is none.
///
/// # Errors
///
/// Iff `element` isn't a live element.
pub fn remove_class<H: Host + ?Sized>(host: &mut H, element: &H::Node, class: &str) -> Result<(), HostError> {
	let classes = match host.attribute(element, "class") {
		Some(classes) => classes,
		None => return Ok(()),
	};
	if !classes.split_whitespace().any(|c| c == class) {
		return Ok(());
	}
	let updated = classes.split_whitespace().filter(|c| *c != class).collect::<Vec<_>>().join(" ");
	host.set_attribute(element, "class", &updated)
}

/// Like [***Element.closest***](https://developer.mozilla.org/en-US/docs/Web/API/Element/closest) with a class selector,
/// but stops before leaving `within`.
#[must_use]
pub fn closest<H: Host + ?Sized>(host: &H, from: &H::Node, class: &str, within: &H::Node) -> Option<H::Node> {
	let mut current = Some(from.clone());
	while let Some(node) = current {
		if &node == within {
			return None;
		}
		if has_class(host, &node, class) {
			return Some(node);
		}
		current = host.parent(&node);
	}
	None
}

/// Depth-first search below `from` for the first element carrying `class`.
#[must_use]
pub fn find_by_class<H: Host + ?Sized>(host: &H, from: &H::Node, class: &str) -> Option<H::Node> {
	for child in host.children(from) {
		if has_class(host, &child, class) {
			return Some(child);
		}
		if let Some(found) = find_by_class(host, &child, class) {
			return Some(found);
		}
	}
	None
}

/// Depth-first search below `from` for every element named `name`.
#[must_use]
pub fn find_all_by_name<H: Host + ?Sized>(host: &H, from: &H::Node, name: &str) -> Vec<H::Node> {
	let mut found = Vec::new();
	let mut pending = host.children(from);
	pending.reverse();
	while let Some(node) = pending.pop() {
		if let Some(Shape::Element { name: n, .. }) = host.shape(&node) {
			if n == name {
				found.push(node.clone());
			}
			let mut children = host.children(&node);
			children.reverse();
			pending.extend(children);
		}
	}
	found
}
