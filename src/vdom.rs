//! Owned, detached node trees.
//!
//! These are what markup parses into and what [`load`](`crate::load`) reads back out of a mounted host subtree.
//! Neither side of a diff refers to live host nodes, so both can be discarded as soon as the patches are computed.

use core::fmt::{self, Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Element(Element),
	Text(String),
}

/// An element with its attributes in source order.
///
/// Attribute names are unique within one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	pub name: String,
	pub attributes: Vec<Attribute>,
	pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}

impl Attribute {
	#[must_use]
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self { name: name.into(), value: value.into() }
	}
}

impl Element {
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			attributes: Vec::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
	}
}

impl Node {
	#[must_use]
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text(text.into())
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Node::Element(element) => Some(element),
			Node::Text(_) => None,
		}
	}

	/// A short description without page content, for logs.
	#[must_use]
	pub fn kind(&self) -> &str {
		match self {
			Node::Element(element) => &element.name,
			Node::Text(_) => "#text",
		}
	}

	/// Number of nodes in this subtree, including `self`.
	#[must_use]
	pub fn subtree_len(&self) -> usize {
		match self {
			Node::Element(element) => 1 + element.children.iter().map(Node::subtree_len).sum::<usize>(),
			Node::Text(_) => 1,
		}
	}

	/// Concatenated text of this subtree.
	#[must_use]
	pub fn text_content(&self) -> String {
		let mut text = String::new();
		self.collect_text(&mut text);
		text
	}

	fn collect_text(&self, into: &mut String) {
		match self {
			Node::Element(element) => element.children.iter().for_each(|c| c.collect_text(into)),
			Node::Text(text) => into.push_str(text),
		}
	}
}

impl From<Element> for Node {
	fn from(element: Element) -> Self {
		Node::Element(element)
	}
}

/// Serializes as markup that parses back into an equal tree.
impl Display for Node {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Node::Text(text) => f.write_str(&crate::markup::escape(text)),
			Node::Element(Element { name, attributes, children }) => {
				write!(f, "<{}", name)?;
				for Attribute { name, value } in attributes {
					write!(f, " {}=\"{}\"", name, crate::markup::escape(value))?;
				}
				if crate::markup::is_void(name) && children.is_empty() {
					return f.write_str(">");
				}
				f.write_str(">")?;
				for child in children {
					child.fmt(f)?;
				}
				write!(f, "</{}>", name)
			}
		}
	}
}

/// Sums [`Node::subtree_len`] over a fragment.
#[must_use]
pub fn fragment_len(nodes: &[Node]) -> usize {
	nodes.iter().map(Node::subtree_len).sum()
}
