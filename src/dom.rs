//! An in-memory UI tree.
//!
//! Nodes live in a generational arena. A [`NodeId`] stays valid for as long as its node is part of the document or detached
//! but not yet discarded, which is what makes node identity observable: a patched element keeps its id, a recreated one doesn't.

use crate::{
	host::{Host, HostError, Shape},
	vdom::{self, Attribute},
};
use core::fmt::{self, Display, Formatter};
use tracing::{instrument, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
	index: u32,
	generation: u32,
}

impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "#{}v{}", self.index, self.generation)
	}
}

#[derive(Debug)]
enum Data {
	Element { name: String, attributes: Vec<Attribute>, children: Vec<NodeId> },
	Text(String),
}

#[derive(Debug)]
struct Slot {
	generation: u32,
	parent: Option<NodeId>,
	data: Option<Data>,
}

#[derive(Debug)]
pub struct Document {
	slots: Vec<Slot>,
	free: Vec<u32>,
	root: NodeId,
	created: usize,
	discarded: usize,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates a document with an empty `<body>` root.
	#[must_use]
	pub fn new() -> Self {
		let mut document = Self {
			slots: Vec::new(),
			free: Vec::new(),
			root: NodeId { index: 0, generation: 0 },
			created: 0,
			discarded: 0,
		};
		document.root = document.element("body");
		document
	}

	/// Builds a document whose root `<body>` contains `markup`.
	///
	/// # Errors
	///
	/// Iff `markup` doesn't parse.
	pub fn from_markup(markup: &str) -> Result<Self, crate::markup::ParseError> {
		let mut document = Self::new();
		for node in crate::markup::parse(markup)? {
			let child = document.instantiate(&node);
			document.attach(document.root, child);
		}
		Ok(document)
	}

	#[must_use]
	pub fn root(&self) -> NodeId {
		self.root
	}

	/// Total number of nodes ever created in this document.
	#[must_use]
	pub fn created(&self) -> usize {
		self.created
	}

	/// Total number of nodes discarded so far.
	#[must_use]
	pub fn discarded(&self) -> usize {
		self.discarded
	}

	#[must_use]
	pub fn contains(&self, id: NodeId) -> bool {
		self.data(id).is_some()
	}

	/// Whether `id` is live and reachable from the root.
	#[must_use]
	pub fn is_connected(&self, id: NodeId) -> bool {
		let mut current = id;
		loop {
			if !self.contains(current) {
				return false;
			}
			if current == self.root {
				return true;
			}
			match self.slot(current).and_then(|slot| slot.parent) {
				Some(parent) => current = parent,
				None => return false,
			}
		}
	}

	#[must_use]
	pub fn name(&self, id: NodeId) -> Option<&str> {
		match self.data(id)? {
			Data::Element { name, .. } => Some(name),
			Data::Text(_) => None,
		}
	}

	#[must_use]
	pub fn text(&self, id: NodeId) -> Option<&str> {
		match self.data(id)? {
			Data::Text(text) => Some(text),
			Data::Element { .. } => None,
		}
	}

	#[must_use]
	pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
		match self.data(id)? {
			Data::Element { attributes, .. } => attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str()),
			Data::Text(_) => None,
		}
	}

	#[must_use]
	pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
		match self.data(id) {
			Some(Data::Element { children, .. }) => children,
			_ => &[],
		}
	}

	/// Concatenated text below `id`.
	#[must_use]
	pub fn text_content(&self, id: NodeId) -> String {
		match self.data(id) {
			Some(Data::Text(text)) => text.clone(),
			Some(Data::Element { children, .. }) => children.iter().map(|&child| self.text_content(child)).collect(),
			None => String::new(),
		}
	}

	/// Serializes the children of `id` as markup.
	#[must_use]
	pub fn inner_markup(&self, id: NodeId) -> String {
		self.child_ids(id).iter().filter_map(|&child| self.snapshot(child)).map(|node| node.to_string()).collect()
	}

	/// Reads the subtree at `id` into a detached tree.
	#[must_use]
	pub fn snapshot(&self, id: NodeId) -> Option<vdom::Node> {
		Some(match self.data(id)? {
			Data::Text(text) => vdom::Node::Text(text.clone()),
			Data::Element { name, attributes, children } => vdom::Node::Element(vdom::Element {
				name: name.clone(),
				attributes: attributes.clone(),
				children: children.iter().filter_map(|&child| self.snapshot(child)).collect(),
			}),
		})
	}

	/// Creates a detached copy of `node`.
	pub fn instantiate(&mut self, node: &vdom::Node) -> NodeId {
		match node {
			vdom::Node::Text(text) => self.alloc(Data::Text(text.clone())),
			vdom::Node::Element(vdom::Element { name, attributes, children }) => {
				let element = self.alloc(Data::Element {
					name: name.clone(),
					attributes: attributes.clone(),
					children: Vec::with_capacity(children.len()),
				});
				for child in children {
					let child = self.instantiate(child);
					self.attach(element, child);
				}
				element
			}
		}
	}

	fn element(&mut self, name: &str) -> NodeId {
		self.alloc(Data::Element {
			name: name.to_owned(),
			attributes: Vec::new(),
			children: Vec::new(),
		})
	}

	fn alloc(&mut self, data: Data) -> NodeId {
		self.created += 1;
		if let Some(index) = self.free.pop() {
			let slot = &mut self.slots[index as usize];
			slot.generation += 1;
			slot.parent = None;
			slot.data = Some(data);
			return NodeId { index, generation: slot.generation };
		}
		let index = u32::try_from(self.slots.len()).unwrap_or_else(|_| panic!("recipe-dom: more than {} nodes in one document", u32::MAX));
		self.slots.push(Slot { generation: 0, parent: None, data: Some(data) });
		NodeId { index, generation: 0 }
	}

	fn slot(&self, id: NodeId) -> Option<&Slot> {
		self.slots.get(id.index as usize).filter(|slot| slot.generation == id.generation && slot.data.is_some())
	}

	fn slot_mut(&mut self, id: NodeId) -> Option<&mut Slot> {
		self.slots.get_mut(id.index as usize).filter(|slot| slot.generation == id.generation && slot.data.is_some())
	}

	fn data(&self, id: NodeId) -> Option<&Data> {
		self.slot(id)?.data.as_ref()
	}

	/// Appends without checks. Only for freshly created children.
	fn attach(&mut self, parent: NodeId, child: NodeId) {
		if let Some(Slot { data: Some(Data::Element { children, .. }), .. }) = self.slot_mut(parent) {
			children.push(child);
		}
		if let Some(slot) = self.slot_mut(child) {
			slot.parent = Some(parent);
		}
	}

	fn children_mut(&mut self, id: NodeId) -> Result<&mut Vec<NodeId>, HostError> {
		match self.slot_mut(id).ok_or(HostError::Stale)?.data.as_mut() {
			Some(Data::Element { children, .. }) => Ok(children),
			_ => Err(HostError::NotAnElement),
		}
	}

	fn attributes_mut(&mut self, id: NodeId) -> Result<&mut Vec<Attribute>, HostError> {
		match self.slot_mut(id).ok_or(HostError::Stale)?.data.as_mut() {
			Some(Data::Element { attributes, .. }) => Ok(attributes),
			_ => Err(HostError::NotAnElement),
		}
	}

	fn position(&self, parent: NodeId, child: NodeId) -> Result<usize, HostError> {
		if !self.contains(child) {
			return Err(HostError::Stale);
		}
		self.child_ids(parent).iter().position(|&c| c == child).ok_or(HostError::NotAChild)
	}

	/// Frees `id` and everything below it.
	fn discard(&mut self, id: NodeId) {
		let mut pending = vec![id];
		while let Some(id) = pending.pop() {
			let index = id.index;
			if let Some(slot) = self.slot_mut(id) {
				if let Some(Data::Element { children, .. }) = slot.data.take() {
					pending.extend(children);
				}
				slot.parent = None;
				self.free.push(index);
				self.discarded += 1;
			}
		}
	}

	fn detach(&mut self, id: NodeId) {
		let parent = self.slot(id).and_then(|slot| slot.parent);
		if let Some(parent) = parent {
			if let Ok(children) = self.children_mut(parent) {
				children.retain(|&c| c != id);
			}
		}
		if let Some(slot) = self.slot_mut(id) {
			slot.parent = None;
		}
	}

	fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.slot(node).and_then(|slot| slot.parent) {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}
}

impl Host for Document {
	type Node = NodeId;

	fn children(&self, parent: &NodeId) -> Vec<NodeId> {
		self.child_ids(*parent).to_vec()
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.slot(*node)?.parent
	}

	fn shape(&self, node: &NodeId) -> Option<Shape> {
		Some(match self.data(*node)? {
			Data::Element { name, attributes, .. } => Shape::Element {
				name: name.clone(),
				attributes: attributes.clone(),
			},
			Data::Text(text) => Shape::Text(text.clone()),
		})
	}

	fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
		self.get_attribute(*element, name).map(ToOwned::to_owned)
	}

	fn create_element(&mut self, name: &str) -> Result<NodeId, HostError> {
		if name.is_empty() {
			return Err(HostError::Rejected("empty element name".to_owned()));
		}
		Ok(self.element(name))
	}

	fn create_text(&mut self, text: &str) -> NodeId {
		self.alloc(Data::Text(text.to_owned()))
	}

	#[instrument(skip(self))]
	fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
		if !self.contains(*child) {
			return Err(HostError::Stale);
		}
		if self.is_ancestor_or_self(*child, *parent) {
			return Err(HostError::Cycle);
		}
		self.children_mut(*parent)?;
		self.detach(*child);
		self.attach(*parent, *child);
		Ok(())
	}

	#[instrument(skip(self))]
	fn replace_child(&mut self, parent: &NodeId, new: &NodeId, old: &NodeId) -> Result<(), HostError> {
		if new == old {
			return Ok(());
		}
		if !self.contains(*new) {
			return Err(HostError::Stale);
		}
		if self.is_ancestor_or_self(*new, *parent) {
			return Err(HostError::Cycle);
		}
		self.position(*parent, *old)?;
		self.detach(*new);
		let index = self.position(*parent, *old)?;
		self.children_mut(*parent)?[index] = *new;
		if let Some(slot) = self.slot_mut(*new) {
			slot.parent = Some(*parent);
		}
		self.discard(*old);
		Ok(())
	}

	#[instrument(skip(self))]
	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), HostError> {
		let index = self.position(*parent, *child)?;
		self.children_mut(*parent)?.remove(index);
		self.discard(*child);
		Ok(())
	}

	fn set_attribute(&mut self, element: &NodeId, name: &str, value: &str) -> Result<(), HostError> {
		let attributes = self.attributes_mut(*element)?;
		match attributes.iter_mut().find(|a| a.name == name) {
			Some(existing) => existing.value = value.to_owned(),
			None => attributes.push(Attribute::new(name, value)),
		}
		Ok(())
	}

	fn remove_attribute(&mut self, element: &NodeId, name: &str) -> Result<(), HostError> {
		self.attributes_mut(*element)?.retain(|a| a.name != name);
		Ok(())
	}

	fn set_text(&mut self, text: &NodeId, data: &str) -> Result<(), HostError> {
		match self.slot_mut(*text).ok_or(HostError::Stale)?.data.as_mut() {
			Some(Data::Text(existing)) => {
				data.clone_into(existing);
				Ok(())
			}
			_ => Err(HostError::NotText),
		}
	}

	fn clear(&mut self, parent: &NodeId) -> Result<(), HostError> {
		let children = core::mem::take(self.children_mut(*parent)?);
		trace!("Discarding {} child subtree(s).", children.len());
		for child in children {
			self.discard(child);
		}
		Ok(())
	}
}
