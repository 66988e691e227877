//! [`Host`] on top of a browser DOM.

use crate::{
	host::{Host, HostError, Namespace, Shape},
	vdom::Attribute,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Attr, CharacterData, Element, NamedNodeMap, Node, Text};

#[derive(Debug, Clone)]
pub struct WebHost {
	document: web_sys::Document,
}

impl WebHost {
	#[must_use]
	pub fn new(document: web_sys::Document) -> Self {
		Self { document }
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}
}

fn rejected(error: &JsValue) -> HostError {
	HostError::Rejected(error.as_string().unwrap_or_else(|| format!("{:?}", error)))
}

fn element(node: &Node) -> Result<&Element, HostError> {
	node.dyn_ref::<Element>().ok_or(HostError::NotAnElement)
}

fn is_modelled(node: &Node) -> bool {
	node.dyn_ref::<Element>().is_some() || node.dyn_ref::<Text>().is_some()
}

fn load_attributes(attributes: &NamedNodeMap) -> Vec<Attribute> {
	(0..attributes.length())
		.filter_map(|i| attributes.item(i))
		.map(|attr: Attr| Attribute::new(attr.name(), attr.value()))
		.collect()
}

impl Host for WebHost {
	type Node = Node;

	fn children(&self, parent: &Node) -> Vec<Node> {
		let child_nodes = parent.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.item(i)).filter(is_modelled).collect()
	}

	fn parent(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn shape(&self, node: &Node) -> Option<Shape> {
		if let Some(element) = node.dyn_ref::<Element>() {
			Some(Shape::Element {
				name: element.local_name(),
				attributes: load_attributes(&element.attributes()),
			})
		} else {
			node.dyn_ref::<Text>().map(|text| Shape::Text(text.data()))
		}
	}

	fn attribute(&self, element: &Node, name: &str) -> Option<String> {
		element.dyn_ref::<Element>()?.get_attribute(name)
	}

	fn create_element(&mut self, name: &str) -> Result<Node, HostError> {
		self.document.create_element(name).map(Into::into).map_err(|e| rejected(&e))
	}

	fn create_element_ns(&mut self, namespace: Namespace, name: &str) -> Result<Node, HostError> {
		match namespace {
			Namespace::Html => self.create_element(name),
			Namespace::Svg => self.document.create_element_ns(Some(namespace.uri()), name).map(Into::into).map_err(|e| rejected(&e)),
		}
	}

	fn namespace(&self, element: &Node) -> Namespace {
		match element.dyn_ref::<Element>().and_then(Element::namespace_uri) {
			Some(uri) if uri == Namespace::Svg.uri() => Namespace::Svg,
			_ => Namespace::Html,
		}
	}

	fn create_text(&mut self, text: &str) -> Node {
		self.document.create_text_node(text).into()
	}

	fn append_child(&mut self, parent: &Node, child: &Node) -> Result<(), HostError> {
		element(parent)?;
		parent.append_child(child).map(drop).map_err(|e| rejected(&e))
	}

	fn replace_child(&mut self, parent: &Node, new: &Node, old: &Node) -> Result<(), HostError> {
		if old.parent_node().as_ref() != Some(parent) {
			return Err(HostError::NotAChild);
		}
		parent.replace_child(new, old).map(drop).map_err(|e| rejected(&e))
	}

	fn remove_child(&mut self, parent: &Node, child: &Node) -> Result<(), HostError> {
		if child.parent_node().as_ref() != Some(parent) {
			return Err(HostError::NotAChild);
		}
		parent.remove_child(child).map(drop).map_err(|e| rejected(&e))
	}

	fn set_attribute(&mut self, element_node: &Node, name: &str, value: &str) -> Result<(), HostError> {
		element(element_node)?.set_attribute(name, value).map_err(|e| rejected(&e))
	}

	fn remove_attribute(&mut self, element_node: &Node, name: &str) -> Result<(), HostError> {
		element(element_node)?.remove_attribute(name).map_err(|e| rejected(&e))
	}

	/// Also removes comments and other nodes [`children`](`Host::children`) skips.
	fn clear(&mut self, parent: &Node) -> Result<(), HostError> {
		element(parent)?;
		parent.set_text_content(None);
		Ok(())
	}

	fn set_text(&mut self, text: &Node, data: &str) -> Result<(), HostError> {
		if text.dyn_ref::<Text>().is_none() {
			return Err(HostError::NotText);
		}
		text.unchecked_ref::<CharacterData>().set_data(data);
		Ok(())
	}
}
