use crate::{
	host::{Host, Shape},
	vdom::{Element, Node},
};
use tracing::{trace, warn};

/// Reads the children of `parent` into detached trees.
///
/// Nodes the host can't describe are skipped, which matches what [`Host::children`] reports.
pub fn load_child_nodes<H: Host + ?Sized>(host: &H, parent: &H::Node) -> Vec<Node> {
	let children = host.children(parent);
	trace!("Loading {} child node(s).", children.len());
	children.iter().filter_map(|child| load_node(host, child)).collect()
}

pub fn load_node<H: Host + ?Sized>(host: &H, node: &H::Node) -> Option<Node> {
	match host.shape(node) {
		Some(Shape::Element { name, attributes }) => Some(Node::Element(Element {
			name,
			attributes,
			children: load_child_nodes(host, node),
		})),
		Some(Shape::Text(text)) => Some(Node::Text(text)),
		None => {
			warn!("Skipping a node the host could not describe: {:?}", node);
			None
		}
	}
}
