//! Applying [`Patch`]es to a [`Host`].

use crate::{
	diff::{Patch, Path},
	host::{Host, HostError, Namespace, Shape},
	vdom::{Attribute, Element, Node},
};
use tracing::{instrument, trace, trace_span};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
	#[error("no node at {0}")]
	Missing(Path),

	#[error("expected an element at {0}")]
	NotAnElement(Path),

	#[error("expected a text node at {0}")]
	NotText(Path),

	#[error("insertion at {0} would not append")]
	Misplaced(Path),

	#[error("host failed at {path}: {source}")]
	Host {
		path: Path,
		#[source]
		source: HostError,
	},
}

/// Creates a detached host subtree matching `node`, as content of an HTML element.
///
/// # Errors
///
/// Iff the host rejects an element name or an insertion.
pub fn instantiate<H: Host + ?Sized>(host: &mut H, node: &Node) -> Result<H::Node, HostError> {
	instantiate_in(host, node, Namespace::Html)
}

/// Creates a detached host subtree matching `node`, as content of an element in `namespace`.
///
/// `<svg>` switches its subtree to [`Namespace::Svg`].
///
/// # Errors
///
/// Iff the host rejects an element name or an insertion.
pub fn instantiate_in<H: Host + ?Sized>(host: &mut H, node: &Node, namespace: Namespace) -> Result<H::Node, HostError> {
	match node {
		Node::Text(text) => Ok(host.create_text(text)),
		Node::Element(Element { name, attributes, children }) => {
			let namespace = namespace.enter(name);
			let element = host.create_element_ns(namespace, name)?;
			for Attribute { name, value } in attributes {
				host.set_attribute(&element, name, value)?;
			}
			for child in children {
				let child = instantiate_in(host, child, namespace)?;
				host.append_child(&element, &child)?;
			}
			Ok(element)
		}
	}
}

/// Full replace: discards everything below `mount` and inserts `nodes` instead.
///
/// # Errors
///
/// Iff the host fails. The mount point may then be left partially filled.
#[instrument(skip(host, nodes), fields(nodes.len = nodes.len()))]
pub fn replace_children<H: Host + ?Sized>(host: &mut H, mount: &H::Node, nodes: &[Node]) -> Result<(), HostError> {
	host.clear(mount)?;
	let namespace = host.namespace(mount);
	for node in nodes {
		let child = instantiate_in(host, node, namespace)?;
		host.append_child(mount, &child)?;
	}
	Ok(())
}

/// Applies `patches` in order below `mount`.
///
/// # Errors
///
/// Iff a path doesn't resolve against the live tree or the host fails.
/// Patches before the failing one stay applied.
#[instrument(skip(host, patches), fields(patches.len = patches.len()))]
pub fn apply<H: Host + ?Sized>(host: &mut H, mount: &H::Node, patches: &[Patch]) -> Result<(), ApplyError> {
	for patch in patches {
		apply_one(host, mount, patch)?;
	}
	trace!("Applied {} patch(es).", patches.len());
	Ok(())
}

fn apply_one<H: Host + ?Sized>(host: &mut H, mount: &H::Node, patch: &Patch) -> Result<(), ApplyError> {
	let host_error = |path: &Path| {
		let path = path.clone();
		move |source| ApplyError::Host { path, source }
	};

	match patch {
		Patch::Replace { path, node } => {
			let span = trace_span!("Replacing node", to = node.kind());
			let _enter = span.enter();
			let (parent, old) = resolve_with_parent(host, mount, path)?;
			let namespace = host.namespace(&parent);
			let new = instantiate_in(host, node, namespace).map_err(host_error(path))?;
			host.replace_child(&parent, &new, &old).map_err(host_error(path))
		}

		Patch::UpdateAttributes { path, added, changed, removed } => {
			let span = trace_span!("Updating attributes", added = added.len(), changed = changed.len(), removed = removed.len());
			let _enter = span.enter();
			let (_, element) = resolve_with_parent(host, mount, path)?;
			if !matches!(host.shape(&element), Some(Shape::Element { .. })) {
				return Err(ApplyError::NotAnElement(path.clone()));
			}
			for name in removed {
				host.remove_attribute(&element, name).map_err(host_error(path))?;
			}
			for Attribute { name, value } in added.iter().chain(changed) {
				host.set_attribute(&element, name, value).map_err(host_error(path))?;
			}
			Ok(())
		}

		Patch::ReplaceText { path, text } => {
			let span = trace_span!("Replacing text");
			let _enter = span.enter();
			let (_, node) = resolve_with_parent(host, mount, path)?;
			if !matches!(host.shape(&node), Some(Shape::Text(_))) {
				return Err(ApplyError::NotText(path.clone()));
			}
			host.set_text(&node, text).map_err(host_error(path))
		}

		Patch::Insert { path, node } => {
			let span = trace_span!("Inserting node", kind = node.kind());
			let _enter = span.enter();
			let (parent_path, index) = path.split_last().ok_or_else(|| ApplyError::Misplaced(path.clone()))?;
			let parent = resolve(host, mount, parent_path).ok_or_else(|| ApplyError::Missing(path.clone()))?;
			if host.children(&parent).len() != index {
				return Err(ApplyError::Misplaced(path.clone()));
			}
			let namespace = host.namespace(&parent);
			let child = instantiate_in(host, node, namespace).map_err(host_error(path))?;
			host.append_child(&parent, &child).map_err(host_error(path))
		}

		Patch::Remove { path } => {
			let span = trace_span!("Removing node");
			let _enter = span.enter();
			let (parent, child) = resolve_with_parent(host, mount, path)?;
			host.remove_child(&parent, &child).map_err(host_error(path))
		}
	}
}

fn resolve<H: Host + ?Sized>(host: &H, mount: &H::Node, indices: &[usize]) -> Option<H::Node> {
	let mut current = mount.clone();
	for &index in indices {
		current = host.children(&current).into_iter().nth(index)?;
	}
	Some(current)
}

fn resolve_with_parent<H: Host + ?Sized>(host: &H, mount: &H::Node, path: &Path) -> Result<(H::Node, H::Node), ApplyError> {
	let (parent_path, index) = path.split_last().ok_or_else(|| ApplyError::Missing(path.clone()))?;
	let parent = resolve(host, mount, parent_path).ok_or_else(|| ApplyError::Missing(path.clone()))?;
	let node = host.children(&parent).into_iter().nth(index).ok_or_else(|| ApplyError::Missing(path.clone()))?;
	Ok((parent, node))
}
