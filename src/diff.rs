//! Paired, depth-first tree diffing.
//!
//! Nodes are matched purely by structural position (same parent, same child index).
//! Nothing here looks for moved or reordered nodes, so the cost is one comparison per visited pair and never depends on
//! how similar the two trees are.
//!
//! # Patch order
//!
//! Patches are emitted so that applying them in order to the tree `current` was loaded from keeps every later [`Path`] valid:
//!
//! - [`Patch::Replace`], [`Patch::UpdateAttributes`] and [`Patch::ReplaceText`] never shift sibling indices.
//! - Within one parent, all paired positions come first, then [`Patch::Insert`]s in ascending order (each one appends),
//!   or [`Patch::Remove`]s in descending order.

use crate::{
	loggable,
	vdom::{Attribute, Element, Node},
};
use core::fmt::{self, Display, Formatter};
use hashbrown::{HashMap, HashSet};
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, Level};

/// Child indices from the mount point down to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<usize>);

impl Path {
	#[must_use]
	pub fn new(indices: Vec<usize>) -> Self {
		Self(indices)
	}

	#[must_use]
	pub fn indices(&self) -> &[usize] {
		&self.0
	}

	/// The parent's path and this node's index in it, unless this is the empty path.
	#[must_use]
	pub fn split_last(&self) -> Option<(&[usize], usize)> {
		let (&last, parent) = self.0.split_last()?;
		Some((parent, last))
	}
}

impl Display for Path {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		if self.0.is_empty() {
			return f.write_str("/");
		}
		for index in &self.0 {
			write!(f, "/{}", index)?;
		}
		Ok(())
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
	/// Discard the node at `path` and put `node` in its place.
	Replace { path: Path, node: Node },

	/// Adjust the attributes of the element at `path`. Each list is in the order the attributes appear on their element.
	UpdateAttributes {
		path: Path,
		added: Vec<Attribute>,
		changed: Vec<Attribute>,
		removed: Vec<String>,
	},

	/// Overwrite the data of the text node at `path`.
	ReplaceText { path: Path, text: String },

	/// Append `node` to the parent, where it ends up at `path`.
	Insert { path: Path, node: Node },

	/// Discard the node at `path`.
	Remove { path: Path },
}

impl Patch {
	#[must_use]
	pub fn path(&self) -> &Path {
		match self {
			Patch::Replace { path, .. } | Patch::UpdateAttributes { path, .. } | Patch::ReplaceText { path, .. } | Patch::Insert { path, .. } | Patch::Remove { path } => path,
		}
	}

	/// Whether this patch creates or discards nodes.
	#[must_use]
	pub fn is_structural(&self) -> bool {
		matches!(self, Patch::Replace { .. } | Patch::Insert { .. } | Patch::Remove { .. })
	}
}

/// Computes [`Patch`]es between two fragments.
///
/// The differ can be reused. [`visited`](`TreeDiffer::visited`) reports the work done by the most recent [`diff`](`TreeDiffer::diff`).
#[derive(Debug)]
pub struct TreeDiffer {
	depth_limit: usize,
	visited: usize,
	path: Vec<usize>,
	patches: Vec<Patch>,
}

impl Default for TreeDiffer {
	fn default() -> Self {
		Self::new(Self::DEFAULT_DEPTH_LIMIT)
	}
}

impl TreeDiffer {
	pub const DEFAULT_DEPTH_LIMIT: usize = 256;

	/// Below `depth_limit` levels, differing subtrees are replaced wholesale instead of being diffed further.
	#[must_use]
	pub fn new(depth_limit: usize) -> Self {
		Self {
			depth_limit,
			visited: 0,
			path: Vec::new(),
			patches: Vec::new(),
		}
	}

	/// Number of node pairs compared by the last [`diff`](`TreeDiffer::diff`).
	#[must_use]
	pub fn visited(&self) -> usize {
		self.visited
	}

	#[instrument(skip(self, current, candidate), fields(current.len = current.len(), candidate.len = candidate.len()))]
	pub fn diff(&mut self, current: &[Node], candidate: &[Node]) -> Vec<Patch> {
		self.visited = 0;
		self.path.clear();
		self.diff_node_list(current, candidate, self.depth_limit);
		debug_assert!(self.path.is_empty());
		trace!("Visited {} pair(s), emitting {} patch(es).", self.visited, self.patches.len());
		core::mem::take(&mut self.patches)
	}

	fn diff_node_list(&mut self, current: &[Node], candidate: &[Node], depth_limit: usize) {
		for (i, (a, b)) in current.iter().zip(candidate).enumerate() {
			self.path.push(i);
			self.diff_node(a, b, depth_limit);
			self.path.pop();
		}

		if candidate.len() > current.len() {
			let span = trace_span!("Inserting", count = candidate.len() - current.len());
			let _enter = span.enter();
			for (i, node) in candidate.iter().enumerate().skip(current.len()) {
				self.emit(Patch::Insert { path: self.child_path(i), node: node.clone() });
			}
		} else if current.len() > candidate.len() {
			let span = trace_span!("Removing", count = current.len() - candidate.len());
			let _enter = span.enter();
			for i in (candidate.len()..current.len()).rev() {
				self.emit(Patch::Remove { path: self.child_path(i) });
			}
		}
	}

	fn diff_node(&mut self, a: &Node, b: &Node, depth_limit: usize) {
		self.visited += 1;
		match (a, b) {
			(Node::Text(t_1), Node::Text(t_2)) => {
				let span = trace_span!("Diffing text node", t_1 = loggable(t_1), t_2 = loggable(t_2));
				let _enter = span.enter();
				if t_1 != t_2 {
					self.emit(Patch::ReplaceText {
						path: self.current_path(),
						text: t_2.clone(),
					});
				}
			}

			(Node::Element(e_1), Node::Element(e_2)) if e_1.name == e_2.name => {
				let span = trace_span!("Diffing element", tag = %e_1.name);
				let _enter = span.enter();

				if depth_limit == 0 {
					if e_1 != e_2 {
						if cfg!(feature = "log-paths") {
							error!("Depth limit reached at {}. Replacing the element.", Path::new(self.path.clone()));
						} else {
							error!("Depth limit reached. Replacing the element.");
						}
						self.emit(Patch::Replace {
							path: self.current_path(),
							node: b.clone(),
						});
					}
					return;
				}

				self.diff_attributes(e_1, e_2);
				self.diff_node_list(&e_1.children, &e_2.children, depth_limit - 1);
			}

			// Mismatching nodes: Destroy and rebuild.
			(a, b) => {
				let span = trace_span!("Replace mismatching", a = a.kind(), b = b.kind());
				let _enter = span.enter();
				self.emit(Patch::Replace {
					path: self.current_path(),
					node: b.clone(),
				});
			}
		}
	}

	fn diff_attributes(&mut self, e_1: &Element, e_2: &Element) {
		if e_1.attributes == e_2.attributes {
			return;
		}

		let before: HashMap<&str, &str> = e_1.attributes.iter().map(|a| (a.name.as_str(), a.value.as_str())).collect();
		let after: HashSet<&str> = e_2.attributes.iter().map(|a| a.name.as_str()).collect();

		let mut added = Vec::new();
		let mut changed = Vec::new();
		for attribute in &e_2.attributes {
			match before.get(attribute.name.as_str()) {
				None => added.push(attribute.clone()),
				Some(&value) if value != attribute.value => changed.push(attribute.clone()),
				Some(_) => (),
			}
		}
		let removed: Vec<String> = e_1.attributes.iter().filter(|a| !after.contains(a.name.as_str())).map(|a| a.name.clone()).collect();

		if added.is_empty() && changed.is_empty() && removed.is_empty() {
			trace!("Attributes were only reordered.");
			return;
		}

		if STATIC_MAX_LEVEL >= Level::TRACE {
			trace!(added = added.len(), changed = changed.len(), removed = removed.len(), "Attributes differ.");
		}
		self.emit(Patch::UpdateAttributes {
			path: self.current_path(),
			added,
			changed,
			removed,
		});
	}

	fn current_path(&self) -> Path {
		Path::new(self.path.clone())
	}

	fn child_path(&self, index: usize) -> Path {
		let mut path = Vec::with_capacity(self.path.len() + 1);
		path.extend_from_slice(&self.path);
		path.push(index);
		Path::new(path)
	}

	fn emit(&mut self, patch: Patch) {
		self.patches.push(patch);
	}
}

/// Diffs with a default [`TreeDiffer`].
#[must_use]
pub fn diff(current: &[Node], candidate: &[Node]) -> Vec<Patch> {
	TreeDiffer::default().diff(current, candidate)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::markup::parse;

	fn patches(a: &str, b: &str) -> Vec<Patch> {
		diff(&parse(a).unwrap(), &parse(b).unwrap())
	}

	#[test]
	fn identical_trees_produce_nothing() {
		assert!(patches("<ul><li class=\"x\">a</li><li>b</li></ul>", "<ul><li class=\"x\">a</li><li>b</li></ul>").is_empty());
	}

	#[test]
	fn attribute_delta_is_exact() {
		assert_eq!(
			patches("<a href=\"#1\" class=\"p\" title=\"t\">x</a>", "<a class=\"p q\" href=\"#1\" data-id=\"7\">x</a>"),
			vec![Patch::UpdateAttributes {
				path: Path::new(vec![0]),
				added: vec![Attribute::new("data-id", "7")],
				changed: vec![Attribute::new("class", "p q")],
				removed: vec!["title".to_owned()],
			}]
		);
	}

	#[test]
	fn reordered_attributes_are_not_a_change() {
		assert!(patches("<a href=\"#1\" class=\"p\"></a>", "<a class=\"p\" href=\"#1\"></a>").is_empty());
	}

	#[test]
	fn text_change_is_local() {
		assert_eq!(
			patches("<p><b>4</b> servings</p>", "<p><b>5</b> servings</p>"),
			vec![Patch::ReplaceText {
				path: Path::new(vec![0, 0, 0]),
				text: "5".to_owned(),
			}]
		);
	}

	#[test]
	fn tag_change_replaces_without_recursing() {
		let candidate = parse("<section><p>new</p></section>").unwrap();
		assert_eq!(patches("<div><p>old</p></div>", "<section><p>new</p></section>"), vec![Patch::Replace {
			path: Path::new(vec![0]),
			node: candidate[0].clone(),
		}]);
	}

	#[test]
	fn text_and_element_swap_is_a_replace() {
		assert_eq!(patches("<p>a</p>", "<p><i>a</i></p>").len(), 1);
		assert!(matches!(&patches("<p>a</p>", "<p><i>a</i></p>")[0], Patch::Replace { path, .. } if path.indices() == [0, 0]));
	}

	#[test]
	fn excess_children_are_appended_in_order() {
		let p = patches("<ul><li>a</li></ul>", "<ul><li>a</li><li>b</li><li>c</li></ul>");
		let paths: Vec<_> = p.iter().map(|p| (p.path().to_string(), matches!(p, Patch::Insert { .. }))).collect();
		assert_eq!(paths, vec![("/0/1".to_owned(), true), ("/0/2".to_owned(), true)]);
	}

	#[test]
	fn missing_children_are_removed_back_to_front() {
		let p = patches("<ul><li>a</li><li>b</li><li>c</li></ul>", "<ul><li>z</li></ul>");
		assert_eq!(p, vec![
			Patch::ReplaceText {
				path: Path::new(vec![0, 0, 0]),
				text: "z".to_owned(),
			},
			Patch::Remove { path: Path::new(vec![0, 2]) },
			Patch::Remove { path: Path::new(vec![0, 1]) },
		]);
	}

	#[test]
	fn visits_each_pair_once() {
		let tree = parse("<div><ul><li>a</li><li>b</li></ul><p>c</p></div>").unwrap();
		let mut differ = TreeDiffer::default();
		assert!(differ.diff(&tree, &tree).is_empty());
		assert_eq!(differ.visited(), crate::vdom::fragment_len(&tree));

		let other = parse("<span>x</span>").unwrap();
		differ.diff(&tree, &other);
		assert_eq!(differ.visited(), 1);
	}

	#[test]
	fn depth_limit_degrades_to_replacement() {
		let a = parse("<div><div><p>a</p></div></div>").unwrap();
		let b = parse("<div><div><p>b</p></div></div>").unwrap();
		let mut differ = TreeDiffer::new(1);
		let patches = differ.diff(&a, &b);
		assert_eq!(patches.len(), 1);
		assert!(matches!(&patches[0], Patch::Replace { path, .. } if path.indices() == [0, 0]));
	}
}
