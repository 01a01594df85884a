//! Convenience constructors for tree descriptions.
//!
//! `h("div#app.wide", …)` encodes tag, optional `#id` and `.class` fragments
//! in one selector string; children may be a node list, a single node or a
//! primitive text payload. An `svg`-rooted call marks the whole subtree with
//! the SVG namespace, stopping below `foreignObject`.

use crate::{
	render_api::RenderApi,
	vnode::{VData, VNode},
};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Child payload accepted by [`h`]: nothing, text, one node or many.
pub enum Children<A: RenderApi> {
	None,
	Text(String),
	Nodes(Vec<VNode<A>>),
}
impl<A: RenderApi> From<()> for Children<A> {
	fn from((): ()) -> Self {
		Children::None
	}
}
impl<A: RenderApi> From<&str> for Children<A> {
	fn from(text: &str) -> Self {
		Children::Text(text.to_owned())
	}
}
impl<A: RenderApi> From<String> for Children<A> {
	fn from(text: String) -> Self {
		Children::Text(text)
	}
}
impl<A: RenderApi> From<i64> for Children<A> {
	fn from(value: i64) -> Self {
		Children::Text(value.to_string())
	}
}
impl<A: RenderApi> From<f64> for Children<A> {
	fn from(value: f64) -> Self {
		Children::Text(value.to_string())
	}
}
impl<A: RenderApi> From<VNode<A>> for Children<A> {
	fn from(node: VNode<A>) -> Self {
		Children::Nodes(vec![node])
	}
}
impl<A: RenderApi> From<Vec<VNode<A>>> for Children<A> {
	fn from(nodes: Vec<VNode<A>>) -> Self {
		Children::Nodes(nodes)
	}
}

/// Builds an element node from a selector and children, with default data.
#[must_use]
pub fn h<A: RenderApi>(sel: impl Into<String>, children: impl Into<Children<A>>) -> VNode<A> {
	h_data(sel, VData::default(), children)
}

/// Builds an element node with explicit per-node data (namespace, attributes, hooks).
#[must_use]
pub fn h_data<A: RenderApi>(sel: impl Into<String>, data: VData<A>, children: impl Into<Children<A>>) -> VNode<A> {
	let sel = sel.into();
	let (children, text) = match children.into() {
		Children::None => (None, None),
		Children::Text(text) => (None, Some(text)),
		Children::Nodes(nodes) => (Some(nodes), None),
	};

	let mut node = VNode {
		sel: Some(sel),
		key: None,
		data: Some(data),
		children,
		text,
		node: None,
	};
	if is_svg_selector(node.sel.as_deref().unwrap_or("")) {
		let VNode { sel, data, children, .. } = &mut node;
		if let Some(data) = data {
			add_ns(data, children, sel);
		}
	}
	node
}

/// Builds a bare text node, for mixing literal text into a child list.
#[must_use]
pub fn text<A: RenderApi>(text: impl Into<String>) -> VNode<A> {
	VNode::text_node(text)
}

/// `svg`, `svg#…` or `svg.…` — but not e.g. `svgfoo`.
fn is_svg_selector(sel: &str) -> bool {
	let bytes = sel.as_bytes();
	bytes.starts_with(b"svg") && (bytes.len() == 3 || bytes[3] == b'.' || bytes[3] == b'#')
}

/// Marks `data` (and, below any selector other than `foreignObject`, every
/// descendant that carries data) with the SVG namespace.
fn add_ns<A: RenderApi>(data: &mut VData<A>, children: &mut Option<Vec<VNode<A>>>, sel: &Option<String>) {
	data.ns = Some(SVG_NS.to_owned());
	if sel.as_deref() == Some("foreignObject") {
		return;
	}
	if let Some(children) = children {
		for child in children {
			let VNode { sel, data, children, .. } = child;
			if let Some(data) = data {
				add_ns(data, children, sel);
			}
		}
	}
}
