use core::fmt;

/// Capability set of a rendering target.
///
/// The engine never touches the target except through this trait, so any tree
/// of retained nodes can back it — a browser DOM behind FFI bindings, a
/// retained TUI scene graph, or the in-memory mock the test suite ships.
///
/// Implementations are expected to be cheap handles (reference-counted or
/// copyable): the engine clones the adapter into deferred removal gates, and
/// clones [`Node`](Self::Node)s freely while shuffling children.
///
/// Every operation is expected to succeed or to fail loudly inside the
/// adapter; the engine does not catch or wrap adapter faults.
pub trait RenderApi: Clone {
	/// Handle to one materialized node. Equality must be identity of the
	/// underlying target node, not structural equality.
	type Node: Clone + PartialEq + fmt::Debug;

	fn create_element(&self, tag: &str) -> Self::Node;
	fn create_element_ns(&self, ns: &str, tag: &str) -> Self::Node;
	fn create_text(&self, text: &str) -> Self::Node;
	fn create_comment(&self, text: &str) -> Self::Node;

	/// Tag name of an element node, in whatever casing the target reports.
	fn tag_name(&self, node: &Self::Node) -> String;
	fn get_attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
	fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

	fn append_child(&self, parent: &Self::Node, child: &Self::Node);
	/// Inserts `child` before `before`, appending when `before` is [`None`].
	/// A `child` already attached elsewhere is moved, not duplicated.
	fn insert_before(&self, parent: &Self::Node, child: &Self::Node, before: Option<&Self::Node>);
	fn remove_child(&self, parent: &Self::Node, child: &Self::Node);

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Replaces the node's entire content with `text` (dropping any children).
	fn set_text_content(&self, node: &Self::Node, text: &str);
}
