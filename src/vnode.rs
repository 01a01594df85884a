use crate::{remove_gate::RemoveGate, render_api::RenderApi};
use core::fmt;
use hashbrown::HashMap;

/// Identity token matching a node across reconciliation passes independent of its position.
///
/// Keys must be unique among siblings that carry one for the duration of a pass;
/// duplicate sibling keys are a caller error and yield unspecified matching.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Key {
	Str(String),
	Int(i64),
}
impl From<&str> for Key {
	fn from(s: &str) -> Self {
		Key::Str(s.to_owned())
	}
}
impl From<String> for Key {
	fn from(s: String) -> Self {
		Key::Str(s)
	}
}
impl From<i64> for Key {
	fn from(i: i64) -> Self {
		Key::Int(i)
	}
}
impl From<i32> for Key {
	fn from(i: i32) -> Self {
		Key::Int(i.into())
	}
}

/// One tree-description node: an element (`sel` is a tag selector), a comment
/// placeholder (`sel` is `"!"`) or plain text (`sel` is [`None`]).
///
/// `children` and `text` are mutually exclusive; a node may carry neither.
/// `node` is the materialized handle on the rendering target. It is populated
/// exactly once when the node is materialized, or inherited from the matching
/// old node during a patch, and is never shared between two live descriptions.
pub struct VNode<A: RenderApi> {
	pub sel: Option<String>,
	pub key: Option<Key>,
	pub data: Option<VData<A>>,
	pub children: Option<Vec<VNode<A>>>,
	pub text: Option<String>,
	pub node: Option<A::Node>,
}
impl<A: RenderApi> VNode<A> {
	/// A bare text node.
	#[must_use]
	pub fn text_node(text: impl Into<String>) -> Self {
		Self {
			sel: None,
			key: None,
			data: None,
			children: None,
			text: Some(text.into()),
			node: None,
		}
	}

	/// The zero-valued node passed as "previous" to first-time `create` hook invocations.
	#[must_use]
	pub(crate) fn sentinel() -> Self {
		Self {
			sel: Some(String::new()),
			key: None,
			data: Some(VData::default()),
			children: Some(Vec::new()),
			text: None,
			node: None,
		}
	}

	/// Attaches an identity [`Key`], consumed by keyed child reconciliation.
	#[must_use]
	pub fn key(mut self, key: impl Into<Key>) -> Self {
		self.key = Some(key.into());
		self
	}

	pub(crate) fn hook(&self) -> Option<&Hooks<A>> {
		self.data.as_ref().and_then(|data| data.hook.as_ref())
	}
}
impl<A: RenderApi> fmt::Debug for VNode<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VNode")
			.field("sel", &self.sel)
			.field("key", &self.key)
			.field("data", &self.data)
			.field("children", &self.children)
			.field("text", &self.text)
			.field("node", &self.node)
			.finish()
	}
}

/// Per-node configuration bag. Opaque to the engine except for `ns` and `hook`;
/// `attrs` (and anything modules layer on top of it) is consumed by extension
/// modules only.
pub struct VData<A: RenderApi> {
	/// Namespace URI for namespace-aware element creation.
	pub ns: Option<String>,
	pub attrs: HashMap<String, String>,
	pub hook: Option<Hooks<A>>,
}
impl<A: RenderApi> Default for VData<A> {
	fn default() -> Self {
		Self {
			ns: None,
			attrs: HashMap::new(),
			hook: None,
		}
	}
}
impl<A: RenderApi> fmt::Debug for VData<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("VData").field("ns", &self.ns).field("attrs", &self.attrs).field("hook", &self.hook.is_some()).finish()
	}
}

type NodeFn<A> = Box<dyn Fn(&VNode<A>)>;
type PairFn<A> = Box<dyn Fn(&VNode<A>, &VNode<A>)>;

/// Per-node lifecycle hooks.
///
/// Each slot is optional; absent hooks cost nothing. See the crate docs for
/// when each phase fires relative to module callbacks.
#[allow(clippy::type_complexity)]
pub struct Hooks<A: RenderApi> {
	/// Runs before materialization and may reshape `data` in place. It is taken
	/// out of the node before the call, so it fires at most once.
	pub init: Option<Box<dyn Fn(&mut VNode<A>)>>,
	/// `(sentinel, new)` once the handle and all child handles exist.
	pub create: Option<PairFn<A>>,
	/// Deferred until every handle of the pass is attached to the target.
	pub insert: Option<NodeFn<A>>,
	/// `(old, new)` before any patch work on this node.
	pub prepatch: Option<PairFn<A>>,
	/// `(old, new)` after module `update` callbacks.
	pub update: Option<PairFn<A>>,
	/// `(old, new)` after this node's content has been reconciled.
	pub postpatch: Option<PairFn<A>>,
	pub destroy: Option<NodeFn<A>>,
	/// Receives the shared [`RemoveGate`]; the handle stays attached until the
	/// hook (and every module) has confirmed it.
	pub remove: Option<Box<dyn Fn(&VNode<A>, &RemoveGate<A>)>>,
}
impl<A: RenderApi> Default for Hooks<A> {
	fn default() -> Self {
		Self {
			init: None,
			create: None,
			insert: None,
			prepatch: None,
			update: None,
			postpatch: None,
			destroy: None,
			remove: None,
		}
	}
}

/// The sameness predicate: two nodes describe the same logical node, and the
/// old one's handle may be patched in place, iff their keys and selectors both
/// match. This is the single reuse criterion everywhere in the engine.
#[must_use]
pub fn same_vnode<A: RenderApi>(a: &VNode<A>, b: &VNode<A>) -> bool {
	a.key == b.key && a.sel == b.sel
}
