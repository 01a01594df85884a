//! The reconciliation engine: materialization, keyed child diffing, in-place
//! patching, unmounting and the top-level driver.
//!
//! One [`TreeDiffer::patch`] call runs synchronously to completion. The engine
//! holds no state across calls; the caller threads continuity through by
//! passing the returned tree back in as the next call's old root.

use crate::{
	module::Module,
	remove_gate::RemoveGate,
	render_api::RenderApi,
	vnode::{same_vnode, Key, VData, VNode},
};
use core::fmt;
use hashbrown::HashMap;
use tracing::{error, trace, trace_span, warn};

/// Paths (child-index vectors from the new root) of nodes whose `insert` hook
/// is deferred until every handle of the pass is attached.
type InsertQueue = Vec<Vec<usize>>;

/// Old-root argument of [`TreeDiffer::patch`]: either the tree returned by the
/// previous pass, or a raw handle already mounted on the target (initial
/// mount), which gets wrapped into a childless description of itself.
pub enum PatchRoot<A: RenderApi> {
	Tree(VNode<A>),
	Mounted(A::Node),
}
impl<A: RenderApi> From<VNode<A>> for PatchRoot<A> {
	fn from(tree: VNode<A>) -> Self {
		PatchRoot::Tree(tree)
	}
}

/// Reconciles tree descriptions against a rendering target.
///
/// Construction captures the adapter and the ordered extension-module list
/// once, so repeated [`patch`](Self::patch) calls reuse both.
pub struct TreeDiffer<A: RenderApi> {
	api: A,
	modules: Vec<Box<dyn Module<A>>>,
	empty: VNode<A>,
}
impl<A: RenderApi> TreeDiffer<A> {
	#[must_use]
	pub fn new(api: A, modules: Vec<Box<dyn Module<A>>>) -> Self {
		Self {
			api,
			modules,
			empty: VNode::sentinel(),
		}
	}

	#[must_use]
	pub fn api(&self) -> &A {
		&self.api
	}

	/// Runs one reconciliation pass and returns the new tree, which becomes the
	/// caller's old root for the next pass.
	///
	/// Roots that are the same logical node (equal key and selector) are
	/// patched in place. Unrelated roots are replaced: the new tree is
	/// materialized fully, inserted right after the old root's handle, and only
	/// then is the old root unmounted, so the target never shows a gap.
	#[must_use = "the returned tree is the old root of the next pass"]
	pub fn patch(&self, old: PatchRoot<A>, mut new: VNode<A>) -> VNode<A> {
		let span = trace_span!("patch", sel = ?new.sel);
		let _enter = span.enter();

		let mut inserted = InsertQueue::new();
		let mut path = Vec::new();

		for module in &self.modules {
			module.pre();
		}

		let old = match old {
			PatchRoot::Tree(old) => old,
			PatchRoot::Mounted(handle) => self.empty_node_at(&handle),
		};

		if same_vnode(&old, &new) {
			self.patch_node(old, &mut new, &mut inserted, &mut path);
		} else {
			trace!(old_sel = ?old.sel, new_sel = ?new.sel, "Root nodes are unrelated. Replacing.");
			let old_handle = old.node.clone();
			let new_handle = self.create_node(&mut new, &mut inserted, &mut path);
			match old_handle {
				None => error!("The old root was never materialized; the new tree is left unattached."),
				Some(old_handle) => {
					if let Some(parent) = self.api.parent_node(&old_handle) {
						let next = self.api.next_sibling(&old_handle);
						self.api.insert_before(&parent, &new_handle, next.as_ref());
						let mut slot = [Some(old)];
						self.remove_nodes(&parent, &mut slot);
					}
				}
			}
		}

		for queued in &inserted {
			match node_at_path(&new, queued) {
				Some(node) => {
					if let Some(insert) = node.hook().and_then(|hooks| hooks.insert.as_ref()) {
						insert(node);
					}
				}
				None => error!(path = ?queued, "An insert-queue path no longer resolves in the new tree. Skipping."),
			}
		}

		for module in &self.modules {
			module.post();
		}

		new
	}

	/// Wraps an already-mounted handle into a childless description of itself,
	/// so an initial mount can go through the regular same/different dispatch.
	fn empty_node_at(&self, handle: &A::Node) -> VNode<A> {
		let id = self
			.api
			.get_attribute(handle, "id")
			.filter(|id| !id.is_empty())
			.map(|id| format!("#{}", id))
			.unwrap_or_default();
		let classes = self
			.api
			.get_attribute(handle, "class")
			.filter(|classes| !classes.trim().is_empty())
			.map(|classes| format!(".{}", classes.split_whitespace().collect::<Vec<_>>().join(".")))
			.unwrap_or_default();
		VNode {
			sel: Some(format!("{}{}{}", self.api.tag_name(handle).to_lowercase(), id, classes)),
			key: None,
			data: Some(VData::default()),
			children: Some(Vec::new()),
			text: None,
			node: Some(handle.clone()),
		}
	}

	/// Materializes `node` (recursively) on the target and returns its handle,
	/// which is also stored in `node.node`.
	fn create_node(&self, node: &mut VNode<A>, inserted: &mut InsertQueue, path: &mut Vec<usize>) -> A::Node {
		let span = trace_span!("create_node", sel = ?node.sel);
		let _enter = span.enter();

		// `init` may replace `node.data` wholesale, so it is taken out first
		// and everything below re-reads through the node. It fires at most once.
		let init = node.data.as_mut().and_then(|data| data.hook.as_mut()).and_then(|hooks| hooks.init.take());
		if let Some(init) = init {
			init(node);
		}

		if node.children.is_some() && node.text.is_some() {
			warn!(sel = ?node.sel, "Node carries both children and text. The children take precedence.");
		}

		let sel = node.sel.clone();
		let handle = match sel.as_deref() {
			Some("!") => {
				if node.text.is_none() {
					node.text = Some(String::new());
				}
				self.api.create_comment(node.text.as_deref().unwrap_or(""))
			}
			Some(sel) => {
				let parts = SelectorParts::parse(sel);
				let handle = match node.data.as_ref().and_then(|data| data.ns.as_deref()) {
					Some(ns) => self.api.create_element_ns(ns, parts.tag),
					None => self.api.create_element(parts.tag),
				};
				if let Some(id) = parts.id {
					self.api.set_attribute(&handle, "id", id);
				}
				if let Some(classes) = &parts.classes {
					self.api.set_attribute(&handle, "class", classes);
				}
				node.node = Some(handle.clone());
				for module in &self.modules {
					module.create(&self.empty, node);
				}
				if let Some(children) = node.children.as_mut() {
					for (index, child) in children.iter_mut().enumerate() {
						path.push(index);
						let child_handle = self.create_node(child, inserted, path);
						path.pop();
						self.api.append_child(&handle, &child_handle);
					}
				} else if let Some(text) = &node.text {
					let text_handle = self.api.create_text(text);
					self.api.append_child(&handle, &text_handle);
				}
				if let Some(create) = node.hook().and_then(|hooks| hooks.create.as_ref()) {
					create(&self.empty, node);
				}
				if node.hook().map_or(false, |hooks| hooks.insert.is_some()) {
					inserted.push(path.clone());
				}
				handle
			}
			None => self.api.create_text(node.text.as_deref().unwrap_or("")),
		};
		node.node = Some(handle.clone());
		handle
	}

	/// Reconciles two nodes for which [`same_vnode`] holds (the caller checks).
	/// Consumes the old node; its handle carries over to `new`.
	fn patch_node(&self, mut old: VNode<A>, new: &mut VNode<A>, inserted: &mut InsertQueue, path: &mut Vec<usize>) {
		let span = trace_span!("patch_node", sel = ?new.sel, key = ?new.key);
		let _enter = span.enter();

		if let Some(prepatch) = new.hook().and_then(|hooks| hooks.prepatch.as_ref()) {
			prepatch(&old, new);
		}

		let handle = match old.node.clone() {
			Some(handle) => handle,
			None => return error!(sel = ?old.sel, "Patching a node that was never materialized. Skipping."),
		};
		new.node = Some(handle.clone());

		if new.data.is_some() {
			for module in &self.modules {
				module.update(&old, new);
			}
			if let Some(update) = new.hook().and_then(|hooks| hooks.update.as_ref()) {
				update(&old, new);
			}
		}

		if new.text.is_none() {
			let had_old_text = old.text.is_some();
			match (old.children.take(), new.children.as_mut()) {
				(Some(old_children), Some(new_children)) => {
					self.update_children(&handle, old_children, new_children, inserted, path);
				}
				(None, Some(new_children)) => {
					if had_old_text {
						self.api.set_text_content(&handle, "");
					}
					self.add_nodes(&handle, None, new_children, 0, inserted, path);
				}
				(Some(old_children), None) => {
					let mut slots: Vec<Option<VNode<A>>> = old_children.into_iter().map(Some).collect();
					self.remove_nodes(&handle, &mut slots);
				}
				(None, None) => {
					if had_old_text {
						self.api.set_text_content(&handle, "");
					}
				}
			}
		} else if old.text.as_deref() != new.text.as_deref() {
			if let Some(old_children) = old.children.take() {
				let mut slots: Vec<Option<VNode<A>>> = old_children.into_iter().map(Some).collect();
				self.remove_nodes(&handle, &mut slots);
			}
			self.api.set_text_content(&handle, new.text.as_deref().unwrap_or(""));
		}

		if let Some(postpatch) = new.hook().and_then(|hooks| hooks.postpatch.as_ref()) {
			postpatch(&old, new);
		}
	}

	/// The keyed four-pointer diff over one parent's ordered child lists.
	///
	/// The four O(1) cursor comparisons cover the common cases (no reorder,
	/// append, prepend, swap); only the residual case builds the key-to-index
	/// map, at most once per call. Old slots consumed by a key match are left
	/// empty and skipped by the cursors without comparison.
	#[allow(clippy::too_many_lines)]
	fn update_children(&self, parent: &A::Node, old_children: Vec<VNode<A>>, new_children: &mut [VNode<A>], inserted: &mut InsertQueue, path: &mut Vec<usize>) {
		let span = trace_span!("update_children", old_len = old_children.len(), new_len = new_children.len());
		let _enter = span.enter();

		let mut old: Vec<Option<VNode<A>>> = old_children.into_iter().map(Some).collect();
		let mut old_start: isize = 0;
		let mut old_end: isize = old.len() as isize - 1;
		let mut new_start: isize = 0;
		let mut new_end: isize = new_children.len() as isize - 1;
		let mut key_map: Option<HashMap<Key, usize>> = None;

		while old_start <= old_end && new_start <= new_end {
			let os = old_start as usize;
			let oe = old_end as usize;
			let ns = new_start as usize;
			let ne = new_end as usize;

			if old[os].is_none() {
				// Consumed earlier by a key match.
				old_start += 1;
			} else if old[oe].is_none() {
				old_end -= 1;
			} else if same_vnode(old[os].as_ref().expect("live start slot"), &new_children[ns]) {
				let old_node = old[os].take().expect("live start slot");
				path.push(ns);
				self.patch_node(old_node, &mut new_children[ns], inserted, path);
				path.pop();
				old_start += 1;
				new_start += 1;
			} else if same_vnode(old[oe].as_ref().expect("live end slot"), &new_children[ne]) {
				let old_node = old[oe].take().expect("live end slot");
				path.push(ne);
				self.patch_node(old_node, &mut new_children[ne], inserted, path);
				path.pop();
				old_end -= 1;
				new_end -= 1;
			} else if same_vnode(old[os].as_ref().expect("live start slot"), &new_children[ne]) {
				// Moved right: patch, then reinsert just past the old-end handle.
				trace!(key = ?new_children[ne].key, "Child moved right");
				let old_node = old[os].take().expect("live start slot");
				let after = old[oe].as_ref().and_then(|node| node.node.clone());
				path.push(ne);
				self.patch_node(old_node, &mut new_children[ne], inserted, path);
				path.pop();
				match (&new_children[ne].node, after) {
					(Some(moved), Some(after)) => {
						let before = self.api.next_sibling(&after);
						self.api.insert_before(parent, moved, before.as_ref());
					}
					_ => error!("Missing handle while moving a child right. Skipping the move."),
				}
				old_start += 1;
				new_end -= 1;
			} else if same_vnode(old[oe].as_ref().expect("live end slot"), &new_children[ns]) {
				// Moved left: patch, then reinsert before the old-start handle.
				trace!(key = ?new_children[ns].key, "Child moved left");
				let old_node = old[oe].take().expect("live end slot");
				let before = old[os].as_ref().and_then(|node| node.node.clone());
				path.push(ns);
				self.patch_node(old_node, &mut new_children[ns], inserted, path);
				path.pop();
				match &new_children[ns].node {
					Some(moved) => self.api.insert_before(parent, moved, before.as_ref()),
					None => error!("Missing handle while moving a child left. Skipping the move."),
				}
				old_end -= 1;
				new_start += 1;
			} else {
				let key_map = key_map.get_or_insert_with(|| {
					let mut map = HashMap::new();
					for index in os..=oe {
						if let Some(child) = &old[index] {
							if let Some(key) = &child.key {
								map.insert(key.clone(), index);
							}
						}
					}
					map
				});
				let index_in_old = new_children[ns].key.as_ref().and_then(|key| key_map.get(key).copied());
				match index_in_old {
					None => {
						// A genuinely new node.
						let before = old[os].as_ref().and_then(|node| node.node.clone());
						path.push(ns);
						let handle = self.create_node(&mut new_children[ns], inserted, path);
						path.pop();
						self.api.insert_before(parent, &handle, before.as_ref());
					}
					Some(index) => {
						if old[index].as_ref().map_or(false, |moved| moved.sel == new_children[ns].sel) {
							let moved = old[index].take().expect("live keyed slot");
							let moved_handle = moved.node.clone();
							path.push(ns);
							self.patch_node(moved, &mut new_children[ns], inserted, path);
							path.pop();
							let before = old[os].as_ref().and_then(|node| node.node.clone());
							match moved_handle {
								Some(moved_handle) => self.api.insert_before(parent, &moved_handle, before.as_ref()),
								None => error!("Missing handle while moving a keyed child. Skipping the move."),
							}
						} else {
							// Same key, different element type: materialize fresh. The
							// stale old slot stays put for the bulk removal below.
							trace!(key = ?new_children[ns].key, "Key matched but selector changed. Recreating.");
							let before = old[os].as_ref().and_then(|node| node.node.clone());
							path.push(ns);
							let handle = self.create_node(&mut new_children[ns], inserted, path);
							path.pop();
							self.api.insert_before(parent, &handle, before.as_ref());
						}
					}
				}
				new_start += 1;
			}
		}

		if old_start > old_end {
			if new_start <= new_end {
				// New-side leftovers are bulk inserts, positioned before the
				// node that closed the window on the right (if any).
				let before = new_children.get((new_end + 1) as usize).and_then(|node| node.node.clone());
				self.add_nodes(parent, before.as_ref(), &mut new_children[new_start as usize..=new_end as usize], new_start as usize, inserted, path);
			}
		} else if new_start > new_end {
			self.remove_nodes(parent, &mut old[old_start as usize..=old_end as usize]);
		}
	}

	/// Materializes `children` in order and inserts each before `before`
	/// (appending when `before` is [`None`]). `base_index` is the offset of the
	/// slice within the parent's full child list.
	fn add_nodes(&self, parent: &A::Node, before: Option<&A::Node>, children: &mut [VNode<A>], base_index: usize, inserted: &mut InsertQueue, path: &mut Vec<usize>) {
		for (offset, child) in children.iter_mut().enumerate() {
			path.push(base_index + offset);
			let handle = self.create_node(child, inserted, path);
			path.pop();
			self.api.insert_before(parent, &handle, before);
		}
	}

	/// Unmounts every remaining child in `slots`. For element and placeholder
	/// nodes the full destroy walk runs first, then removal is gated behind one
	/// confirmation per module plus one for the node's own `remove` hook (or
	/// the engine, when the node has none). Text nodes detach synchronously.
	fn remove_nodes(&self, parent: &A::Node, slots: &mut [Option<VNode<A>>]) {
		for slot in slots.iter_mut() {
			let child = match slot.take() {
				Some(child) => child,
				None => continue,
			};
			if child.sel.is_some() {
				self.invoke_destroy_hooks(&child);
				let handle = match child.node.clone() {
					Some(handle) => handle,
					None => {
						error!(sel = ?child.sel, "Removing a child that was never materialized. Skipping.");
						continue;
					}
				};
				let gate = RemoveGate::new(self.api.clone(), handle, self.modules.len() + 1);
				for module in &self.modules {
					module.remove(&child, &gate);
				}
				match child.hook().and_then(|hooks| hooks.remove.as_ref()) {
					Some(remove) => remove(&child, &gate),
					None => gate.confirm(),
				}
			} else {
				match &child.node {
					Some(handle) => self.api.remove_child(parent, handle),
					None => error!("Removing a text node that was never materialized. Skipping."),
				}
			}
		}
	}

	/// Depth-first, pre-order destroy walk. Runs in full before any handle of
	/// the subtree is detached.
	fn invoke_destroy_hooks(&self, node: &VNode<A>) {
		if node.data.is_some() {
			if let Some(destroy) = node.hook().and_then(|hooks| hooks.destroy.as_ref()) {
				destroy(node);
			}
			for module in &self.modules {
				module.destroy(node);
			}
		}
		if let Some(children) = &node.children {
			for child in children {
				self.invoke_destroy_hooks(child);
			}
		}
	}
}
impl<A: RenderApi + fmt::Debug> fmt::Debug for TreeDiffer<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TreeDiffer").field("api", &self.api).field("modules", &self.modules.len()).finish()
	}
}

fn node_at_path<'a, A: RenderApi>(root: &'a VNode<A>, path: &[usize]) -> Option<&'a VNode<A>> {
	let mut node = root;
	for &index in path {
		node = node.children.as_ref()?.get(index)?;
	}
	Some(node)
}

/// Tag, `#id` and `.class` fragments of a selector. A direct port of the
/// index math the selector grammar is defined by: the first `#`, then the
/// first `.` at or after it; leading fragments stay part of the tag.
struct SelectorParts<'a> {
	tag: &'a str,
	id: Option<&'a str>,
	classes: Option<String>,
}
impl<'a> SelectorParts<'a> {
	fn parse(sel: &'a str) -> Self {
		let hash_idx = sel.find('#');
		let dot_idx = match hash_idx {
			Some(hash_idx) => sel[hash_idx..].find('.').map(|dot_idx| dot_idx + hash_idx),
			None => sel.find('.'),
		};
		let hash = match hash_idx {
			Some(index) if index > 0 => index,
			_ => sel.len(),
		};
		let dot = match dot_idx {
			Some(index) if index > 0 => index,
			_ => sel.len(),
		};
		let tag = if hash_idx.is_some() || dot_idx.is_some() { &sel[..hash.min(dot)] } else { sel };
		Self {
			tag,
			id: if hash < dot { Some(&sel[hash + 1..dot]) } else { None },
			classes: match dot_idx {
				Some(index) if index > 0 => Some(sel[index + 1..].replace('.', " ")),
				_ => None,
			},
		}
	}
}
