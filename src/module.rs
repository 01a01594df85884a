use crate::{remove_gate::RemoveGate, render_api::RenderApi, vnode::VNode};

/// One extension module: a partial set of lifecycle-phase callbacks.
///
/// Modules are handed to [`TreeDiffer::new`](crate::TreeDiffer::new) as an
/// ordered list; within each phase, callbacks fire in module order. Every
/// method defaults to a no-op, so a module implements only the phases it
/// cares about.
///
/// Phase timing during one pass:
///
/// - `pre` — once, before anything else.
/// - `create(sentinel, new)` — for every element materialized, after the
///   handle exists and before its children are materialized.
/// - `update(old, new)` — for every patched-in-place node carrying data.
/// - `destroy(node)` — depth-first over an unmounted subtree, before any
///   handle in it is detached.
/// - `remove(node, gate)` — for every directly removed element node. The default
///   implementation confirms the gate immediately; override it and defer the
///   confirmation to delay the actual detach (exit animations, async
///   teardown). A gate never confirmed keeps the handle attached forever.
/// - `post` — once, after the insert queue has been flushed.
pub trait Module<A: RenderApi> {
	fn pre(&self) {}
	fn create(&self, old: &VNode<A>, new: &VNode<A>) {
		let _ = (old, new);
	}
	fn update(&self, old: &VNode<A>, new: &VNode<A>) {
		let _ = (old, new);
	}
	fn destroy(&self, node: &VNode<A>) {
		let _ = node;
	}
	fn remove(&self, node: &VNode<A>, gate: &RemoveGate<A>) {
		let _ = node;
		gate.confirm();
	}
	fn post(&self) {}
}
