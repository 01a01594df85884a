use crate::render_api::RenderApi;
use core::{cell::Cell, fmt};
use std::rc::Rc;
use tracing::warn;

/// Shared confirmation counter gating one node's removal from the target.
///
/// Every module's `remove` callback and the node's own `remove` hook receive
/// the same gate; the handle is detached only once all of them have called
/// [`confirm`](Self::confirm). Clone the gate out of the callback to defer
/// confirmation past the end of the reconciliation pass.
pub struct RemoveGate<A: RenderApi> {
	inner: Rc<GateInner<A>>,
}
struct GateInner<A: RenderApi> {
	api: A,
	child: A::Node,
	pending: Cell<usize>,
}
impl<A: RenderApi> Clone for RemoveGate<A> {
	fn clone(&self) -> Self {
		Self { inner: Rc::clone(&self.inner) }
	}
}
impl<A: RenderApi> RemoveGate<A> {
	pub(crate) fn new(api: A, child: A::Node, pending: usize) -> Self {
		Self {
			inner: Rc::new(GateInner { api, child, pending: Cell::new(pending) }),
		}
	}

	/// Records one confirmation. The final confirmation detaches the node from
	/// its current parent (a node already detached by other means is left
	/// alone). Confirming an already-finalized gate is logged and ignored.
	pub fn confirm(&self) {
		let pending = self.inner.pending.get();
		if pending == 0 {
			return warn!("`RemoveGate::confirm` called again after the node was already removed. Ignoring.");
		}
		self.inner.pending.set(pending - 1);
		if pending == 1 {
			if let Some(parent) = self.inner.api.parent_node(&self.inner.child) {
				self.inner.api.remove_child(&parent, &self.inner.child);
			}
		}
	}

	/// Confirmations still outstanding.
	#[must_use]
	pub fn pending(&self) -> usize {
		self.inner.pending.get()
	}
}
impl<A: RenderApi> fmt::Debug for RemoveGate<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RemoveGate").field("child", &self.inner.child).field("pending", &self.inner.pending.get()).finish()
	}
}
