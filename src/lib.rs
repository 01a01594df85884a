#![doc(html_root_url = "https://docs.rs/arbor-diff/0.1.0")]
#![warn(clippy::pedantic)]

//! A keyed virtual-tree reconciliation engine.
//!
//! Given an immutable description of a desired tree and the tree returned by
//! the previous pass, [`TreeDiffer::patch`] applies the minimal mutations to a
//! rendering target so it matches the new description, reusing materialized
//! nodes (and whatever state the target attaches to them) wherever the old and
//! new descriptions agree on key and selector.
//!
//! The engine never assumes a concrete rendering technology: all target access
//! goes through the [`RenderApi`] adapter trait, and all attribute/style/event
//! synchronization is delegated to external [`Module`]s plugged into the
//! six-phase lifecycle-hook protocol (`pre`, `create`, `update`, `destroy`,
//! `remove`, `post`).

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod diff;
pub mod h;
pub mod module;
pub mod remove_gate;
pub mod render_api;
pub mod vnode;

pub use self::{
	diff::{PatchRoot, TreeDiffer},
	h::{h, h_data, text, Children},
	module::Module,
	remove_gate::RemoveGate,
	render_api::RenderApi,
	vnode::{same_vnode, Hooks, Key, VData, VNode},
};
