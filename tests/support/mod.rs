//! In-memory rendering target for the integration tests: a retained node tree
//! with identity handles and mutation counters, so tests can assert both the
//! final structure and how much work the engine performed to reach it.

#![allow(dead_code)]

use arbor_diff::RenderApi;
use core::{cell::Cell, cell::RefCell, fmt};
use std::rc::{Rc, Weak};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).with_test_writer().try_init();
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Kind {
	Element,
	Text,
	Comment,
}

pub struct MockNode {
	kind: Kind,
	tag: String,
	ns: Option<String>,
	text: String,
	attrs: Vec<(String, String)>,
	children: Vec<Handle>,
	parent: Option<Weak<RefCell<MockNode>>>,
}

/// Identity handle to one mock node. Equality is pointer identity.
#[derive(Clone)]
pub struct Handle(Rc<RefCell<MockNode>>);
impl PartialEq for Handle {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl fmt::Debug for Handle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let node = self.0.borrow();
		match node.kind {
			Kind::Element => write!(f, "<{}>", node.tag),
			Kind::Text => write!(f, "#text({:?})", node.text),
			Kind::Comment => write!(f, "<!--{}-->", node.text),
		}
	}
}
impl Handle {
	pub fn kind(&self) -> Kind {
		self.0.borrow().kind
	}

	pub fn tag(&self) -> String {
		self.0.borrow().tag.clone()
	}

	pub fn ns(&self) -> Option<String> {
		self.0.borrow().ns.clone()
	}

	pub fn text(&self) -> String {
		self.0.borrow().text.clone()
	}

	pub fn attr(&self, name: &str) -> Option<String> {
		self.0.borrow().attrs.iter().find(|(attr, _)| attr == name).map(|(_, value)| value.clone())
	}

	pub fn children(&self) -> Vec<Handle> {
		self.0.borrow().children.clone()
	}

	pub fn child(&self, index: usize) -> Handle {
		self.0.borrow().children[index].clone()
	}

	pub fn is_attached(&self) -> bool {
		self.0.borrow().parent.as_ref().and_then(Weak::upgrade).is_some()
	}

	/// Text rendered by this subtree: own text when childless, otherwise the
	/// concatenation of the children's.
	pub fn rendered_text(&self) -> String {
		let node = self.0.borrow();
		if node.children.is_empty() {
			node.text.clone()
		} else {
			node.children.iter().map(Handle::rendered_text).collect()
		}
	}

	/// Serializes the subtree to a compact markup string for structural asserts.
	pub fn markup(&self) -> String {
		let node = self.0.borrow();
		match node.kind {
			Kind::Text => node.text.clone(),
			Kind::Comment => format!("<!--{}-->", node.text),
			Kind::Element => {
				let mut out = format!("<{}", node.tag);
				for (name, value) in &node.attrs {
					out.push_str(&format!(" {}=\"{}\"", name, value));
				}
				out.push('>');
				if node.children.is_empty() {
					out.push_str(&node.text);
				} else {
					for child in &node.children {
						out.push_str(&child.markup());
					}
				}
				out.push_str(&format!("</{}>", node.tag));
				out
			}
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Counts {
	pub created: usize,
	pub inserted: usize,
	pub removed: usize,
	pub text_sets: usize,
}

#[derive(Clone, Default)]
pub struct MockDom {
	counts: Rc<CountCells>,
}
#[derive(Default)]
struct CountCells {
	created: Cell<usize>,
	inserted: Cell<usize>,
	removed: Cell<usize>,
	text_sets: Cell<usize>,
}
impl MockDom {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn counts(&self) -> Counts {
		Counts {
			created: self.counts.created.get(),
			inserted: self.counts.inserted.get(),
			removed: self.counts.removed.get(),
			text_sets: self.counts.text_sets.get(),
		}
	}

	/// A detached element outside the engine, for initial-mount scenarios.
	pub fn element_with(&self, tag: &str, attrs: &[(&str, &str)]) -> Handle {
		let handle = self.create_element(tag);
		for (name, value) in attrs {
			self.set_attribute(&handle, name, value);
		}
		handle
	}

	/// A free-standing parent holding `child`, standing in for the mounting
	/// container the engine itself never creates.
	pub fn container_around(&self, child: &Handle) -> Handle {
		let container = self.create_element("container");
		self.append_child(&container, child);
		container
	}

	fn new_node(&self, kind: Kind, tag: &str, ns: Option<&str>, text: &str) -> Handle {
		self.counts.created.set(self.counts.created.get() + 1);
		Handle(Rc::new(RefCell::new(MockNode {
			kind,
			tag: tag.to_owned(),
			ns: ns.map(str::to_owned),
			text: text.to_owned(),
			attrs: Vec::new(),
			children: Vec::new(),
			parent: None,
		})))
	}

	fn detach(child: &Handle) {
		let parent = child.0.borrow().parent.as_ref().and_then(Weak::upgrade);
		if let Some(parent) = parent {
			parent.borrow_mut().children.retain(|sibling| !Rc::ptr_eq(&sibling.0, &child.0));
		}
		child.0.borrow_mut().parent = None;
	}
}
impl RenderApi for MockDom {
	type Node = Handle;

	fn create_element(&self, tag: &str) -> Handle {
		self.new_node(Kind::Element, tag, None, "")
	}

	fn create_element_ns(&self, ns: &str, tag: &str) -> Handle {
		self.new_node(Kind::Element, tag, Some(ns), "")
	}

	fn create_text(&self, text: &str) -> Handle {
		self.new_node(Kind::Text, "", None, text)
	}

	fn create_comment(&self, text: &str) -> Handle {
		self.new_node(Kind::Comment, "", None, text)
	}

	fn tag_name(&self, node: &Handle) -> String {
		node.0.borrow().tag.clone()
	}

	fn get_attribute(&self, node: &Handle, name: &str) -> Option<String> {
		node.attr(name)
	}

	fn set_attribute(&self, node: &Handle, name: &str, value: &str) {
		let mut inner = node.0.borrow_mut();
		match inner.attrs.iter_mut().find(|(attr, _)| attr == name) {
			Some((_, slot)) => *slot = value.to_owned(),
			None => inner.attrs.push((name.to_owned(), value.to_owned())),
		}
	}

	fn append_child(&self, parent: &Handle, child: &Handle) {
		self.insert_before(parent, child, None);
	}

	fn insert_before(&self, parent: &Handle, child: &Handle, before: Option<&Handle>) {
		MockDom::detach(child);
		{
			let mut inner = parent.0.borrow_mut();
			let index = match before {
				Some(before) => inner.children.iter().position(|sibling| sibling == before).expect("insert_before: anchor is not a child of parent"),
				None => inner.children.len(),
			};
			inner.children.insert(index, child.clone());
		}
		child.0.borrow_mut().parent = Some(Rc::downgrade(&parent.0));
		self.counts.inserted.set(self.counts.inserted.get() + 1);
	}

	fn remove_child(&self, parent: &Handle, child: &Handle) {
		{
			let mut inner = parent.0.borrow_mut();
			let index = inner.children.iter().position(|sibling| sibling == child).expect("remove_child: node is not a child of parent");
			inner.children.remove(index);
		}
		child.0.borrow_mut().parent = None;
		self.counts.removed.set(self.counts.removed.get() + 1);
	}

	fn parent_node(&self, node: &Handle) -> Option<Handle> {
		node.0.borrow().parent.as_ref().and_then(Weak::upgrade).map(Handle)
	}

	fn next_sibling(&self, node: &Handle) -> Option<Handle> {
		let parent = self.parent_node(node)?;
		let inner = parent.0.borrow();
		let index = inner.children.iter().position(|sibling| sibling == node)?;
		inner.children.get(index + 1).cloned()
	}

	fn set_text_content(&self, node: &Handle, text: &str) {
		let children: Vec<Handle> = node.0.borrow_mut().children.drain(..).collect();
		for child in children {
			child.0.borrow_mut().parent = None;
		}
		node.0.borrow_mut().text = text.to_owned();
		self.counts.text_sets.set(self.counts.text_sets.get() + 1);
	}
}
