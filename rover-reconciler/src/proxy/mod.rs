//! Batched mutation proxy: a shadow element tree in front of the host
//! adapter that coalesces property writes until an explicit flush.

mod element;

pub use element::{ElementId, PendingElement};

use crate::error::{ReconcileError, Result};
use crate::host::{HostAdapter, Renderer};
use crate::node::{NodeId, WidgetKind};
use crate::value::{PropValue, Props};
use tracing::trace;

pub struct PendingDom<R: Renderer> {
    host: HostAdapter<R>,
    elements: Vec<Option<PendingElement>>,
    free_list: Vec<u32>,
    root: ElementId,
    /// Elements with writes not yet forwarded, in write order
    pending: Vec<ElementId>,
}

impl<R: Renderer> PendingDom<R> {
    pub fn new(host: HostAdapter<R>) -> Self {
        let mut root = PendingElement::new(WidgetKind::Window.tag());
        root.node = Some(host.root());

        Self {
            host,
            elements: vec![Some(root)],
            free_list: Vec::new(),
            root: ElementId(0),
            pending: Vec::new(),
        }
    }

    /// Shadow element bound to the host's root window
    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn host(&self) -> &HostAdapter<R> {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut HostAdapter<R> {
        &mut self.host
    }

    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.alloc(PendingElement::new(tag))
    }

    pub fn create_text_node(&mut self, text: &str) -> ElementId {
        let mut element = PendingElement::new("text");
        element.props.insert("text".into(), PropValue::from(text));
        self.alloc(element)
    }

    pub fn element(&self, el: ElementId) -> Option<&PendingElement> {
        self.elements.get(el.index())?.as_ref()
    }

    fn element_mut(&mut self, el: ElementId) -> Result<&mut PendingElement> {
        self.elements
            .get_mut(el.index())
            .and_then(Option::as_mut)
            .ok_or(ReconcileError::MissingElement(el))
    }

    fn get(&self, el: ElementId) -> Result<&PendingElement> {
        self.element(el).ok_or(ReconcileError::MissingElement(el))
    }

    /// Record a write. The first write after the element was attached queues
    /// it for the next flush; later writes only update the bag.
    pub fn set_attribute(
        &mut self,
        el: ElementId,
        name: &str,
        value: impl Into<PropValue>,
    ) -> Result<()> {
        let element = self.element_mut(el)?;
        let enqueue = element.is_attached() && !element.scheduled;
        if enqueue {
            element.scheduled = true;
        }
        element.props.insert(name.into(), value.into());

        if enqueue {
            self.pending.push(el);
            trace!(element = ?el, "scheduled flush");
        }
        Ok(())
    }

    pub fn set_data(&mut self, el: ElementId, text: &str) -> Result<()> {
        self.set_attribute(el, "text", text)
    }

    /// Drop a key from the pending bag. Never schedules a flush on its own.
    pub fn remove_attribute(&mut self, el: ElementId, name: &str) -> Result<()> {
        self.element_mut(el)?.props.remove(name);
        Ok(())
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `before` (at the end when absent),
    /// moving it out of any current parent first.
    pub fn insert_before(
        &mut self,
        parent: ElementId,
        child: ElementId,
        before: Option<ElementId>,
    ) -> Result<()> {
        self.get(parent)?;
        if let Some(before) = before {
            if self.get(before)?.parent != Some(parent) {
                return Err(ReconcileError::NotAChildElement {
                    parent,
                    child: before,
                });
            }
        }
        // inserting before itself keeps the element where it is
        let before = match before {
            Some(before) if before == child => self.get(child)?.next_sibling,
            other => other,
        };
        let current = self.get(child)?.parent;
        if let Some(current) = current {
            self.remove_child(current, child)?;
        }

        match before {
            Some(before) => {
                let prev = self.get(before)?.prev_sibling;
                self.element_mut(before)?.prev_sibling = Some(child);
                match prev {
                    Some(prev) => self.element_mut(prev)?.next_sibling = Some(child),
                    None => self.element_mut(parent)?.first_child = Some(child),
                }
                let element = self.element_mut(child)?;
                element.prev_sibling = prev;
                element.next_sibling = Some(before);
            }
            None => {
                let last = self.get(parent)?.last_child;
                match last {
                    Some(last) => self.element_mut(last)?.next_sibling = Some(child),
                    None => self.element_mut(parent)?.first_child = Some(child),
                }
                self.element_mut(parent)?.last_child = Some(child);
                let element = self.element_mut(child)?;
                element.prev_sibling = last;
                element.next_sibling = None;
            }
        }
        self.element_mut(child)?.parent = Some(parent);

        let parent_node = self.materialize(parent)?;
        let child_node = self.materialize(child)?;
        let before_node = match before {
            Some(before) => Some(self.materialize(before)?),
            None => None,
        };
        self.host.insert_child(parent_node, child_node, before_node)
    }

    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<()> {
        let element = self.get(child)?;
        if element.parent != Some(parent) {
            return Err(ReconcileError::NotAChildElement { parent, child });
        }
        let (prev, next, child_node) = (element.prev_sibling, element.next_sibling, element.node);

        match prev {
            Some(prev) => self.element_mut(prev)?.next_sibling = next,
            None => self.element_mut(parent)?.first_child = next,
        }
        match next {
            Some(next) => self.element_mut(next)?.prev_sibling = prev,
            None => self.element_mut(parent)?.last_child = prev,
        }
        let element = self.element_mut(child)?;
        element.parent = None;
        element.prev_sibling = None;
        element.next_sibling = None;

        let parent_node = self.get(parent)?.node;
        match (parent_node, child_node) {
            (Some(parent_node), Some(child_node)) => {
                self.host.remove_child(parent_node, child_node)
            }
            _ => Ok(()),
        }
    }

    /// Forward every queued element's accumulated bag to the host, one
    /// `update_props` call per element. Returns the number of calls.
    ///
    /// On failure the failing element is dropped from the queue and the
    /// elements after it stay queued for the next flush.
    pub fn flush(&mut self) -> Result<usize> {
        let mut forwarded = 0;
        let queue = std::mem::take(&mut self.pending);

        for (i, &el) in queue.iter().enumerate() {
            let Some(element) = self.elements.get_mut(el.index()).and_then(Option::as_mut) else {
                continue;
            };
            if !element.scheduled {
                continue;
            }
            element.scheduled = false;

            if let Some(node) = element.node {
                let props = element.props.clone();
                if let Err(err) = self.host.update_props(node, props) {
                    self.pending.splice(0..0, queue[i + 1..].iter().copied());
                    return Err(err);
                }
                forwarded += 1;
            }
        }

        if forwarded > 0 {
            trace!(forwarded, "flushed pending writes");
        }
        Ok(forwarded)
    }

    /// End of a reconciliation pass: flush, then commit the host
    pub fn commit(&mut self) -> Result<()> {
        self.flush()?;
        self.host.commit()
    }

    /// Detach `el`, destroy its backing subtree and free the shadow subtree
    pub fn unmount(&mut self, el: ElementId) -> Result<()> {
        if el == self.root {
            return Err(ReconcileError::NotAChildElement {
                parent: self.root,
                child: el,
            });
        }
        let parent = self.get(el)?.parent;
        if let Some(parent) = parent {
            self.remove_child(parent, el)?;
        }
        let node = self.get(el)?.node;
        if let Some(node) = node {
            self.host.destroy(node)?;
        }
        self.release(el);
        Ok(())
    }

    /// Shadow children in order
    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        std::iter::successors(self.element(el).and_then(|e| e.first_child), |&child| {
            self.element(child).and_then(|e| e.next_sibling)
        })
        .collect()
    }

    pub fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.element(el)?.parent
    }

    /// Backing retained node, once materialized
    pub fn node(&self, el: ElementId) -> Option<NodeId> {
        self.element(el)?.node
    }

    /// Pending (not necessarily flushed) bag
    pub fn props(&self, el: ElementId) -> Option<&Props> {
        self.element(el).map(|e| &e.props)
    }

    fn alloc(&mut self, element: PendingElement) -> ElementId {
        match self.free_list.pop() {
            Some(index) => {
                self.elements[index as usize] = Some(element);
                ElementId(index)
            }
            None => {
                self.elements.push(Some(element));
                ElementId(self.elements.len() as u32 - 1)
            }
        }
    }

    /// Backing node of `el`, created from the current bag on first use
    fn materialize(&mut self, el: ElementId) -> Result<NodeId> {
        let element = self.get(el)?;
        if let Some(node) = element.node {
            return Ok(node);
        }

        let (tag, props) = (element.tag.clone(), element.props.clone());
        let node = self.host.create_node(&tag, props)?;
        self.element_mut(el)?.node = Some(node);
        Ok(node)
    }

    fn release(&mut self, el: ElementId) {
        for child in self.children(el) {
            self.release(child);
        }
        if let Some(slot) = self.elements.get_mut(el.index()) {
            if slot.take().is_some() {
                self.free_list.push(el.0);
            }
        }
        self.pending.retain(|&queued| queued != el);
    }
}
