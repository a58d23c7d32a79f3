#![forbid(unsafe_code)]

//! In-memory document.
//!
//! [`HeadlessDocument`] is a tiny element tree with just enough behavior
//! for the engine: simple-selector queries, bounding rectangles, parent
//! containment, focus, and live observer bookkeeping. Handles are shared:
//! cloning the document yields another view of the same tree, so a test can
//! keep one handle while the tour owns another.
//!
//! Supported selectors are single compounds of a tag, `#id`, `.class` and
//! `[attr="value"]` parts, with CSS escapes in identifiers. Anything else
//! (combinators, pseudo-classes) fails to parse and matches nothing.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use orbit_core::event::ElementHandle;
use orbit_core::geometry::{Rect, Size};
use orbit_runtime::host::{Document, FrameId, ScrollBehavior, WatchId};
use orbit_widgets::FocusHost;

/// Description of an element to append.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    rect: Option<Rect>,
    focusable: bool,
    editable: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    /// Reachable with Tab.
    #[must_use]
    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }

    /// Accepts text input. Editable elements are focusable.
    #[must_use]
    pub fn editable(mut self) -> Self {
        self.editable = true;
        self.focusable = true;
        self
    }
}

#[derive(Debug)]
struct Node {
    element: Element,
    parent: Option<ElementHandle>,
    attached: bool,
}

#[derive(Debug, Default)]
struct DocInner {
    nodes: Vec<Node>,
    viewport: Size,
    reduced_motion: bool,
    language: Option<String>,
    active: Option<ElementHandle>,
    scrolls: Vec<(ElementHandle, ScrollBehavior)>,
    mutation_watches: BTreeSet<WatchId>,
    resize_watches: BTreeSet<WatchId>,
    frames: BTreeSet<FrameId>,
    next_id: u64,
}

impl DocInner {
    fn node(&self, element: ElementHandle) -> Option<&Node> {
        usize::try_from(element.0).ok().and_then(|i| self.nodes.get(i))
    }

    fn node_mut(&mut self, element: ElementHandle) -> Option<&mut Node> {
        usize::try_from(element.0).ok().and_then(|i| self.nodes.get_mut(i))
    }

    fn is_attached(&self, element: ElementHandle) -> bool {
        self.node(element).is_some_and(|n| n.attached)
    }

    fn contains(&self, ancestor: ElementHandle, node: ElementHandle) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    fn handles(&self) -> impl Iterator<Item = ElementHandle> + '_ {
        (0..self.nodes.len()).map(|i| ElementHandle(i as u64))
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared in-memory document.
#[derive(Debug, Clone, Default)]
pub struct HeadlessDocument {
    inner: Rc<RefCell<DocInner>>,
}

impl HeadlessDocument {
    pub fn new(width: f64, height: f64) -> Self {
        let doc = Self::default();
        doc.inner.borrow_mut().viewport = Size::new(width, height);
        doc
    }

    /// Append `element` under `parent` (or at the root).
    pub fn append(&self, parent: Option<ElementHandle>, element: Element) -> ElementHandle {
        let mut inner = self.inner.borrow_mut();
        let handle = ElementHandle(inner.nodes.len() as u64);
        let attached = parent.is_none_or(|p| inner.is_attached(p));
        inner.nodes.push(Node {
            element,
            parent,
            attached,
        });

        #[cfg(feature = "tracing")]
        tracing::trace!(target: "orbit.web", element = handle.0, "append");

        handle
    }

    /// Detach `element` and its subtree. Handles stay valid but stop
    /// matching queries and lose their rectangles.
    pub fn remove(&self, element: ElementHandle) {
        let mut inner = self.inner.borrow_mut();
        let doomed: Vec<ElementHandle> = inner
            .handles()
            .filter(|h| inner.contains(element, *h))
            .collect();
        for handle in doomed {
            if let Some(node) = inner.node_mut(handle) {
                node.attached = false;
            }
        }
        if inner.active.is_some_and(|a| inner.contains(element, a)) {
            inner.active = None;
        }
    }

    pub fn set_rect(&self, element: ElementHandle, rect: Rect) {
        if let Some(node) = self.inner.borrow_mut().node_mut(element) {
            node.element.rect = Some(rect);
        }
    }

    pub fn set_viewport(&self, width: f64, height: f64) {
        self.inner.borrow_mut().viewport = Size::new(width, height);
    }

    pub fn set_reduced_motion(&self, reduce: bool) {
        self.inner.borrow_mut().reduced_motion = reduce;
    }

    pub fn set_language(&self, tag: impl Into<String>) {
        self.inner.borrow_mut().language = Some(tag.into());
    }

    pub fn focused(&self) -> Option<ElementHandle> {
        self.inner.borrow().active
    }

    /// Scroll requests, oldest first.
    pub fn scrolls(&self) -> Vec<(ElementHandle, ScrollBehavior)> {
        self.inner.borrow().scrolls.clone()
    }

    pub fn live_mutation_watches(&self) -> usize {
        self.inner.borrow().mutation_watches.len()
    }

    pub fn live_resize_watches(&self) -> usize {
        self.inner.borrow().resize_watches.len()
    }

    /// Requested, not yet fired or cancelled, animation frames.
    pub fn pending_frames(&self) -> Vec<FrameId> {
        self.inner.borrow().frames.iter().copied().collect()
    }

    /// Fire the oldest pending frame, removing it from the pending set.
    pub fn take_frame(&self) -> Option<FrameId> {
        self.inner.borrow_mut().frames.pop_first()
    }
}

impl FocusHost for HeadlessDocument {
    fn active_element(&self) -> Option<ElementHandle> {
        self.inner.borrow().active
    }

    fn focus(&mut self, element: ElementHandle) {
        let mut inner = self.inner.borrow_mut();
        if inner.is_attached(element) {
            inner.active = Some(element);
        }
    }

    fn focusable_within(&self, container: ElementHandle) -> Vec<ElementHandle> {
        let inner = self.inner.borrow();
        inner
            .handles()
            .filter(|h| *h != container && inner.contains(container, *h))
            .filter(|h| inner.node(*h).is_some_and(|n| n.attached && n.element.focusable))
            .collect()
    }

    fn contains(&self, ancestor: ElementHandle, node: ElementHandle) -> bool {
        self.inner.borrow().contains(ancestor, node)
    }
}

impl Document for HeadlessDocument {
    fn query_selector(&self, selector: &str) -> Option<ElementHandle> {
        let compound = Compound::parse(selector)?;
        let inner = self.inner.borrow();
        inner.handles().find(|h| {
            inner
                .node(*h)
                .is_some_and(|n| n.attached && compound.matches(&n.element))
        })
    }

    fn bounding_rect(&self, element: ElementHandle) -> Option<Rect> {
        let inner = self.inner.borrow();
        inner
            .node(element)
            .filter(|n| n.attached)
            .and_then(|n| n.element.rect)
    }

    fn viewport(&self) -> Size {
        self.inner.borrow().viewport
    }

    /// Records the request and moves the element to the vertical center.
    fn scroll_into_view(&mut self, element: ElementHandle, behavior: ScrollBehavior) {
        let mut inner = self.inner.borrow_mut();
        inner.scrolls.push((element, behavior));
        let viewport = inner.viewport;
        if let Some(rect) = inner.node_mut(element).and_then(|n| n.element.rect.as_mut()) {
            rect.y = ((viewport.height - rect.height) / 2.0).max(0.0);
        }
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.inner.borrow().reduced_motion
    }

    fn is_editable(&self, element: ElementHandle) -> bool {
        self.inner
            .borrow()
            .node(element)
            .is_some_and(|n| n.element.editable)
    }

    fn language(&self) -> Option<String> {
        self.inner.borrow().language.clone()
    }

    fn observe_mutations(&mut self) -> WatchId {
        let mut inner = self.inner.borrow_mut();
        let id = WatchId(inner.next_id());
        inner.mutation_watches.insert(id);
        id
    }

    fn disconnect_mutations(&mut self, id: WatchId) {
        self.inner.borrow_mut().mutation_watches.remove(&id);
    }

    fn observe_resize(&mut self, _element: ElementHandle) -> WatchId {
        let mut inner = self.inner.borrow_mut();
        let id = WatchId(inner.next_id());
        inner.resize_watches.insert(id);
        id
    }

    fn unobserve_resize(&mut self, id: WatchId) {
        self.inner.borrow_mut().resize_watches.remove(&id);
    }

    fn request_animation_frame(&mut self) -> FrameId {
        let mut inner = self.inner.borrow_mut();
        let id = FrameId(inner.next_id());
        inner.frames.insert(id);
        id
    }

    fn cancel_animation_frame(&mut self, id: FrameId) {
        self.inner.borrow_mut().frames.remove(&id);
    }
}

/// One simple-selector compound.
#[derive(Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
}

impl Compound {
    fn parse(selector: &str) -> Option<Self> {
        let chars: Vec<char> = selector.trim().chars().collect();
        if chars.is_empty() {
            return None;
        }
        let mut out = Self::default();
        let mut i = 0;
        if chars[0].is_ascii_alphabetic() {
            let tag = read_ident(&chars, &mut i)?;
            out.tag = Some(tag.to_ascii_lowercase());
        }
        while i < chars.len() {
            match chars[i] {
                '#' => {
                    i += 1;
                    out.id = Some(read_ident(&chars, &mut i)?);
                }
                '.' => {
                    i += 1;
                    out.classes.push(read_ident(&chars, &mut i)?);
                }
                '[' => {
                    i += 1;
                    out.attrs.push(read_attr(&chars, &mut i)?);
                }
                _ => return None,
            }
        }
        Some(out)
    }

    fn matches(&self, element: &Element) -> bool {
        self.tag.as_ref().is_none_or(|t| element.tag.eq_ignore_ascii_case(t))
            && self.id.as_ref().is_none_or(|id| element.id.as_ref() == Some(id))
            && self.classes.iter().all(|c| element.classes.contains(c))
            && self
                .attrs
                .iter()
                .all(|(name, value)| element.attrs.iter().any(|(n, v)| n == name && v == value))
    }
}

/// Read an identifier, decoding CSS escapes.
fn read_ident(chars: &[char], i: &mut usize) -> Option<String> {
    let mut out = String::new();
    while *i < chars.len() {
        let c = chars[*i];
        if c == '\\' {
            *i += 1;
            let start = *i;
            while *i < chars.len() && *i - start < 6 && chars[*i].is_ascii_hexdigit() {
                *i += 1;
            }
            if *i > start {
                let hex: String = chars[start..*i].iter().collect();
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                if chars.get(*i) == Some(&' ') {
                    *i += 1;
                }
            } else {
                out.push(*chars.get(*i)?);
                *i += 1;
            }
        } else if c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() {
            out.push(c);
            *i += 1;
        } else {
            break;
        }
    }
    (!out.is_empty()).then_some(out)
}

/// Read `name="value"]` (the opening bracket already consumed).
fn read_attr(chars: &[char], i: &mut usize) -> Option<(String, String)> {
    let name = read_ident(chars, i)?;
    if chars.get(*i) != Some(&'=') {
        return None;
    }
    *i += 1;
    let quote = *chars.get(*i)?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    *i += 1;
    let mut value = String::new();
    loop {
        let c = *chars.get(*i)?;
        *i += 1;
        match c {
            '\\' => {
                value.push(*chars.get(*i)?);
                *i += 1;
            }
            c if c == quote => break,
            c => value.push(c),
        }
    }
    if chars.get(*i) != Some(&']') {
        return None;
    }
    *i += 1;
    Some((name, value))
}
