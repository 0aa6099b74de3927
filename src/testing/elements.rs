//! Mock elements for tests.
//!
//! [`FixedElement`] always wants the same size. [`FnElement`] computes its size
//! from the bound row and the constraint. [`TrackedElement`] wraps either and
//! records every lifecycle call into a shared [`ElementLog`].

use std::cell::RefCell;
use std::rc::Rc;

use crate::element::{BindContext, Element};
use crate::geometry::{Rect, Size};

// ---------------------------------------------------------------------------
// FixedElement
// ---------------------------------------------------------------------------

/// An element with a constant desired size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedElement {
    size: Size,
}

impl FixedElement {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
        }
    }
}

impl Element for FixedElement {
    fn measure(&mut self, _constraint: Size) -> Size {
        self.size
    }
}

// ---------------------------------------------------------------------------
// FnElement
// ---------------------------------------------------------------------------

/// An element whose desired size is `f(bound row, constraint)`.
pub struct FnElement<F> {
    f: F,
    row: Option<usize>,
}

impl<F> FnElement<F>
where
    F: Fn(Option<usize>, Size) -> Size,
{
    pub fn new(f: F) -> Self {
        Self { f, row: None }
    }
}

impl<F> Element for FnElement<F>
where
    F: Fn(Option<usize>, Size) -> Size,
{
    fn initialize(&mut self, ctx: &BindContext) {
        self.row = ctx.row;
    }

    fn cleanup(&mut self, _ctx: &BindContext) {
        self.row = None;
    }

    fn measure(&mut self, constraint: Size) -> Size {
        (self.f)(self.row, constraint)
    }
}

// ---------------------------------------------------------------------------
// ElementLog
// ---------------------------------------------------------------------------

/// A lifecycle call observed on a [`TrackedElement`].
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Created { id: usize },
    Initialized { id: usize, row: Option<usize>, block: Option<usize>, is_current: bool },
    Refreshed { id: usize },
    CleanedUp { id: usize },
    Measured { id: usize, constraint: Size },
    Arranged { id: usize, rect: Rect },
}

impl LifecycleEvent {
    /// The element instance the event belongs to.
    pub fn id(&self) -> usize {
        match self {
            LifecycleEvent::Created { id }
            | LifecycleEvent::Initialized { id, .. }
            | LifecycleEvent::Refreshed { id }
            | LifecycleEvent::CleanedUp { id }
            | LifecycleEvent::Measured { id, .. }
            | LifecycleEvent::Arranged { id, .. } => *id,
        }
    }
}

#[derive(Debug, Default)]
struct LogInner {
    next_id: usize,
    events: Vec<LifecycleEvent>,
}

/// Shared, cloneable event log. Clones append to the same log.
#[derive(Debug, Clone, Default)]
pub struct ElementLog {
    inner: Rc<RefCell<LogInner>>,
}

impl ElementLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self) -> usize {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.events.push(LifecycleEvent::Created { id });
        id
    }

    fn push(&self, event: LifecycleEvent) {
        self.inner.borrow_mut().events.push(event);
    }

    /// A copy of every event so far.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.inner.borrow().events.clone()
    }

    /// Number of events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&LifecycleEvent) -> bool) -> usize {
        self.inner.borrow().events.iter().filter(|e| predicate(e)).count()
    }

    /// Number of element instances ever created.
    pub fn created(&self) -> usize {
        self.inner.borrow().next_id
    }

    /// Drop recorded events, keeping the id counter.
    pub fn clear(&self) {
        self.inner.borrow_mut().events.clear();
    }
}

// ---------------------------------------------------------------------------
// TrackedElement
// ---------------------------------------------------------------------------

/// Wraps an element and logs every call made on it.
pub struct TrackedElement<E> {
    id: usize,
    log: ElementLog,
    inner: E,
}

impl<E: Element> TrackedElement<E> {
    /// Wrap `inner`, logging a `Created` event.
    pub fn new(log: &ElementLog, inner: E) -> Self {
        Self {
            id: log.register(),
            log: log.clone(),
            inner,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl<E: Element> Element for TrackedElement<E> {
    fn initialize(&mut self, ctx: &BindContext) {
        self.log.push(LifecycleEvent::Initialized {
            id: self.id,
            row: ctx.row,
            block: ctx.block,
            is_current: ctx.is_current,
        });
        self.inner.initialize(ctx);
    }

    fn refresh(&mut self, ctx: &BindContext) {
        self.log.push(LifecycleEvent::Refreshed { id: self.id });
        self.inner.refresh(ctx);
    }

    fn cleanup(&mut self, ctx: &BindContext) {
        self.log.push(LifecycleEvent::CleanedUp { id: self.id });
        self.inner.cleanup(ctx);
    }

    fn measure(&mut self, constraint: Size) -> Size {
        self.log.push(LifecycleEvent::Measured { id: self.id, constraint });
        self.inner.measure(constraint)
    }

    fn arrange(&mut self, rect: Rect) {
        self.log.push(LifecycleEvent::Arranged { id: self.id, rect });
        self.inner.arrange(rect);
    }
}
