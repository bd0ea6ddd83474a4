//! Undo/Redo queue.
//!
//! Every structural edit is a reversible entry: an [`UndoHandler`] plus the
//! payload it operates on. Entries live on two LIFO stacks; undo pops from
//! one and pushes onto the other, so `undo` followed by `redo` replays the
//! exact same entry.
//!
//! Rapid edits to the same target (typing into a property field, arrow-key
//! nudges) are **merged** into the top entry instead of stacking up: the
//! handler decides through [`UndoHandler::try_merge`] and the queue swaps
//! in the merged payload.

use chrono::{DateTime, Utc};
use hmi_core::Result;
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Outcome of offering an incoming payload to the top entry.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeResult<D> {
    /// The top entry now carries this payload; nothing is pushed.
    Merged(D),
    /// Push the incoming entry as a new step.
    Rejected,
}

/// Timing of the entry being merged into, seen from the incoming edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateInfo {
    pub now: DateTime<Utc>,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl DateInfo {
    /// Was the entry last merged into (or created) within `ms`?
    pub fn is_last_modified_within(&self, ms: i64) -> bool {
        (self.now - self.date_modified).num_milliseconds() <= ms
    }

    /// Was the entry created within `ms`?
    pub fn is_original_creation_within(&self, ms: i64) -> bool {
        (self.now - self.date_added).num_milliseconds() <= ms
    }
}

/// Behaviour of one kind of undoable edit over a context `C`.
///
/// Callbacks get the payload by reference; the only way a pushed payload
/// changes is a successful merge.
pub trait UndoHandler<C> {
    type Data: Clone + fmt::Debug + 'static;

    /// Human-readable name of the step, e.g. for an "Undo move" menu item.
    fn label(&self, data: &Self::Data) -> String;

    /// Runs once before the first execution. Handlers capture the state
    /// they will need to undo (old values, indices) here.
    fn initialize(&self, _ctx: &C, _data: &mut Self::Data) -> Result<()> {
        Ok(())
    }

    fn execute(&self, ctx: &mut C, data: &Self::Data) -> Result<()> {
        self.redo(ctx, data)
    }

    fn undo(&self, ctx: &mut C, data: &Self::Data) -> Result<()>;

    fn redo(&self, ctx: &mut C, data: &Self::Data) -> Result<()>;

    fn try_merge(
        &self,
        _existing: &Self::Data,
        _incoming: &Self::Data,
        _dates: &DateInfo,
    ) -> MergeResult<Self::Data> {
        MergeResult::Rejected
    }
}

/// Name shared by every entry a [`CommandCreator`] produces. Only entries
/// with the same handler id are offered for merging.
pub type HandlerId = &'static str;

/// A handler registered under an id. Owned by whoever issues the edits.
pub struct CommandCreator<H> {
    id: HandlerId,
    handler: Rc<H>,
}

impl<H> CommandCreator<H> {
    pub fn new(id: HandlerId, handler: H) -> Self {
        Self {
            id,
            handler: Rc::new(handler),
        }
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

impl<H> Clone for CommandCreator<H> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            handler: Rc::clone(&self.handler),
        }
    }
}

impl<H> fmt::Debug for CommandCreator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CommandCreator").field(&self.id).finish()
    }
}

/// Stable identity of an entry across undo/redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// Type-erased handler + payload.
trait EntryBody<C> {
    fn undo(&self, ctx: &mut C) -> Result<()>;
    fn redo(&self, ctx: &mut C) -> Result<()>;
    fn label(&self) -> String;
    fn data_mut(&mut self) -> &mut dyn Any;
}

struct Body<C, H: UndoHandler<C>> {
    handler: Rc<H>,
    data: H::Data,
    _ctx: PhantomData<fn(&mut C)>,
}

impl<C, H: UndoHandler<C>> EntryBody<C> for Body<C, H> {
    fn undo(&self, ctx: &mut C) -> Result<()> {
        self.handler.undo(ctx, &self.data)
    }

    fn redo(&self, ctx: &mut C) -> Result<()> {
        self.handler.redo(ctx, &self.data)
    }

    fn label(&self) -> String {
        self.handler.label(&self.data)
    }

    fn data_mut(&mut self) -> &mut dyn Any {
        &mut self.data
    }
}

struct UndoEntry<C> {
    id: EntryId,
    handler_id: HandlerId,
    date_added: DateTime<Utc>,
    date_modified: DateTime<Utc>,
    body: Box<dyn EntryBody<C>>,
}

/// What `add` did with an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Added {
    Pushed(EntryId),
    /// Folded into the existing top entry.
    Merged(EntryId),
}

impl Added {
    pub fn entry_id(self) -> EntryId {
        match self {
            Added::Pushed(id) | Added::Merged(id) => id,
        }
    }
}

pub struct UndoRedoQueue<C> {
    undo_stack: VecDeque<UndoEntry<C>>,
    redo_stack: Vec<UndoEntry<C>>,
    /// Maximum undo depth.
    max_depth: usize,
    next_id: u64,
}

impl<C> fmt::Debug for UndoRedoQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoRedoQueue")
            .field("undo", &self.undo_ids())
            .field("redo", &self.redo_ids())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl<C: 'static> UndoRedoQueue<C> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            next_id: 0,
        }
    }

    /// Execute an edit now and record it.
    pub fn add<H>(&mut self, ctx: &mut C, creator: &CommandCreator<H>, data: H::Data) -> Result<Added>
    where
        H: UndoHandler<C> + 'static,
    {
        self.add_at(ctx, creator, data, Utc::now())
    }

    /// [`add`](Self::add) with an explicit timestamp.
    pub fn add_at<H>(
        &mut self,
        ctx: &mut C,
        creator: &CommandCreator<H>,
        mut data: H::Data,
        now: DateTime<Utc>,
    ) -> Result<Added>
    where
        H: UndoHandler<C> + 'static,
    {
        let handler = &creator.handler;
        handler.initialize(ctx, &mut data)?;
        handler.execute(ctx, &data)?;
        self.redo_stack.clear();

        if let Some(top) = self.undo_stack.back_mut().filter(|e| e.handler_id == creator.id) {
            let dates = DateInfo {
                now,
                date_added: top.date_added,
                date_modified: top.date_modified,
            };
            if let Some(existing) = top.body.data_mut().downcast_mut::<H::Data>()
                && let MergeResult::Merged(merged) = handler.try_merge(existing, &data, &dates)
            {
                *existing = merged;
                top.date_modified = now;
                log::debug!("merged {} into {:?}", creator.id, top.id);
                return Ok(Added::Merged(top.id));
            }
        }

        let id = EntryId(self.next_id);
        self.next_id += 1;
        log::debug!("push {} as {id:?}", creator.id);
        self.undo_stack.push_back(UndoEntry {
            id,
            handler_id: creator.id,
            date_added: now,
            date_modified: now,
            body: Box::new(Body {
                handler: Rc::clone(handler),
                data,
                _ctx: PhantomData,
            }),
        });
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        Ok(Added::Pushed(id))
    }

    /// Undo the last step. Returns its label, or `None` if there was
    /// nothing to undo. A failing step stays on the undo stack.
    pub fn undo(&mut self, ctx: &mut C) -> Result<Option<String>> {
        let Some(entry) = self.undo_stack.back() else {
            return Ok(None);
        };
        entry.body.undo(ctx)?;
        let label = entry.body.label();
        log::debug!("undo {:?} ({label})", entry.id);
        if let Some(entry) = self.undo_stack.pop_back() {
            self.redo_stack.push(entry);
        }
        Ok(Some(label))
    }

    /// Redo the last undone step.
    pub fn redo(&mut self, ctx: &mut C) -> Result<Option<String>> {
        let Some(entry) = self.redo_stack.last() else {
            return Ok(None);
        };
        entry.body.redo(ctx)?;
        let label = entry.body.label();
        log::debug!("redo {:?} ({label})", entry.id);
        if let Some(entry) = self.redo_stack.pop() {
            self.undo_stack.push_back(entry);
        }
        Ok(Some(label))
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the step `undo` would revert.
    pub fn undo_label(&self) -> Option<String> {
        self.undo_stack.back().map(|e| e.body.label())
    }

    pub fn redo_label(&self) -> Option<String> {
        self.redo_stack.last().map(|e| e.body.label())
    }
}

impl<C> UndoRedoQueue<C> {
    /// Undo stack ids, oldest first.
    pub fn undo_ids(&self) -> Vec<EntryId> {
        self.undo_stack.iter().map(|e| e.id).collect()
    }

    /// Redo stack ids, bottom first (the next redo is last).
    pub fn redo_ids(&self) -> Vec<EntryId> {
        self.redo_stack.iter().map(|e| e.id).collect()
    }
}
