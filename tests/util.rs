#![allow(dead_code)]
use pi_sieve::algs::communicator::{Communicator, Received, Tag};
use pi_sieve::pi_error::PiError;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// Communicator fed from a fixed script of incoming messages.
///
/// Records every send and counts receives; a receive past the end of the
/// script fails instead of blocking.
pub struct ScriptedComm {
    rank: usize,
    size: usize,
    inbox: RefCell<VecDeque<Received>>,
    pub sent: RefCell<Vec<(f64, usize, Tag)>>,
    pub receives: Cell<usize>,
}

impl ScriptedComm {
    pub fn new(rank: usize, size: usize, inbox: impl IntoIterator<Item = Received>) -> Self {
        Self {
            rank,
            size,
            inbox: RefCell::new(inbox.into_iter().collect()),
            sent: RefCell::new(Vec::new()),
            receives: Cell::new(0),
        }
    }

    pub fn remaining(&self) -> usize {
        self.inbox.borrow().len()
    }
}

impl Communicator for ScriptedComm {
    fn rank(&self) -> usize {
        self.rank
    }
    fn size(&self) -> usize {
        self.size
    }
    fn send_synchronous(&self, value: f64, dest: usize, tag: Tag) -> Result<(), PiError> {
        self.sent.borrow_mut().push((value, dest, tag));
        Ok(())
    }
    fn receive_from_any(&self, _tag: Tag) -> Result<Received, PiError> {
        self.receives.set(self.receives.get() + 1);
        self.inbox
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| PiError::Transport("script exhausted".into()))
    }
}

/// Wraps another communicator and counts the messages it moves.
pub struct CountingComm<'a, C: Communicator> {
    inner: &'a C,
    pub sends: Cell<usize>,
    pub receives: Cell<usize>,
}

impl<'a, C: Communicator> CountingComm<'a, C> {
    pub fn new(inner: &'a C) -> Self {
        Self {
            inner,
            sends: Cell::new(0),
            receives: Cell::new(0),
        }
    }
}

impl<C: Communicator> Communicator for CountingComm<'_, C> {
    fn rank(&self) -> usize {
        self.inner.rank()
    }
    fn size(&self) -> usize {
        self.inner.size()
    }
    fn send_synchronous(&self, value: f64, dest: usize, tag: Tag) -> Result<(), PiError> {
        self.sends.set(self.sends.get() + 1);
        self.inner.send_synchronous(value, dest, tag)
    }
    fn receive_from_any(&self, tag: Tag) -> Result<Received, PiError> {
        self.receives.set(self.receives.get() + 1);
        self.inner.receive_from_any(tag)
    }
}

pub fn msg(value: f64, source: usize) -> Received {
    Received { value, source }
}

pub fn assert_close(got: f64, want: f64, tol: f64) {
    assert!(
        (got - want).abs() <= tol,
        "got {got}, want {want} (tolerance {tol})"
    );
}
