//! Test doubles shared by unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crescendo_common::hal::driver::{AimPlanner, MechanismIo};
use crescendo_common::hal::types::AimSolution;

/// Mechanism IO with scripted feedback and recorded commands.
pub(crate) struct MockIo<F, C> {
    inner: Rc<RefCell<MockState<F, C>>>,
}

pub(crate) struct MockState<F, C> {
    pub feedback: Option<F>,
    pub writes: Vec<C>,
}

impl<F, C> Clone for MockIo<F, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<F: Copy, C: Copy> MockIo<F, C> {
    pub fn new(feedback: F) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MockState {
                feedback: Some(feedback),
                writes: Vec::new(),
            })),
        }
    }

    pub fn set(&self, feedback: F) {
        self.inner.borrow_mut().feedback = Some(feedback);
    }

    pub fn go_stale(&self) {
        self.inner.borrow_mut().feedback = None;
    }

    pub fn last(&self) -> Option<C> {
        self.inner.borrow().writes.last().copied()
    }

    pub fn writes(&self) -> usize {
        self.inner.borrow().writes.len()
    }

    /// Every command written so far, oldest first.
    pub fn history(&self) -> Vec<C> {
        self.inner.borrow().writes.clone()
    }
}

impl<F: Copy, C: Copy> MechanismIo for MockIo<F, C> {
    type Feedback = F;
    type Command = C;

    fn read(&mut self) -> Option<F> {
        self.inner.borrow().feedback
    }

    fn write(&mut self, command: &C) {
        self.inner.borrow_mut().writes.push(*command);
    }
}

/// Planner returning whatever the test stored.
#[derive(Default)]
pub(crate) struct MockPlanner {
    pub solution: Cell<Option<AimSolution>>,
}

impl MockPlanner {
    pub fn with(solution: AimSolution) -> Rc<Self> {
        Rc::new(Self {
            solution: Cell::new(Some(solution)),
        })
    }
}

impl AimPlanner for MockPlanner {
    fn solution(&self) -> Option<AimSolution> {
        self.solution.get()
    }
}
