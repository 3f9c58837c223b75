//! Per-thread stack of woven method calls in progress

use crate::reflection::ClassReflection;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;

/// One woven method call on the current thread
#[derive(Debug, Clone)]
pub struct Frame {
    pub class: Arc<ClassReflection>,
    pub method: String,
}

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Pops its frame when dropped
#[must_use = "the frame is popped as soon as the guard is dropped"]
pub struct FrameGuard {
    _thread_bound: PhantomData<Rc<()>>,
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            frames.borrow_mut().pop();
        });
    }
}

/// Record entry into `class::method` until the guard is dropped
pub fn enter(class: Arc<ClassReflection>, method: impl Into<String>) -> FrameGuard {
    let frame = Frame {
        class,
        method: method.into(),
    };
    FRAMES.with(|frames| frames.borrow_mut().push(frame));
    FrameGuard {
        _thread_bound: PhantomData,
    }
}

/// Frames on this thread, nearest first
///
/// `skip_current` drops the innermost frame, for callers that are themselves
/// a woven method call and so pushed it.
pub fn enclosing(skip_current: bool) -> Vec<Frame> {
    let skip = usize::from(skip_current);
    FRAMES.with(|frames| frames.borrow().iter().rev().skip(skip).cloned().collect())
}

pub fn depth() -> usize {
    FRAMES.with(|frames| frames.borrow().len())
}
