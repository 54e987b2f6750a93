//! Detection of tensor bodies that outlive the computation that allocated them.
//!
//! A [`LeakTracker`] is installed on the current thread by a [`LeakDetectionScope`]. While
//! the scope is alive every tensor body created on the thread is recorded (weakly) by
//! all installed trackers. After the scope ends, any recorded body that is still alive is
//! a leak: something (usually graph bookkeeping) kept a strong reference past the check.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::{Arc, RwLock, Weak};

use crate::autograd::GraphId;
use crate::tensor_data::TensorData;
use crate::types::DType;

thread_local! {
    static ACTIVE_TRACKERS: RefCell<Vec<LeakTracker>> = const { RefCell::new(Vec::new()) };
}

/// Records every body allocated on this thread with the installed trackers.
pub(crate) fn track_allocation(body: &Arc<RwLock<TensorData>>) {
    ACTIVE_TRACKERS.with(|trackers| {
        for tracker in trackers.borrow().iter() {
            tracker.bodies.borrow_mut().push(Arc::downgrade(body));
        }
    });
}

/// Registry of the tensor bodies allocated while the tracker was installed.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct LeakTracker {
    bodies: Rc<RefCell<Vec<Weak<RwLock<TensorData>>>>>,
}

/// Description of a body that is still alive, for leak reports.
#[derive(Debug, Clone, PartialEq)]
pub struct AliveBody {
    pub shape: Vec<usize>,
    pub dtype: DType,
    pub graph_ids: Vec<GraphId>,
    pub strong_count: usize,
}

impl fmt::Display for AliveBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graphs: Vec<String> = self.graph_ids.iter().map(|g| g.to_string()).collect();
        write!(
            f,
            "TensorBody(shape={:?}, dtype={}, graphs=[{}], refs={})",
            self.shape,
            self.dtype,
            graphs.join(", "),
            self.strong_count
        )
    }
}

impl LeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bodies recorded so far.
    pub fn tracked_count(&self) -> usize {
        self.bodies.borrow().len()
    }

    /// Number of recorded bodies that are still alive.
    pub fn alive_count(&self) -> usize {
        self.bodies
            .borrow()
            .iter()
            .filter(|body| body.strong_count() > 0)
            .count()
    }

    pub fn is_all_freed(&self) -> bool {
        self.alive_count() == 0
    }

    /// Describes every recorded body that is still alive.
    pub fn alive_bodies(&self) -> Vec<AliveBody> {
        self.bodies
            .borrow()
            .iter()
            .filter_map(|weak| {
                let body = weak.upgrade()?;
                // The upgrade above holds one extra reference.
                let strong_count = Arc::strong_count(&body) - 1;
                let described = match body.try_read() {
                    Ok(guard) => AliveBody {
                        shape: guard.shape.clone(),
                        dtype: guard.dtype,
                        graph_ids: guard.graph_ids(),
                        strong_count,
                    },
                    Err(_) => {
                        log::warn!("leak report: body is locked, reporting without metadata");
                        AliveBody {
                            shape: Vec::new(),
                            dtype: DType::F64,
                            graph_ids: Vec::new(),
                            strong_count,
                        }
                    }
                };
                Some(described)
            })
            .collect()
    }

    /// Renders a report of the surviving bodies, or `None` when every body was freed.
    pub fn leak_report(&self) -> Option<String> {
        let alive = self.alive_bodies();
        if alive.is_empty() {
            return None;
        }
        let mut report = format!(
            "Some tensor bodies are not freed.\nNumber of alive tensor bodies: {} (out of {} allocated)\n",
            alive.len(),
            self.tracked_count()
        );
        for body in &alive {
            report.push_str(&format!("- {}\n", body));
        }
        Some(report)
    }
}

impl fmt::Debug for LeakTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeakTracker")
            .field("tracked", &self.tracked_count())
            .field("alive", &self.alive_count())
            .finish()
    }
}

/// Installs a tracker on the current thread until dropped.
///
/// Dropping the scope (including during unwinding or an early `?` return) uninstalls the
/// tracker; the recorded bodies stay in the tracker for inspection afterwards.
#[must_use = "the scope ends as soon as the guard is dropped"]
pub struct LeakDetectionScope {
    depth: usize,
    _not_send: PhantomData<Rc<()>>,
}

impl LeakDetectionScope {
    pub fn new(tracker: &LeakTracker) -> Self {
        let depth = ACTIVE_TRACKERS.with(|trackers| {
            let mut trackers = trackers.borrow_mut();
            trackers.push(tracker.clone());
            trackers.len()
        });
        log::trace!("leak detection scope entered (depth {})", depth);
        LeakDetectionScope {
            depth,
            _not_send: PhantomData,
        }
    }
}

impl Drop for LeakDetectionScope {
    fn drop(&mut self) {
        ACTIVE_TRACKERS.with(|trackers| {
            let mut trackers = trackers.borrow_mut();
            debug_assert_eq!(trackers.len(), self.depth, "leak detection scopes must nest");
            trackers.pop();
        });
        log::trace!("leak detection scope exited (depth {})", self.depth);
    }
}

#[cfg(test)]
#[path = "leak_detection_test.rs"]
mod tests;
