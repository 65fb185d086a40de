//! Last-writer-wins values guarded by generation tickets.
//!
//! Every fetch takes a [`Ticket`] before it starts. Its result is committed
//! only when no fetch that started later has been committed already, so a
//! slow stale response cannot overwrite a newer one.

use std::sync::{
  PoisonError, RwLock,
  atomic::{AtomicU64, Ordering},
};

use crate::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

pub struct Snapshot<T> {
  issued: AtomicU64,
  state: RwLock<(u64, Arc<T>)>,
}

impl<T> Snapshot<T> {
  pub fn new(initial: T) -> Self {
    Self { issued: AtomicU64::new(0), state: RwLock::new((0, Arc::new(initial))) }
  }

  pub fn ticket(&self) -> Ticket {
    Ticket(self.issued.fetch_add(1, Ordering::Relaxed) + 1)
  }

  /// Store `value` unless a newer ticket was committed. Returns whether the
  /// value was stored.
  pub fn commit(&self, ticket: Ticket, value: T) -> bool {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    if ticket.0 <= state.0 {
      return false;
    }
    *state = (ticket.0, Arc::new(value));
    true
  }

  pub fn get(&self) -> Arc<T> {
    self.state.read().unwrap_or_else(PoisonError::into_inner).1.clone()
  }
}
