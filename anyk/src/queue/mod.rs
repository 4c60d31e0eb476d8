//! Priority queues over candidates keyed by cost.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::config::QueueKind;
use crate::cost::Cost;

mod pairing;

pub(crate) use pairing::PairingHeap;

/// A queue entry. Equal keys are served in insertion order.
#[derive(Debug)]
pub(crate) struct Ranked<T> {
    key: Cost,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-queue of candidates.
pub(crate) enum CandidateQueue<T> {
    Binary {
        heap: BinaryHeap<Reverse<Ranked<T>>>,
        seq: u64,
    },
    Pairing {
        heap: PairingHeap<Ranked<T>>,
        seq: u64,
    },
}

impl<T> CandidateQueue<T> {
    pub fn new(kind: QueueKind) -> Self {
        match kind {
            QueueKind::Binary => CandidateQueue::Binary {
                heap: BinaryHeap::new(),
                seq: 0,
            },
            QueueKind::Pairing => CandidateQueue::Pairing {
                heap: PairingHeap::new(),
                seq: 0,
            },
        }
    }

    pub fn push(&mut self, key: Cost, item: T) {
        match self {
            CandidateQueue::Binary { heap, seq } => {
                *seq += 1;
                heap.push(Reverse(Ranked {
                    key,
                    seq: *seq,
                    item,
                }));
            }
            CandidateQueue::Pairing { heap, seq } => {
                *seq += 1;
                heap.push(Ranked {
                    key,
                    seq: *seq,
                    item,
                });
            }
        }
    }

    pub fn pop(&mut self) -> Option<T> {
        match self {
            CandidateQueue::Binary { heap, .. } => heap.pop().map(|Reverse(r)| r.item),
            CandidateQueue::Pairing { heap, .. } => heap.pop().map(|r| r.item),
        }
    }

    pub fn peek(&self) -> Option<&T> {
        match self {
            CandidateQueue::Binary { heap, .. } => heap.peek().map(|Reverse(r)| &r.item),
            CandidateQueue::Pairing { heap, .. } => heap.peek().map(|r| &r.item),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CandidateQueue::Binary { heap, .. } => heap.len(),
            CandidateQueue::Pairing { heap, .. } => heap.len(),
        }
    }
}
