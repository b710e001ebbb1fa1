use stockroom_core::{DocumentId, DomainResult};
use stockroom_store::{DocumentStore, collections};

/// Sequence numbers start above this value; the first issued number is 1001.
const SEQUENCE_START: i64 = 1000;

/// A named, strictly increasing order-number sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    PoNumber,
    SoNumber,
}

impl Sequence {
    /// Id of the backing counter document in the `counters` collection.
    pub fn counter_id(self) -> DocumentId {
        DocumentId::from(match self {
            Sequence::PoNumber => "poNumber",
            Sequence::SoNumber => "soNumber",
        })
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Sequence::PoNumber => "PO",
            Sequence::SoNumber => "SO",
        }
    }
}

/// Issues human-readable order numbers (`PO-1001`, `SO-1001`).
///
/// Each allocation is a single atomic read-increment-write against the
/// counter document, so concurrent callers never receive the same number.
/// Numbers are never reused: a commit that fails after allocation leaves a
/// gap, which is accepted.
#[derive(Debug, Clone)]
pub struct SequenceCounter<S> {
    store: S,
}

impl<S> SequenceCounter<S>
where
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Allocate and format the next number of `sequence`.
    pub async fn next(&self, sequence: Sequence) -> DomainResult<String> {
        let number = self
            .store
            .fetch_increment(
                collections::COUNTERS,
                &sequence.counter_id(),
                "lastNumber",
                SEQUENCE_START,
            )
            .await?;
        Ok(format!("{}-{}", sequence.prefix(), number))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use stockroom_store::InMemoryDocumentStore;

    use super::*;

    #[tokio::test]
    async fn first_allocation_starts_above_the_seed() {
        let counter = SequenceCounter::new(Arc::new(InMemoryDocumentStore::new()));
        assert_eq!(counter.next(Sequence::PoNumber).await.unwrap(), "PO-1001");
        assert_eq!(counter.next(Sequence::PoNumber).await.unwrap(), "PO-1002");
    }

    #[tokio::test]
    async fn sequences_are_independent() {
        let counter = SequenceCounter::new(Arc::new(InMemoryDocumentStore::new()));
        assert_eq!(counter.next(Sequence::PoNumber).await.unwrap(), "PO-1001");
        assert_eq!(counter.next(Sequence::SoNumber).await.unwrap(), "SO-1001");
        assert_eq!(counter.next(Sequence::PoNumber).await.unwrap(), "PO-1002");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_allocations_never_collide() {
        let counter = SequenceCounter::new(Arc::new(InMemoryDocumentStore::new()));

        let mut tasks = Vec::new();
        for _ in 0..64 {
            let counter = counter.clone();
            tasks.push(tokio::spawn(async move {
                counter.next(Sequence::SoNumber).await.unwrap()
            }));
        }

        let mut seen = HashSet::new();
        for task in tasks {
            let number = task.await.unwrap();
            assert!(seen.insert(number.clone()), "duplicate number {number}");
        }

        let mut numbers: Vec<i64> = seen
            .iter()
            .map(|n| n.trim_start_matches("SO-").parse().unwrap())
            .collect();
        numbers.sort_unstable();
        let expected: Vec<i64> = (1001..=1064).collect();
        assert_eq!(numbers, expected);
    }
}
