//! Property tests for the resolver registry

use async_runtime::{RegistryError, Resolver, ResolverRegistry};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Register,
    Resolve(usize),
    Reject(usize),
    RejectAll,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Register),
        2 => (0usize..64).prop_map(Op::Resolve),
        2 => (0usize..64).prop_map(Op::Reject),
        1 => Just(Op::RejectAll),
    ]
}

proptest! {
    #[test]
    fn pending_ids_are_pairwise_distinct(count in 1usize..200) {
        let registry: ResolverRegistry<(), ()> = ResolverRegistry::new();
        let ids: HashSet<_> = (0..count)
            .map(|_| registry.register(Resolver::new(|_| {}, |_| {})))
            .collect();
        prop_assert_eq!(ids.len(), count);
        prop_assert_eq!(registry.len(), count);
    }

    #[test]
    fn every_registered_request_settles_at_most_once(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let registry: ResolverRegistry<(), ()> = ResolverRegistry::new();
        let mut issued = Vec::new();
        let mut counters: Vec<Arc<AtomicUsize>> = Vec::new();

        for op in ops {
            match op {
                Op::Register => {
                    let fired = Arc::new(AtomicUsize::new(0));
                    let ok = fired.clone();
                    let err = fired.clone();
                    let id = registry.register(Resolver::new(
                        move |_| { ok.fetch_add(1, Ordering::SeqCst); },
                        move |_| { err.fetch_add(1, Ordering::SeqCst); },
                    ));
                    prop_assert!(!issued.contains(&id));
                    issued.push(id);
                    counters.push(fired);
                }
                Op::Resolve(i) | Op::Reject(i) if !issued.is_empty() => {
                    let idx = i % issued.len();
                    let id = issued[idx];
                    let was_pending = registry.contains(id);
                    let result = if matches!(op, Op::Resolve(_)) {
                        registry.resolve(id, ())
                    } else {
                        registry.reject(id, ())
                    };
                    if was_pending {
                        prop_assert!(result.is_ok());
                    } else {
                        prop_assert_eq!(result, Err(RegistryError::NotFound(id)));
                    }
                }
                Op::Resolve(_) | Op::Reject(_) => {}
                Op::RejectAll => {
                    let before = registry.len();
                    prop_assert_eq!(registry.reject_all(()), before);
                    prop_assert!(registry.is_empty());
                }
            }
        }

        let pending = registry.len();
        let settled = counters
            .iter()
            .filter(|c| c.load(Ordering::SeqCst) == 1)
            .count();
        prop_assert!(counters.iter().all(|c| c.load(Ordering::SeqCst) <= 1));
        prop_assert_eq!(settled + pending, issued.len());
    }
}
