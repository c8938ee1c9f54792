//! Concurrent all-settle fan-out
//!
//! Runs one operation per input item on the current task and collects every
//! outcome. A failing item never cancels its siblings, and outcomes come back
//! in input order regardless of which call finished first.

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run `op` over `items` with at most `concurrency` calls in flight
///
/// The returned vector has exactly one entry per input item, in input order.
/// A `concurrency` of zero is treated as one.
pub async fn fan_out<I, F, Fut, T, E>(items: I, concurrency: usize, op: F) -> Vec<Result<T, E>>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    stream::iter(items)
        .map(op)
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Count successes and failures in a settled fan-out
pub fn settled_counts<T, E>(results: &[Result<T, E>]) -> (usize, usize) {
    let ok = results.iter().filter(|r| r.is_ok()).count();
    (ok, results.len() - ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_order_follows_input_not_completion() {
        // Later items finish first
        let delays = [50u64, 40, 30, 20, 10];
        let results: Vec<Result<usize, String>> = fan_out(
            delays.iter().enumerate(),
            delays.len(),
            |(i, delay)| async move {
                tokio::time::sleep(Duration::from_millis(*delay)).await;
                Ok(i)
            },
        )
        .await;

        let order: Vec<usize> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_abort_others() {
        let results = fan_out(1..=5, 16, |n| async move {
            if n == 3 {
                Err(format!("item {n} failed"))
            } else {
                Ok(n * 10)
            }
        })
        .await;

        assert_eq!(results.len(), 5);
        assert_eq!(settled_counts(&results), (4, 1));
        assert_eq!(results[2], Err("item 3 failed".to_string()));
        assert_eq!(results[4], Ok(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_ceiling_is_respected() {
        let in_flight = &AtomicUsize::new(0);
        let peak = &AtomicUsize::new(0);

        let results: Vec<Result<(), ()>> = fan_out(0..20, 4, move |_| async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        })
        .await;

        assert_eq!(results.len(), 20);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_empty_input_and_zero_concurrency() {
        let empty: Vec<Result<u8, ()>> = fan_out(Vec::<u8>::new(), 8, |n| async move { Ok(n) }).await;
        assert!(empty.is_empty());

        let results: Vec<Result<u8, ()>> = fan_out(vec![1u8, 2], 0, |n| async move { Ok(n) }).await;
        assert_eq!(results, vec![Ok(1), Ok(2)]);
    }
}
