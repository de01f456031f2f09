//! Batching engine behavior under concurrent load

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use llm_batch::{BatchAdapter, BatchConfig, BatchEngine, ChatOptions, QueueKey};
    use tokio::time::Instant;

    use crate::common::assertions::{ChatResponseAssertions, assert_item_error_contains};
    use crate::common::{BatchMode, MockAdapter, PromptFactory};
    use crate::{assert_err, assert_ok};

    fn engine(batch_size: usize, window: Duration) -> BatchEngine {
        BatchEngine::new(
            BatchConfig::new()
                .with_batch_size(batch_size)
                .with_window(window),
        )
        .expect("valid engine config")
    }

    fn as_adapter(mock: &Arc<MockAdapter>) -> Arc<dyn BatchAdapter> {
        mock.clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_request_resolved_exactly_once_and_in_place() {
        let mock = MockAdapter::new("mock")
            .with_batch_delay(Duration::from_millis(20))
            .shared();
        let adapter = as_adapter(&mock);
        let engine = engine(10, Duration::from_millis(50));
        let prompts = PromptFactory::prompts(25);

        let tickets: Vec<_> = prompts
            .iter()
            .map(|p| engine.enqueue(&adapter, PromptFactory::messages(p), ChatOptions::batched()))
            .collect();
        let results = join_all(tickets).await;

        assert_eq!(results.len(), 25);
        for (prompt, result) in prompts.iter().zip(results) {
            assert_ok!(result).assert_echoes(prompt);
        }
        assert_eq!(mock.batch_sizes(), vec![10, 10, 5]);

        let metrics = engine.metrics();
        assert_eq!(metrics.requests_enqueued, 25);
        assert_eq!(metrics.results_delivered, 25);
        assert_eq!(metrics.batches_dispatched, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_past_batch_size_drains_residual() {
        let mock = MockAdapter::new("mock").shared();
        let adapter = as_adapter(&mock);
        let engine = engine(4, Duration::from_secs(60));

        let tickets: Vec<_> = PromptFactory::prompts(5)
            .iter()
            .map(|p| engine.enqueue(&adapter, PromptFactory::messages(p), ChatOptions::batched()))
            .collect();
        let results = join_all(tickets).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(mock.batch_sizes(), vec![4, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_two_batches_in_flight_for_one_key() {
        let mock = MockAdapter::new("mock")
            .with_batch_delay(Duration::from_millis(30))
            .shared();
        let adapter = as_adapter(&mock);
        let engine = engine(3, Duration::from_millis(10));

        // staggered arrivals so new requests land while flushes are running
        let mut waves = Vec::new();
        for wave in 0..5u64 {
            let engine = engine.clone();
            let adapter = adapter.clone();
            waves.push(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(wave * 7)).await;
                let tickets: Vec<_> = (0..4)
                    .map(|i| {
                        engine.enqueue(
                            &adapter,
                            PromptFactory::messages(&format!("w{}-{}", wave, i)),
                            ChatOptions::batched(),
                        )
                    })
                    .collect();
                join_all(tickets).await
            }));
        }

        let mut delivered = 0;
        for wave in join_all(waves).await {
            let results = assert_ok!(wave);
            assert!(results.iter().all(|r| r.is_ok()));
            delivered += results.len();
        }

        assert_eq!(delivered, 20);
        assert_eq!(mock.max_in_flight_per_key(), 1);
        assert_eq!(mock.batch_sizes().iter().sum::<usize>(), 20);
        assert!(mock.batch_sizes().iter().all(|size| *size <= 3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_flush_independently() {
        let mock = MockAdapter::new("mock")
            .with_batch_delay(Duration::from_millis(50))
            .shared();
        let adapter = as_adapter(&mock);
        let engine = engine(2, Duration::from_secs(60));
        let start = Instant::now();

        let tickets: Vec<_> = ["alpha", "beta", "alpha", "beta"]
            .iter()
            .enumerate()
            .map(|(i, model)| {
                engine.enqueue(
                    &adapter,
                    PromptFactory::messages(&format!("{}-{}", model, i)),
                    ChatOptions::batched().with_model(*model),
                )
            })
            .collect();
        let results = join_all(tickets).await;

        assert!(results.iter().all(|r| r.is_ok()));
        // both keys were in flight together
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(mock.max_in_flight_total(), 2);
        for batch in mock.batches() {
            assert_eq!(batch.models.len(), 2);
            assert!(batch.models.iter().all(|m| *m == batch.models[0]));
        }
        assert_eq!(
            engine.keys(),
            vec![QueueKey::new("mock", "alpha"), QueueKey::new("mock", "beta")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_batch_flushes_when_window_elapses() {
        let mock = MockAdapter::new("mock").shared();
        let adapter = as_adapter(&mock);
        let engine = engine(10, Duration::from_millis(100));
        let start = Instant::now();

        let mut tickets: Vec<_> = PromptFactory::prompts(3)
            .iter()
            .map(|p| engine.enqueue(&adapter, PromptFactory::messages(p), ChatOptions::batched()))
            .collect();
        tokio::time::sleep(Duration::from_millis(30)).await;
        tickets.push(engine.enqueue(
            &adapter,
            PromptFactory::messages("late"),
            ChatOptions::batched(),
        ));

        let results = join_all(tickets).await;
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(mock.batch_sizes(), vec![4]);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(130));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_batch_falls_back_per_item() {
        let mock = MockAdapter::new("mock").with_mode(BatchMode::Fail).shared();
        let adapter = as_adapter(&mock);
        let engine = engine(3, Duration::from_secs(60));

        let prompts = ["first", "please fail", "third"];
        let tickets: Vec<_> = prompts
            .iter()
            .map(|p| engine.enqueue(&adapter, PromptFactory::messages(p), ChatOptions::batched()))
            .collect();
        let mut results = join_all(tickets).await.into_iter();

        assert_ok!(results.next().unwrap()).assert_echoes("first");
        let failed = assert_err!(results.next().unwrap());
        assert_item_error_contains(&failed, "cannot answer 'please fail'");
        assert_ok!(results.next().unwrap()).assert_echoes("third");

        let mut singles = mock.single_calls();
        singles.sort();
        assert_eq!(singles, vec!["first", "please fail", "third"]);

        let metrics = engine.metrics();
        assert_eq!(metrics.batch_failures, 1);
        assert_eq!(metrics.fallback_requests, 3);
        assert_eq!(metrics.fallback_failures, 1);
        assert_eq!(metrics.results_delivered, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_fallback_item_spares_siblings() {
        let mock = MockAdapter::new("mock").with_mode(BatchMode::Fail).shared();
        let adapter = as_adapter(&mock);
        let engine = engine(3, Duration::from_secs(60));

        let tickets: Vec<_> = ["before", "boom", "after"]
            .iter()
            .map(|p| engine.enqueue(&adapter, PromptFactory::messages(p), ChatOptions::batched()))
            .collect();
        let mut results = join_all(tickets).await.into_iter();

        assert_ok!(results.next().unwrap()).assert_echoes("before");
        let panicked = assert_err!(results.next().unwrap());
        assert_item_error_contains(&panicked, "panicked");
        assert_ok!(results.next().unwrap()).assert_echoes("after");

        let metrics = engine.metrics();
        assert_eq!(metrics.fallback_requests, 3);
        assert_eq!(metrics.fallback_failures, 1);
        assert_eq!(metrics.results_delivered, 3);
        assert!(!engine.is_flushing(&QueueKey::new("mock", "mock-default")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_result_list_triggers_fallback() {
        let mock = MockAdapter::new("mock")
            .with_mode(BatchMode::DropLast)
            .shared();
        let adapter = as_adapter(&mock);
        let engine = engine(2, Duration::from_secs(60));

        let a = engine.enqueue(&adapter, PromptFactory::messages("a"), ChatOptions::batched());
        let b = engine.enqueue(&adapter, PromptFactory::messages("b"), ChatOptions::batched());

        assert_ok!(a.await).assert_echoes("a");
        assert_ok!(b.await).assert_echoes("b");
        assert_eq!(mock.single_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_adapter_panic_resolves_tickets_and_key_recovers() {
        let mock = MockAdapter::new("mock").with_mode(BatchMode::Panic).shared();
        let adapter = as_adapter(&mock);
        let engine = engine(2, Duration::from_secs(60));

        let a = engine.enqueue(&adapter, PromptFactory::messages("a"), ChatOptions::batched());
        let b = engine.enqueue(&adapter, PromptFactory::messages("b"), ChatOptions::batched());
        assert_err!(a.await);
        assert_err!(b.await);

        mock.set_mode(BatchMode::Succeed);
        let c = engine.enqueue(&adapter, PromptFactory::messages("c"), ChatOptions::batched());
        let d = engine.enqueue(&adapter, PromptFactory::messages("d"), ChatOptions::batched());
        assert_ok!(c.await).assert_echoes("c");
        assert_ok!(d.await).assert_echoes("d");
        assert!(!engine.is_flushing(&QueueKey::new("mock", "mock-default")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_engines_do_not_share_queues() {
        let mock = MockAdapter::new("mock").shared();
        let adapter = as_adapter(&mock);
        let first = engine(2, Duration::from_secs(60));
        let second = engine(2, Duration::from_secs(60));

        let a = first.enqueue(&adapter, PromptFactory::messages("a"), ChatOptions::batched());
        let b = second.enqueue(&adapter, PromptFactory::messages("b"), ChatOptions::batched());

        let key = QueueKey::new("mock", "mock-default");
        assert_eq!(first.queue_depth(&key), 1);
        assert_eq!(second.queue_depth(&key), 1);
        assert!(mock.batch_sizes().is_empty());

        drop((a, b));
    }
}
