//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → sink 工厂 → 协调器的装配测试
//! - 模拟 e2e 测试（MockLogSource + mockito，无需 Kafka / ClickHouse）
//! - 过载冷却、失败重试与关闭时 flush 的 offset 提交语义

#[cfg(test)]
mod contract_tests {
    use contracts::{AnonymizerConfig, FlushPolicy};

    #[test]
    fn test_default_config_builds_default_policy() {
        let config = config_loader::ConfigLoader::load(None, &Default::default()).unwrap();
        assert_eq!(config, AnonymizerConfig::default());

        let policy = config.flush.policy();
        assert_eq!(policy, FlushPolicy::default());
        assert_eq!(policy.max_batch_size, 50_000);
        assert_eq!(policy.min_flush_interval.as_secs(), 60);
        assert_eq!(policy.retry_delay.as_secs(), 5);
    }

    #[test]
    fn test_encoded_record_renders_anonymized() {
        let record = contracts::HttpLogRecord {
            timestamp_epoch_milli: 1_700_000_000_999,
            remote_addr: "203.0.113.77".into(),
            url: "/search?q=\"rust\"".into(),
            ..Default::default()
        };
        let decoded = ingestion::decode(&ingestion::encode(&record)).unwrap();
        let row = ingestion::render_row(&decoded).unwrap();

        assert!(row.starts_with("{\"timestamp\":1700000000,"));
        assert!(row.contains("\"remote_addr\":\"203.0.113.X\""));
        assert!(row.contains(r#""url":"/search?q=\"rust\"""#));
        assert!(!row.contains("77"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use contracts::{FlushPolicy, HttpLogRecord, SinkConfig, SinkKind};
    use dispatcher::{create_sink, ConfiguredSink, FlushCoordinator, FlushOutcome, RunLoop, RunSummary};
    use ingestion::{join_rows, render_row, MockLogSource};
    use mockito::{Matcher, Server, ServerGuard};
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;

    const INSERT_QUERY: &str = "INSERT INTO logs.http_log FORMAT JSONEachRow";

    fn record(id: u64) -> HttpLogRecord {
        HttpLogRecord {
            timestamp_epoch_milli: 1_700_000_000_000 + id,
            resource_id: id,
            bytes_sent: 512 * id,
            request_time_milli: 3,
            response_status: 200,
            cache_status: "MISS".into(),
            method: "GET".into(),
            remote_addr: format!("10.20.30.{id}"),
            url: format!("https://cdn.example.com/asset/{id}"),
        }
    }

    fn expected_body(ids: impl IntoIterator<Item = u64>) -> String {
        let rows: Vec<String> = ids
            .into_iter()
            .map(|id| render_row(&record(id)).unwrap())
            .collect();
        join_rows(&rows)
    }

    fn sink_for(server: &ServerGuard) -> ConfiguredSink {
        let config = SinkConfig {
            kind: SinkKind::ClickHouse,
            url: format!("{}/?query=INSERT%20INTO%20logs.http_log%20FORMAT%20JSONEachRow", server.url()),
            connect_timeout_ms: 1_000,
            request_timeout_ms: 5_000,
        };
        create_sink(&config).unwrap()
    }

    fn start(
        source: &MockLogSource,
        sink: ConfiguredSink,
        policy: FlushPolicy,
    ) -> (CancellationToken, JoinHandle<RunSummary>) {
        let cancel = CancellationToken::new();
        let run_loop = RunLoop::new(
            source.clone(),
            FlushCoordinator::new(sink, policy),
            Duration::from_millis(10),
        );
        let handle = tokio::spawn(run_loop.run(cancel.clone()));
        (cancel, handle)
    }

    /// Poll `condition` every 10 ms for up to 5 s
    async fn wait_until(mut condition: impl FnMut() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("condition not reached within 5s");
    }

    #[tokio::test]
    async fn test_e2e_size_flush_inserts_and_commits() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_query(Matcher::UrlEncoded("query".into(), INSERT_QUERY.into()))
            .match_header("content-type", "application/x-ndjson")
            .match_body(expected_body(1..=4).as_str())
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let source = MockLogSource::with_records((1..=4).map(record));
        let policy = FlushPolicy::new(4, Duration::from_secs(60));
        let (cancel, handle) = start(&source, sink_for(&server), policy);

        wait_until(|| source.committed(0).is_some()).await;
        cancel.cancel();
        let summary = handle.await.unwrap();

        mock.assert_async().await;
        assert_eq!(source.committed(0), Some(4));
        assert_eq!(summary.flush.flushes, 1);
        assert_eq!(summary.flush.rows_flushed, 4);
        assert_eq!(summary.ingestion.records_ingested, 4);
        assert_eq!(summary.final_flush, FlushOutcome::Empty);
    }

    #[tokio::test]
    async fn test_e2e_overload_holds_batch_without_commit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("Code: 202. DB::Exception: Too many simultaneous queries")
            .expect(1)
            .create_async()
            .await;

        let source = MockLogSource::with_records((1..=2).map(record));
        let policy = FlushPolicy::new(2, Duration::from_secs(60));
        let (cancel, handle) = start(&source, sink_for(&server), policy);

        wait_until(|| source.pending() == 0).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        cancel.cancel();
        let summary = handle.await.unwrap();

        // one attempt only: the cooldown also blocks the shutdown flush
        mock.assert_async().await;
        assert_eq!(summary.flush.overloads, 1);
        assert!(matches!(summary.final_flush, FlushOutcome::BackingOff { .. }));
        assert_eq!(summary.rows_left, 2);
        assert_eq!(source.commit_calls(), 0);
        assert_eq!(source.committed(0), None);
    }

    #[tokio::test]
    async fn test_e2e_rejected_batch_is_retried_then_committed() {
        let mut server = Server::new_async().await;
        let failing = server
            .mock("POST", "/")
            .with_status(500)
            .with_body("Code: 241. DB::Exception: Memory limit exceeded")
            .expect(1)
            .create_async()
            .await;

        let source = MockLogSource::with_records((1..=3).map(record));
        let policy = FlushPolicy::new(3, Duration::from_secs(60))
            .with_retry_delay(Duration::from_millis(500));
        let (cancel, handle) = start(&source, sink_for(&server), policy);

        wait_until(|| source.pending() == 0).await;
        while !failing.matched_async().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        failing.remove_async().await;
        assert_eq!(source.committed(0), None);

        let accepting = server
            .mock("POST", "/")
            .match_body(expected_body(1..=3).as_str())
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        wait_until(|| source.committed(0).is_some()).await;
        cancel.cancel();
        let summary = handle.await.unwrap();

        accepting.assert_async().await;
        assert_eq!(source.committed(0), Some(3));
        assert_eq!(summary.flush.other_failures, 1);
        assert_eq!(summary.flush.flushes, 1);
        assert_eq!(summary.flush.commits, 1);
    }

    #[tokio::test]
    async fn test_e2e_shutdown_flushes_partial_batch() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(expected_body([7, 8, 9]).as_str())
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let source = MockLogSource::with_records([record(7), record(8), record(9)]);
        let policy = FlushPolicy::new(1_000, Duration::from_secs(60));
        let (cancel, handle) = start(&source, sink_for(&server), policy);

        wait_until(|| source.pending() == 0).await;
        assert_eq!(source.committed(0), None);

        cancel.cancel();
        let summary = handle.await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            summary.final_flush,
            FlushOutcome::Flushed {
                rows: 3,
                committed: true
            }
        );
        assert_eq!(source.committed(0), Some(3));
        assert_eq!(summary.rows_left, 0);
    }

    #[tokio::test]
    async fn test_e2e_malformed_messages_are_committed_past() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(expected_body([1, 2]).as_str())
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let source = MockLogSource::default();
        source.push_record(0, &record(1));
        source.push_payload(0, vec![0u8; 3]);
        source.push_tombstone(0);
        source.push_record(0, &record(2));

        let policy = FlushPolicy::new(2, Duration::from_secs(60));
        let (cancel, handle) = start(&source, sink_for(&server), policy);

        wait_until(|| source.committed(0).is_some()).await;
        cancel.cancel();
        let summary = handle.await.unwrap();

        mock.assert_async().await;
        assert_eq!(source.committed(0), Some(4));
        assert_eq!(summary.ingestion.decode_errors, 2);
    }
}
