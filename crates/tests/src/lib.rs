//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 配置 → 调度周期 → feed 的端到端测试
//! - 多周期行为 (背压、开关、job id)

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(contracts::PUSHED_SINCE_START, "pushed_since_start");
        assert_eq!(contracts::BATCHES_AFTER_START, "batches_after_start");
        assert_eq!(contracts::LAST_BATCH_SIZE, "last_batch_size");
        assert_eq!(contracts::LAST_BATCH_GENERATED, "last_batch_generated");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use batch_generator::{
        encoder_for, read_frames, BatchGenerator, Collaborators, CycleOutcome, FileFeed,
        IdleReason, JobTracker, MemoryFeed, MemoryFrontier, MemoryProducer, MemoryStats,
    };
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        Fingerprint, PartitionKey, StatValue, WorkItem, WorkerConfig, BATCHES_AFTER_START,
        LAST_BATCH_SIZE, PUSHED_SINCE_START,
    };
    use tempfile::TempDir;

    type MemoryGenerator = BatchGenerator<MemoryFrontier, MemoryFeed, MemoryProducer>;

    const WORKER_TOML: &str = r#"
[batch]
max_next_requests = 64
domains_blacklist = ["Spam.Example"]
partition_key = "fingerprint"

[feed]
partitions = 3
queue_capacity = 100
codec = "json"
"#;

    fn item(url: &str, fp: u8) -> WorkItem {
        WorkItem::new(url, Fingerprint::new(vec![fp]))
    }

    fn load(content: &str) -> WorkerConfig {
        ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap()
    }

    fn memory_generator(
        config: &WorkerConfig,
        items: Vec<WorkItem>,
    ) -> (MemoryGenerator, MemoryFeed, Arc<MemoryStats>) {
        let feed = MemoryFeed::new(
            "requests",
            config.feed.partitions,
            config.feed.queue_capacity,
        );
        let stats = Arc::new(MemoryStats::new());
        let generator = BatchGenerator::new(
            &config.batch,
            Collaborators {
                frontier: MemoryFrontier::with_items(config.feed.partitions, items),
                oracle: feed.clone(),
                producer: feed.producer(),
                encoder: encoder_for(config.feed.codec),
                stats: stats.clone(),
            },
        )
        .unwrap();
        (generator, feed, stats)
    }

    fn payload_json(payload: &[u8]) -> serde_json::Value {
        serde_json::from_slice(payload).unwrap()
    }

    /// Config file → generator → memory feed, with two black-listed requests
    #[tokio::test]
    async fn test_e2e_blacklist_and_fingerprint_keys() {
        let config = load(WORKER_TOML);
        let mut items: Vec<_> = (0..8)
            .map(|i| item(&format!("https://site{i}.example/page"), i))
            .collect();
        items.push(item("https://spam.example/1", 200));
        items.push(item("http://SPAM.example:8080/2", 201));

        let (mut generator, feed, stats) = memory_generator(&config, items);
        let outcome = generator.run_cycle().await.unwrap();
        assert_eq!(outcome, CycleOutcome::Completed { count: 8 });

        let messages = feed.all_messages();
        assert_eq!(messages.len(), 8);
        for message in &messages {
            let value = payload_json(&message.payload);
            let fingerprint = value["fingerprint"].as_str().unwrap();
            let expected = Fingerprint::from_hex(fingerprint).unwrap();
            assert_eq!(message.key, Some(PartitionKey::new(expected.to_bytes())));
            assert!(!value["url"].as_str().unwrap().contains("spam"));
        }

        assert_eq!(stats.get_int(PUSHED_SINCE_START), 8);
        assert_eq!(stats.get_int(BATCHES_AFTER_START), 1);
        assert_eq!(stats.get(LAST_BATCH_SIZE), Some(StatValue::Int(8)));
    }

    /// A full partition stops pulls until a consumer drains it
    #[tokio::test]
    async fn test_e2e_backpressure_across_cycles() {
        let config = load(
            "[batch]\nmax_next_requests = 4\n[feed]\npartitions = 1\nqueue_capacity = 3\n",
        );
        let items = (0..8)
            .map(|i| item(&format!("https://a.example/{i}"), i))
            .collect();
        let (mut generator, feed, stats) = memory_generator(&config, items);

        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Completed { count: 4 }
        );
        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Idle(IdleReason::NoPartitions)
        );
        assert_eq!(generator.frontier().pull_count(), 1);

        assert_eq!(feed.drain(0).len(), 4);
        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Completed { count: 4 }
        );

        feed.drain(0);
        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Idle(IdleReason::EmptyFrontier)
        );

        assert_eq!(stats.get_int(PUSHED_SINCE_START), 8);
        assert_eq!(stats.get_int(BATCHES_AFTER_START), 2);

        let snapshot = generator.metrics().snapshot();
        assert_eq!(snapshot.cycles, 4);
        assert_eq!(snapshot.idle_cycles, 2);
        assert_eq!(snapshot.batches, 2);
    }

    /// The control plane flips the switch through a cloned handle
    #[tokio::test]
    async fn test_e2e_switch_from_control_task() {
        let config = load(WORKER_TOML);
        let items = vec![item("https://a.example/1", 1), item("https://b.example/2", 2)];
        let (mut generator, feed, stats) = memory_generator(&config, items);

        let control = generator.switch().clone();
        tokio::spawn(async move { control.disable() }).await.unwrap();

        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Idle(IdleReason::Disabled)
        );
        assert_eq!(feed.oracle_calls(), 0);
        assert_eq!(stats.update_count(), 0);

        let control = generator.switch().clone();
        tokio::spawn(async move { control.enable() }).await.unwrap();

        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Completed { count: 2 }
        );
        assert_eq!(feed.total_len(), 2);
    }

    /// A shared job tracker retags later batches
    #[tokio::test]
    async fn test_e2e_job_id_follows_tracker() {
        let config = load("[batch]\nmax_next_requests = 1\njob_id = 7\n");
        let items = vec![item("https://a.example/1", 1), item("https://a.example/2", 2)];
        let (generator, feed, _stats) = memory_generator(&config, items);

        let tracker = JobTracker::new(config.batch.job_id);
        let mut generator = generator.with_job_tracker(tracker.clone());

        generator.run_cycle().await.unwrap();
        tracker.advance();
        generator.run_cycle().await.unwrap();

        let jobs: Vec<_> = feed
            .all_messages()
            .iter()
            .map(|m| payload_json(&m.payload)["job_id"].as_u64().unwrap())
            .collect();
        assert_eq!(jobs, vec![7, 8]);
    }

    /// Hostname keys with the binary codec, written to partition files
    #[tokio::test]
    async fn test_e2e_file_feed_with_hostname_keys() {
        let config = load(
            "[batch]\npartition_key = \"hostname\"\n[feed]\npartitions = 4\ncodec = \"bincode\"\n",
        );
        let dir = TempDir::new().unwrap();
        let feed = FileFeed::create(
            "files",
            dir.path(),
            config.feed.partitions,
            config.feed.queue_capacity,
        )
        .unwrap();

        let urls = [
            "https://a.example/1",
            "https://b.example/1",
            "https://a.example/2",
            "https://c.example/1",
            "https://b.example/2",
        ];
        let items = urls
            .iter()
            .enumerate()
            .map(|(i, url)| item(url, i as u8))
            .collect::<Vec<_>>();

        let stats = Arc::new(MemoryStats::new());
        let mut generator = BatchGenerator::new(
            &config.batch,
            Collaborators {
                frontier: MemoryFrontier::with_items(config.feed.partitions, items),
                oracle: feed.clone(),
                producer: feed.producer(),
                encoder: encoder_for(config.feed.codec),
                stats: stats.clone(),
            },
        )
        .unwrap();

        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Completed { count: 5 }
        );
        generator.close().await.unwrap();

        let mut partitions_by_host: HashMap<String, Vec<u32>> = HashMap::new();
        let mut total = 0;
        for partition in 0..feed.partition_count() {
            for frame in read_frames(feed.partition_path(partition)).unwrap() {
                total += 1;
                let host = frame.key.expect("hostname key").to_string();
                assert!(
                    frame
                        .payload
                        .windows(host.len())
                        .any(|w| w == host.as_bytes()),
                    "payload should carry the url of {host}"
                );
                partitions_by_host.entry(host).or_default().push(partition);
            }
        }

        assert_eq!(total, 5);
        assert_eq!(partitions_by_host.len(), 3);
        assert_eq!(partitions_by_host["a.example"].len(), 2);
        for partitions in partitions_by_host.values() {
            assert!(partitions.windows(2).all(|w| w[0] == w[1]));
        }
        assert_eq!(stats.get_int(PUSHED_SINCE_START), 5);
    }

    /// Stats recorders can be swapped for the metrics-backed one
    #[tokio::test]
    async fn test_e2e_metrics_stats_recorder() {
        let config = load(WORKER_TOML);
        let feed = MemoryFeed::new("requests", 1, 100);
        let mut generator = BatchGenerator::new(
            &config.batch,
            Collaborators {
                frontier: MemoryFrontier::with_items(1, vec![item("https://a.example/", 1)]),
                oracle: feed.clone(),
                producer: feed.producer(),
                encoder: encoder_for(config.feed.codec),
                stats: Arc::new(observability::MetricsStatsRecorder::new()),
            },
        )
        .unwrap();

        assert_eq!(
            generator.run_cycle().await.unwrap(),
            CycleOutcome::Completed { count: 1 }
        );
        assert_eq!(feed.total_len(), 1);
    }
}
