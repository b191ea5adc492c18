//! # Integration Tests
//!
//! End-to-end tests over the full dispatch path.
//!
//! Covers:
//! - config -> registry -> dispatcher -> transport flow
//! - target dedup and fan-out properties
//! - per-target failure isolation under concurrent dispatch

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ContractError, Context, Delivery, Notification, PrimaryNotifier, Priority, PrioritySet,
        Publisher, Receipt, Transport,
    };
    use dispatcher::{MulticastDispatcher, TargetRegistry, TracingPrimary};

    const CONFIG_TOML: &str = r#"
publisher_id = "GLANCE:MASTER"
topic_prefix = "glance.repl."

[[events]]
event = "image.upload"
topics = ["host1", "host2"]

[[events]]
event = "image.delete"
topics = ["host1", "host2"]
"#;

    /// Transport whose publishers record every delivery
    struct RecordingTransport {
        seen: Arc<Mutex<Vec<(String, String, Priority, String)>>>,
        capabilities: PrioritySet,
        fail_topics: Vec<String>,
    }

    impl RecordingTransport {
        fn new(seen: Arc<Mutex<Vec<(String, String, Priority, String)>>>) -> Self {
            Self {
                seen,
                capabilities: PrioritySet::all(),
                fail_topics: Vec::new(),
            }
        }
    }

    struct RecordingPublisher {
        topic: String,
        capabilities: PrioritySet,
        fail: bool,
        seen: Arc<Mutex<Vec<(String, String, Priority, String)>>>,
    }

    impl Publisher for RecordingPublisher {
        fn topic(&self) -> &str {
            &self.topic
        }

        fn capabilities(&self) -> PrioritySet {
            self.capabilities
        }

        async fn deliver(&mut self, delivery: &Delivery) -> Result<(), ContractError> {
            if self.fail {
                return Err(ContractError::publish_failed(&self.topic, "induced failure"));
            }
            self.seen.lock().unwrap().push((
                self.topic.clone(),
                delivery.event_type.clone(),
                delivery.priority,
                delivery.message.message_id.clone(),
            ));
            Ok(())
        }

        async fn close(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    impl Transport for RecordingTransport {
        type Publisher = RecordingPublisher;

        async fn create_publisher(
            &mut self,
            topic: &str,
            _publisher_id: &str,
        ) -> Result<RecordingPublisher, ContractError> {
            Ok(RecordingPublisher {
                topic: topic.to_string(),
                capabilities: self.capabilities,
                fail: self.fail_topics.iter().any(|t| t == topic),
                seen: Arc::clone(&self.seen),
            })
        }
    }

    /// End-to-end: TOML config -> registry -> dispatcher -> transport
    #[tokio::test]
    async fn test_e2e_config_to_delivery() {
        let blueprint = ConfigLoader::load_from_str(CONFIG_TOML, ConfigFormat::Toml).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut transport = RecordingTransport::new(Arc::clone(&seen));
        let registry = Arc::new(
            TargetRegistry::build(&blueprint, &mut transport)
                .await
                .unwrap(),
        );

        // Four distinct fully-qualified topics across the two events
        assert_eq!(registry.target_count(), 4);
        assert_eq!(registry.publisher_id(), "GLANCE:MASTER");

        let dispatcher =
            MulticastDispatcher::new(TracingPrimary::new(), Arc::clone(&registry), None);

        let upload = Notification::new("m-upload", "glance", "image.upload", Priority::Info);
        let delete = Notification::new("m-delete", "glance", "IMAGE.DELETE", Priority::Warn);
        let resize = Notification::new("m-resize", "glance", "image.resize", Priority::Info);

        let ctxt = Context::default();
        let receipt = dispatcher.notify(&ctxt, &upload, Priority::Info).await.unwrap();
        assert_eq!(receipt.message_id, "m-upload");
        dispatcher.notify(&ctxt, &delete, Priority::Warn).await.unwrap();
        dispatcher.notify(&ctxt, &resize, Priority::Info).await.unwrap();

        // Drain workers before asserting
        drop(dispatcher);
        Arc::try_unwrap(registry)
            .unwrap_or_else(|_| panic!("registry still referenced"))
            .shutdown()
            .await;

        let seen = seen.lock().unwrap();
        // Each matched event fans out to both hosts exactly once; the
        // unregistered event reaches nothing.
        assert_eq!(seen.len(), 4);
        let upload_topics: Vec<_> = seen
            .iter()
            .filter(|(_, event, priority, id)| {
                event == "image.upload" && *priority == Priority::Info && id == "m-upload"
            })
            .map(|(topic, ..)| topic.clone())
            .collect();
        assert_eq!(
            {
                let mut t = upload_topics.clone();
                t.sort();
                t
            },
            vec![
                "glance.repl.host1.image.upload".to_string(),
                "glance.repl.host2.image.upload".to_string(),
            ]
        );
        assert!(seen.iter().all(|(_, _, _, id)| id != "m-resize"));
    }

    /// A failing target never blocks deliveries to its siblings
    #[tokio::test]
    async fn test_e2e_failure_isolation() {
        let blueprint = ConfigLoader::load_from_str(CONFIG_TOML, ConfigFormat::Toml).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut transport = RecordingTransport::new(Arc::clone(&seen));
        transport.fail_topics = vec!["glance.repl.host1.image.upload".to_string()];

        let registry = Arc::new(
            TargetRegistry::build(&blueprint, &mut transport)
                .await
                .unwrap(),
        );
        let dispatcher =
            MulticastDispatcher::new(TracingPrimary::new(), Arc::clone(&registry), None);

        let msg = Notification::new("m1", "glance", "image.upload", Priority::Info);
        let result = dispatcher.notify(&Context::default(), &msg, Priority::Info).await;
        // Fan-out failures are invisible to the producer
        assert!(result.is_ok());

        drop(dispatcher);
        let metrics: Vec<_> = registry
            .targets()
            .map(|(topic, handle)| (topic.to_string(), Arc::clone(handle.metrics())))
            .collect();
        Arc::try_unwrap(registry)
            .unwrap_or_else(|_| panic!("registry still referenced"))
            .shutdown()
            .await;

        // host2 delivered, host1 recorded a failure
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "glance.repl.host2.image.upload");

        let failures: u64 = metrics
            .iter()
            .filter(|(topic, _)| topic == "glance.repl.host1.image.upload")
            .map(|(_, m)| m.failed_count())
            .sum();
        assert_eq!(failures, 1);
    }

    /// Unsupported priorities skip silently while others deliver
    #[tokio::test]
    async fn test_e2e_unsupported_priority_skips() {
        let blueprint = ConfigLoader::load_from_str(CONFIG_TOML, ConfigFormat::Toml).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut transport = RecordingTransport::new(Arc::clone(&seen));
        transport.capabilities = PrioritySet::of(&[Priority::Info, Priority::Warn]);

        let registry = Arc::new(
            TargetRegistry::build(&blueprint, &mut transport)
                .await
                .unwrap(),
        );
        let dispatcher =
            MulticastDispatcher::new(TracingPrimary::new(), Arc::clone(&registry), None);

        let ctxt = Context::default();
        let critical = Notification::new("m1", "glance", "image.upload", Priority::Critical);
        let info = Notification::new("m2", "glance", "image.upload", Priority::Info);
        dispatcher.notify(&ctxt, &critical, Priority::Critical).await.unwrap();
        dispatcher.notify(&ctxt, &info, Priority::Info).await.unwrap();

        drop(dispatcher);
        Arc::try_unwrap(registry)
            .unwrap_or_else(|_| panic!("registry still referenced"))
            .shutdown()
            .await;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, _, _, id)| id == "m2"));
    }

    /// Concurrent notify calls over the shared read-only registry
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_e2e_concurrent_dispatch() {
        let blueprint = ConfigLoader::load_from_str(CONFIG_TOML, ConfigFormat::Toml).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut transport = RecordingTransport::new(Arc::clone(&seen));
        let registry = Arc::new(
            TargetRegistry::build(&blueprint, &mut transport)
                .await
                .unwrap(),
        );
        let dispatcher = Arc::new(MulticastDispatcher::new(
            TracingPrimary::new(),
            Arc::clone(&registry),
            None,
        ));

        let mut handles = Vec::new();
        for task in 0..4u64 {
            let dispatcher = Arc::clone(&dispatcher);
            handles.push(tokio::spawn(async move {
                let ctxt = Context::default();
                for i in 0..25u64 {
                    let msg = Notification::new(
                        format!("m-{task}-{i}"),
                        "glance",
                        "image.upload",
                        Priority::Info,
                    );
                    dispatcher.notify(&ctxt, &msg, Priority::Info).await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        drop(dispatcher);
        Arc::try_unwrap(registry)
            .unwrap_or_else(|_| panic!("registry still referenced"))
            .shutdown()
            .await;

        // 100 messages x 2 targets for the matched event
        assert_eq!(seen.lock().unwrap().len(), 200);
    }

    /// Primary result is counted and passed through even with multicast active
    #[tokio::test]
    async fn test_e2e_primary_always_first() {
        struct CountingPrimary {
            calls: Arc<AtomicU64>,
        }

        impl PrimaryNotifier for CountingPrimary {
            async fn notify(
                &self,
                _ctxt: &Context,
                msg: &Notification,
                _priority: Priority,
                _retry: Option<u32>,
            ) -> Result<Receipt, ContractError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(Receipt {
                    message_id: msg.message_id.clone(),
                })
            }
        }

        let blueprint = ConfigLoader::load_from_str(CONFIG_TOML, ConfigFormat::Toml).unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut transport = RecordingTransport::new(Arc::clone(&seen));
        let registry = Arc::new(
            TargetRegistry::build(&blueprint, &mut transport)
                .await
                .unwrap(),
        );

        let calls = Arc::new(AtomicU64::new(0));
        let dispatcher = MulticastDispatcher::new(
            CountingPrimary {
                calls: Arc::clone(&calls),
            },
            Arc::clone(&registry),
            Some(2),
        );

        let ctxt = Context::default();
        // One matching, one not: the primary path sees both
        let matching = Notification::new("m1", "glance", "image.upload", Priority::Info);
        let other = Notification::new("m2", "glance", "image.resize", Priority::Info);
        dispatcher.notify(&ctxt, &matching, Priority::Info).await.unwrap();
        dispatcher.notify(&ctxt, &other, Priority::Info).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);

        drop(dispatcher);
        Arc::try_unwrap(registry)
            .unwrap_or_else(|_| panic!("registry still referenced"))
            .shutdown()
            .await;
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}

#[cfg(test)]
mod file_transport_e2e {
    use std::sync::Arc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Context, Notification, Priority};
    use dispatcher::{MulticastDispatcher, TargetRegistry, TracingPrimary};

    /// Full built-in path: file transport writes one JSON line per delivery
    #[tokio::test]
    async fn test_e2e_file_transport_round_trip() {
        let out_dir = tempfile::tempdir().unwrap();
        let config = format!(
            r#"
publisher_id = "GLANCE:MASTER"
topic_prefix = "glance.repl."

[[events]]
event = "image.upload"
topics = ["host1", "host2", "host1"]

[transport]
kind = "file"
params = {{ base_path = "{}" }}
"#,
            out_dir.path().display()
        );

        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let registry = Arc::new(TargetRegistry::connect(&blueprint).await.unwrap());

        // Duplicate suffix collapsed: two targets, two files
        assert_eq!(registry.target_count(), 2);

        let dispatcher =
            MulticastDispatcher::new(TracingPrimary::new(), Arc::clone(&registry), None);
        let msg = Notification::new("m1", "glance", "image.upload", Priority::Info);
        dispatcher
            .notify(&Context::default(), &msg, Priority::Info)
            .await
            .unwrap();

        drop(dispatcher);
        Arc::try_unwrap(registry)
            .unwrap_or_else(|_| panic!("registry still referenced"))
            .shutdown()
            .await;

        for host in ["host1", "host2"] {
            let path = out_dir
                .path()
                .join(format!("glance.repl.{host}.image.upload.jsonl"));
            let content = std::fs::read_to_string(&path).unwrap();
            assert_eq!(content.lines().count(), 1, "one delivery per target");

            let value: serde_json::Value = serde_json::from_str(content.lines().next().unwrap())
                .unwrap();
            assert_eq!(value["event_type"], "image.upload");
            assert_eq!(value["priority"], "info");
            assert_eq!(value["publisher_id"], "GLANCE:MASTER");
            assert_eq!(value["message"]["message_id"], "m1");
        }
    }
}
