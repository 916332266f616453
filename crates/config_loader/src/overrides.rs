//! Environment / command-line overrides layered over a config file

use contracts::{AnonymizerConfig, SinkKind};

/// Values supplied outside the config file; `None` keeps the base value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub brokers: Option<String>,
    pub group_id: Option<String>,
    pub topic: Option<String>,
    pub auto_offset_reset: Option<String>,
    pub poll_timeout_ms: Option<u64>,
    pub sink: Option<SinkKind>,
    pub clickhouse_url: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub batch_max: Option<usize>,
    pub flush_seconds: Option<u64>,
    pub retry_delay_seconds: Option<u64>,
}

impl ConfigOverrides {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply every set value onto `config`
    pub fn apply(&self, config: &mut AnonymizerConfig) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        set(&mut config.source.brokers, &self.brokers);
        set(&mut config.source.group_id, &self.group_id);
        set(&mut config.source.topic, &self.topic);
        set(&mut config.source.auto_offset_reset, &self.auto_offset_reset);
        set(&mut config.source.poll_timeout_ms, &self.poll_timeout_ms);
        set(&mut config.sink.kind, &self.sink);
        set(&mut config.sink.url, &self.clickhouse_url);
        set(&mut config.sink.connect_timeout_ms, &self.connect_timeout_ms);
        set(&mut config.sink.request_timeout_ms, &self.request_timeout_ms);
        set(&mut config.flush.batch_max, &self.batch_max);
        set(&mut config.flush.flush_seconds, &self.flush_seconds);
        set(&mut config.flush.retry_delay_seconds, &self.retry_delay_seconds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_set_values_override() {
        let mut config = AnonymizerConfig::default();
        config.source.topic = "from_file".into();

        let overrides = ConfigOverrides {
            brokers: Some("kafka:9092".into()),
            batch_max: Some(10),
            sink: Some(SinkKind::Log),
            ..Default::default()
        };
        assert!(!overrides.is_empty());
        overrides.apply(&mut config);

        assert_eq!(config.source.brokers, "kafka:9092");
        assert_eq!(config.source.topic, "from_file");
        assert_eq!(config.flush.batch_max, 10);
        assert_eq!(config.flush.flush_seconds, 60);
        assert_eq!(config.sink.kind, SinkKind::Log);
    }

    #[test]
    fn test_empty_overrides_are_a_no_op() {
        let overrides = ConfigOverrides::default();
        assert!(overrides.is_empty());

        let mut config = AnonymizerConfig::default();
        overrides.apply(&mut config);
        assert_eq!(config, AnonymizerConfig::default());
    }
}
