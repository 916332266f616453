//! 配置校验模块
//!
//! 校验规则：
//! - brokers / group_id / topic 非空
//! - sink url 以 http:// 或 https:// 开头
//! - batch_max、flush_seconds、retry_delay_seconds、poll_timeout_ms 至少为 1
//! - 连接 / 请求超时至少为 1 ms

use contracts::{AnonymizerConfig, ContractError, FlushConfig, SinkConfig, SinkKind, SourceConfig};

/// 校验 AnonymizerConfig
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &AnonymizerConfig) -> Result<(), ContractError> {
    validate_source(&config.source)?;
    validate_sink(&config.sink)?;
    validate_flush(&config.flush)?;
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::config_validation(field, "must not be empty"));
    }
    Ok(())
}

fn require_positive(field: &str, value: u64) -> Result<(), ContractError> {
    if value == 0 {
        return Err(ContractError::config_validation(field, "must be >= 1"));
    }
    Ok(())
}

/// 校验 source 配置
fn validate_source(source: &SourceConfig) -> Result<(), ContractError> {
    require_non_empty("source.brokers", &source.brokers)?;
    require_non_empty("source.group_id", &source.group_id)?;
    require_non_empty("source.topic", &source.topic)?;
    require_positive("source.poll_timeout_ms", source.poll_timeout_ms)?;

    match source.auto_offset_reset.as_str() {
        "earliest" | "latest" => Ok(()),
        other => Err(ContractError::config_validation(
            "source.auto_offset_reset",
            format!("expected 'earliest' or 'latest', got '{other}'"),
        )),
    }
}

/// 校验 sink 配置
fn validate_sink(sink: &SinkConfig) -> Result<(), ContractError> {
    // log sink 不发请求，url 无需合法
    if sink.kind == SinkKind::ClickHouse
        && !(sink.url.starts_with("http://") || sink.url.starts_with("https://"))
    {
        return Err(ContractError::config_validation(
            "sink.url",
            format!("must start with http:// or https://, got '{}'", sink.url),
        ));
    }
    require_positive("sink.connect_timeout_ms", sink.connect_timeout_ms)?;
    require_positive("sink.request_timeout_ms", sink.request_timeout_ms)?;
    Ok(())
}

/// 校验 flush 配置
fn validate_flush(flush: &FlushConfig) -> Result<(), ContractError> {
    require_positive("flush.batch_max", flush.batch_max as u64)?;
    require_positive("flush.flush_seconds", flush.flush_seconds)?;
    // 为 0 时失败后立即重发，发送循环会空转
    require_positive("flush.retry_delay_seconds", flush.retry_delay_seconds)?;
    Ok(())
}
