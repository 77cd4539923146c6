//! Batch generator 指标收集模块
//!
//! 通过 `metrics` facade 记录每个调度周期的事件；
//! 未安装 recorder 时所有调用均为空操作。

use contracts::{StatValue, StatsRecorder, StatsUpdate};
use metrics::{counter, gauge, histogram};

/// 所有指标名的前缀
pub const METRIC_PREFIX: &str = "frontier_batchgen";

/// 记录空闲周期 (按原因分类)
pub fn record_cycle_idle(reason: &str) {
    counter!(
        "frontier_batchgen_idle_cycles_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// 记录成功生成的批次
pub fn record_batch_generated(count: usize) {
    counter!("frontier_batchgen_batches_total").increment(1);
    histogram!("frontier_batchgen_batch_size").record(count as f64);
    gauge!("frontier_batchgen_last_batch_size").set(count as f64);
}

/// 记录从 frontier 拉取的请求数
pub fn record_requests_pulled(count: usize) {
    counter!("frontier_batchgen_requests_pulled_total").increment(count as u64);
}

/// 记录被黑名单过滤的请求
pub fn record_item_blacklisted() {
    counter!("frontier_batchgen_blacklisted_total").increment(1);
}

/// 记录编码失败
pub fn record_encoding_error() {
    counter!("frontier_batchgen_encoding_errors_total").increment(1);
}

/// 记录交给 producer 的消息
pub fn record_item_published(feed: &str, keyed: bool) {
    let key = if keyed { "keyed" } else { "unkeyed" };
    counter!(
        "frontier_batchgen_published_total",
        "feed" => feed.to_string(),
        "key" => key.to_string()
    )
    .increment(1);
}

/// 记录单个周期耗时
pub fn record_cycle_duration_ms(duration_ms: f64) {
    histogram!("frontier_batchgen_cycle_duration_ms").record(duration_ms);
}

/// 统计名对应的指标名
pub fn stat_metric_name(stat: &str) -> String {
    format!("{METRIC_PREFIX}_{stat}")
}

/// 将 stats 更新映射到 `metrics` facade
///
/// - increments → counter
/// - 整数 / 时间戳 replacements → gauge (时间戳为 Unix 秒)
/// - 文本 replacements 无法表示为数值，忽略
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsStatsRecorder;

impl MetricsStatsRecorder {
    pub fn new() -> Self {
        Self
    }

    /// gauge 数值；文本返回 None
    pub fn gauge_value(value: &StatValue) -> Option<f64> {
        match value {
            StatValue::Int(v) => Some(*v as f64),
            StatValue::Timestamp(ts) => Some(ts.timestamp_millis() as f64 / 1000.0),
            StatValue::Text(_) => None,
        }
    }
}

impl StatsRecorder for MetricsStatsRecorder {
    fn update(&self, update: StatsUpdate) {
        for (name, delta) in update.increments {
            // counter 只能递增
            if delta > 0 {
                counter!(stat_metric_name(&name)).increment(delta as u64);
            }
        }

        for (name, value) in update.replacements {
            match Self::gauge_value(&value) {
                Some(v) => gauge!(stat_metric_name(&name)).set(v),
                None => tracing::debug!(stat = %name, "Skipping non-numeric stat"),
            }
        }
    }
}
