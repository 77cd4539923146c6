//! 配置校验模块
//!
//! 校验规则：
//! - 结构体上声明的范围约束 (max_next_requests / partitions / queue_capacity > 0)
//! - new_batch_delay_sec 为有限非负数
//! - domains_blacklist 条目为非空的纯主机名

use contracts::{ContractError, WorkerConfig};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 校验 WorkerConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &WorkerConfig) -> Result<(), ContractError> {
    validate_declared_rules(config)?;
    validate_batch_delay(config)?;
    validate_blacklist(config)?;
    Ok(())
}

/// 执行结构体上 derive 的约束
fn validate_declared_rules(config: &WorkerConfig) -> Result<(), ContractError> {
    config.validate().map_err(|errors| {
        let (field, message) = first_error(&errors, "")
            .unwrap_or_else(|| ("config".to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })
}

/// 深度优先取出第一个字段错误，附带完整路径
fn first_error(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (name, kind) in fields {
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    return Some((path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_error(inner, &path) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    if let Some(found) = first_error(inner, &format!("{path}[{idx}]")) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

/// 校验批次间隔
fn validate_batch_delay(config: &WorkerConfig) -> Result<(), ContractError> {
    let delay = config.batch.new_batch_delay_sec;
    if !delay.is_finite() || delay < 0.0 {
        return Err(ContractError::config_validation(
            "batch.new_batch_delay_sec",
            format!("new_batch_delay_sec must be a finite value >= 0, got {delay}"),
        ));
    }
    Ok(())
}

/// 校验黑名单条目
fn validate_blacklist(config: &WorkerConfig) -> Result<(), ContractError> {
    for (idx, host) in config.batch.domains_blacklist.iter().enumerate() {
        let trimmed = host.trim();
        if trimmed.is_empty() {
            return Err(ContractError::config_validation(
                format!("batch.domains_blacklist[{idx}]"),
                "blacklisted hostname cannot be empty",
            ));
        }
        if trimmed.contains("://") || trimmed.contains('/') || trimmed.contains(char::is_whitespace)
        {
            return Err(ContractError::config_validation(
                format!("batch.domains_blacklist[{idx}]"),
                format!("'{host}' is not a bare hostname"),
            ));
        }
    }
    Ok(())
}
