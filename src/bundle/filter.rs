//! 名称过滤
//!
//! 不区分大小写的名称子串匹配，只匹配名称字段。

use super::record::RecordFields;

/// 规范化过滤字符串，空白字符串返回 None
pub fn normalize_needle(needle: &str) -> Option<String> {
    let trimmed = needle.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// 记录名称是否匹配已规范化的过滤字符串
pub fn matches<R: RecordFields>(record: &R, normalized: &str) -> bool {
    record.name().to_lowercase().contains(normalized)
}

/// 返回名称包含 `needle` 的记录，保持原有顺序
///
/// 空白过滤字符串返回完整集合。
pub fn filter_records<R: RecordFields + Clone>(records: &[R], needle: &str) -> Vec<R> {
    match normalize_needle(needle) {
        None => records.to_vec(),
        Some(normalized) => records
            .iter()
            .filter(|record| matches(*record, &normalized))
            .cloned()
            .collect(),
    }
}
