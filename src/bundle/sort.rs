//! 比较器与排序
//!
//! 记录按所选字段排序。空值（缺失或空字符串）在升序中排在最前，降序中排在最后。
//! 排序是稳定的，相等元素保持原有相对顺序。

use std::cmp::Ordering;
use std::str::FromStr;

use super::record::RecordFields;

/// 排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    /// 名称
    #[default]
    Name,
    /// 版本（更新记录中为当前版本）
    Version,
    /// 状态（仅已安装模块）
    State,
    /// 可用版本（仅更新记录）
    Available,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Version => "version",
            SortField::State => "state",
            SortField::Available => "available",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "version" => Ok(SortField::Version),
            "state" => Ok(SortField::State),
            "available" => Ok(SortField::Available),
            other => Err(format!("未知排序字段 '{}'", other)),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// 反向
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("未知排序方向 '{}'", other)),
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 排序设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// 点击列头：当前字段升序时切换为降序，否则选中该字段升序
    pub fn toggled(self, field: SortField) -> Self {
        if self.field == field {
            SortSpec::new(field, self.direction.reversed())
        } else {
            SortSpec::new(field, SortDirection::Asc)
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// 基础比较器
///
/// - 两侧都缺失时相等
/// - `b` 缺失或 `b < a` 时 `a` 在前（-1）
/// - 否则（`a` 缺失或 `b > a`）`b` 在前（+1）
///
/// 这是降序排列；升序取其相反数。
fn base_compare(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (present(a), present(b)) {
        (None, None) => Ordering::Equal,
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(a), Some(b)) if b < a => Ordering::Less,
        (Some(a), Some(b)) if b > a => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

/// 三路比较两条记录在 `field` 上的值
pub fn compare<R: RecordFields>(a: &R, b: &R, field: SortField, direction: SortDirection) -> Ordering {
    let ordering = base_compare(a.field_value(field), b.field_value(field));
    match direction {
        SortDirection::Desc => ordering,
        SortDirection::Asc => ordering.reverse(),
    }
}

/// `compare` 的整数形式（-1, 0, 1）
pub fn compare_signum<R: RecordFields>(a: &R, b: &R, field: SortField, direction: SortDirection) -> i8 {
    match compare(a, b, field, direction) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// 按排序设置原地稳定排序
pub fn sort_records<R: RecordFields>(records: &mut [R], spec: SortSpec) {
    records.sort_by(|a, b| compare(a, b, spec.field, spec.direction));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::record::{ModuleRecord, UpdateRecord};

    fn named(name: &str, version: &str) -> ModuleRecord {
        ModuleRecord::new(name, version, "ACTIVE")
    }

    #[test]
    fn test_both_missing_equal() {
        let a = named("a", "");
        let b = named("b", "");
        assert_eq!(compare_signum(&a, &b, SortField::Version, SortDirection::Asc), 0);
        assert_eq!(compare_signum(&a, &b, SortField::Version, SortDirection::Desc), 0);
    }

    #[test]
    fn test_base_rule_descending() {
        let a = named("b", "");
        let b = named("a", "");
        // b 的值更小 -> a 在前
        assert_eq!(compare_signum(&a, &b, SortField::Name, SortDirection::Desc), -1);
        // 方向取反
        assert_eq!(compare_signum(&a, &b, SortField::Name, SortDirection::Asc), 1);
    }

    #[test]
    fn test_missing_value_placement() {
        let undefined = named("x", "");
        let defined = named("y", "2.0");

        // 降序：有值的排在缺失值之前
        assert_eq!(
            compare_signum(&undefined, &defined, SortField::Version, SortDirection::Desc),
            1
        );
        assert_eq!(
            compare_signum(&defined, &undefined, SortField::Version, SortDirection::Desc),
            -1
        );
        // 升序：缺失值排在最前
        assert_eq!(
            compare_signum(&undefined, &defined, SortField::Version, SortDirection::Asc),
            -1
        );
    }

    #[test]
    fn test_field_absent_on_record_type() {
        // 更新记录没有 state 字段，视为缺失
        let a = UpdateRecord::new("a", "1.0", "1.1");
        let b = UpdateRecord::new("b", "1.0", "1.2");
        assert_eq!(compare_signum(&a, &b, SortField::State, SortDirection::Asc), 0);
        assert_eq!(compare_signum(&a, &b, SortField::Available, SortDirection::Asc), -1);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut records = vec![named("b", "1"), named("a", "2"), named("b", "3")];
        sort_records(&mut records, SortSpec::new(SortField::Name, SortDirection::Asc));

        let order: Vec<_> = records.iter().map(|r| (r.name.as_str(), r.version.as_str())).collect();
        assert_eq!(order, vec![("a", "2"), ("b", "1"), ("b", "3")]);

        sort_records(&mut records, SortSpec::new(SortField::Name, SortDirection::Desc));
        let order: Vec<_> = records.iter().map(|r| (r.name.as_str(), r.version.as_str())).collect();
        assert_eq!(order, vec![("b", "1"), ("b", "3"), ("a", "2")]);
    }

    #[test]
    fn test_sort_with_missing_values() {
        let mut records = vec![named("a", "1.0"), named("b", ""), named("c", "2.0")];
        sort_records(&mut records, SortSpec::new(SortField::Version, SortDirection::Desc));
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        sort_records(&mut records, SortSpec::new(SortField::Version, SortDirection::Asc));
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_sort_by_state_uses_raw_string() {
        let mut records = vec![
            ModuleRecord::new("a", "1", "RESOLVED"),
            ModuleRecord::new("b", "1", "ACTIVE"),
            ModuleRecord::new("c", "1", "INSTALLED"),
        ];
        sort_records(&mut records, SortSpec::new(SortField::State, SortDirection::Asc));
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_toggle() {
        let spec = SortSpec::default();
        assert_eq!(spec, SortSpec::new(SortField::Name, SortDirection::Asc));

        let spec = spec.toggled(SortField::Name);
        assert_eq!(spec.direction, SortDirection::Desc);

        let spec = spec.toggled(SortField::Name);
        assert_eq!(spec.direction, SortDirection::Asc);

        let spec = spec.toggled(SortField::Version);
        assert_eq!(spec, SortSpec::new(SortField::Version, SortDirection::Asc));
    }

    #[test]
    fn test_parse_field_and_direction() {
        assert_eq!("Version".parse::<SortField>(), Ok(SortField::Version));
        assert!("bundleId".parse::<SortField>().is_err());
        assert_eq!(" DESC ".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!(SortDirection::Asc.reversed(), SortDirection::Desc);
    }
}
