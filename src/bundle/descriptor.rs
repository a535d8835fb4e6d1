//! 描述符解析器
//!
//! 将注册中心列表查询返回的紧凑字符串 `<name>/<version>:<tail>` 解析为结构化记录。
//! 解析是全函数：任意输入都返回记录，缺失的分隔符退化为空字段。

use super::record::{ModuleRecord, UpdateRecord};

/// 解析模式，决定第三段的含义
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// 第三段为状态
    Installed,
    /// 第三段为可用版本
    Update,
}

/// 解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedDescriptor {
    Installed(ModuleRecord),
    Update(UpdateRecord),
}

/// 描述符解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorParser;

impl DescriptorParser {
    /// 按模式解析描述符
    pub fn parse(descriptor: &str, mode: ParseMode) -> ParsedDescriptor {
        match mode {
            ParseMode::Installed => ParsedDescriptor::Installed(Self::parse_installed(descriptor)),
            ParseMode::Update => ParsedDescriptor::Update(Self::parse_update(descriptor)),
        }
    }

    /// 解析 `<name>/<version>:<state>`
    pub fn parse_installed(descriptor: &str) -> ModuleRecord {
        let (name, version, state) = Self::split(descriptor);
        ModuleRecord::new(name, version, state)
    }

    /// 解析 `<name>/<version>:<availableVersion>`
    pub fn parse_update(descriptor: &str) -> UpdateRecord {
        let (name, current, available) = Self::split(descriptor);
        UpdateRecord::new(name, current, available)
    }

    /// 批量解析已安装模块
    pub fn parse_installed_all<S: AsRef<str>>(descriptors: &[S]) -> Vec<ModuleRecord> {
        descriptors
            .iter()
            .map(|d| Self::parse_installed(d.as_ref()))
            .collect()
    }

    /// 批量解析可用更新
    pub fn parse_update_all<S: AsRef<str>>(descriptors: &[S]) -> Vec<UpdateRecord> {
        descriptors
            .iter()
            .map(|d| Self::parse_update(d.as_ref()))
            .collect()
    }

    /// 拆分为三段并去除首尾空白
    ///
    /// 第一个 `/` 之前为名称（没有 `/` 时为整个字符串），
    /// 其后第一个 `:` 之前为版本（没有 `:` 时为剩余部分），`:` 之后全部为第三段。
    fn split(descriptor: &str) -> (&str, &str, &str) {
        let Some((name, rest)) = descriptor.split_once('/') else {
            return (descriptor.trim(), "", "");
        };
        let (middle, tail) = rest.split_once(':').unwrap_or((rest, ""));
        (name.trim(), middle.trim(), tail.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::record::BundleState;

    #[test]
    fn test_parse_installed() {
        let record = DescriptorParser::parse_installed("acme-module/1.2.0:ACTIVE");
        assert_eq!(record.name, "acme-module");
        assert_eq!(record.version, "1.2.0");
        assert_eq!(record.state, BundleState::Active);
    }

    #[test]
    fn test_parse_trims_segments() {
        let record = DescriptorParser::parse_installed("  mod-b / 2.1 :  RESOLVED ");
        assert_eq!(record, ModuleRecord::new("mod-b", "2.1", "RESOLVED"));
    }

    #[test]
    fn test_parse_without_slash() {
        let record = DescriptorParser::parse_installed("noslash");
        assert_eq!(record.name, "noslash");
        assert_eq!(record.version, "");
        assert_eq!(record.state.as_str(), "");
    }

    #[test]
    fn test_parse_without_colon() {
        let record = DescriptorParser::parse_installed("mod-c/3.0");
        assert_eq!(record.name, "mod-c");
        assert_eq!(record.version, "3.0");
        assert_eq!(record.state.as_str(), "");
    }

    #[test]
    fn test_parse_multiple_colons_and_slashes() {
        let record = DescriptorParser::parse_installed("mod-d/1.0/x:ACTIVE:extra");
        assert_eq!(record.name, "mod-d");
        assert_eq!(record.version, "1.0/x");
        assert_eq!(record.state.as_str(), "ACTIVE:extra");

        // 名称中的冒号不参与拆分
        let record = DescriptorParser::parse_installed("ns:mod/2.0:RESOLVED");
        assert_eq!(record.name, "ns:mod");
        assert_eq!(record.version, "2.0");
    }

    #[test]
    fn test_parse_adjacent_delimiters() {
        let record = DescriptorParser::parse_installed("mod-e/:");
        assert_eq!(record.name, "mod-e");
        assert_eq!(record.version, "");
        assert_eq!(record.state.as_str(), "");
    }

    #[test]
    fn test_parse_is_total() {
        let inputs = ["", " ", "/", ":", "/:", "::", "a/b:c:d", "ü/ß:€", "\t/\n:\r"];
        for input in inputs {
            // 不会 panic，所有字段都存在
            let record = DescriptorParser::parse_installed(input);
            let update = DescriptorParser::parse_update(input);
            assert_eq!(record.name, update.name, "input: {:?}", input);
        }
    }

    #[test]
    fn test_unknown_state_preserved() {
        let record = DescriptorParser::parse_installed("mod-f/1.0:WAITING_FOR_DEPS");
        assert_eq!(record.state, BundleState::Other("WAITING_FOR_DEPS".to_string()));
    }

    #[test]
    fn test_parse_update_mode() {
        match DescriptorParser::parse("mod-a/1.0:1.1", ParseMode::Update) {
            ParsedDescriptor::Update(update) => {
                assert_eq!(update.name, "mod-a");
                assert_eq!(update.current_version, "1.0");
                assert_eq!(update.available_version, "1.1");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_parse_all() {
        let records =
            DescriptorParser::parse_installed_all(&["mod-a/1.0:ACTIVE", "mod-b/2.1:RESOLVED"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].state, BundleState::Resolved);
    }
}
