//! # I18n Unit Tests / 国际化单元测试
//!
//! Locale selection and localized labels. The locale is process-wide, so the
//! switching checks live in a single test.
//!
//! 区域设置选择和本地化标签。区域设置是进程级的，因此切换检查放在单个测试中。

use build_matrix::models::StepKind;
use build_matrix::select_locale;

#[test]
fn test_select_locale_matches_full_tag_then_language() {
    assert_eq!(select_locale(Some("zh-CN")), "zh-CN");
    assert_eq!(select_locale(Some("en")), "en");
    assert_eq!(select_locale(Some("en-GB")), "en");
}

#[test]
fn test_unknown_request_falls_back_to_an_available_locale() {
    let chosen = select_locale(Some("xx-YY"));
    assert!(["en", "zh-CN"].contains(&chosen.as_str()));
}

#[test]
fn test_switching_locale_changes_labels() {
    assert_eq!(build_matrix::init(Some("zh-CN")), "zh-CN");
    assert_eq!(StepKind::BuildSample.label(), "构建示例");

    assert_eq!(build_matrix::init(Some("en")), "en");
    assert_eq!(StepKind::BuildSample.label(), "build sample");
    assert_eq!(StepKind::RunTests.label(), "run tests");
}
