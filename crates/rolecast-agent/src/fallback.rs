use rolecast_core::RolecastResult;
use tracing::{error, warn};

/// Generic name used in the fallback persona when none was requested.
pub const DEFAULT_CHARACTER_NAME: &str = "默认角色";

/// Lines substituted for failed dialogue turns, chosen by `turn_index % len`.
pub const FALLBACK_LINES: [&str; 7] = [
    "你好，很高兴认识你。",
    "今天天气真不错，不是吗？",
    "最近过得怎么样？",
    "我最近在思考一些人生问题。",
    "有时候我觉得生活充满了惊喜。",
    "能和你聊天很开心。",
    "我们下次再聊吧。",
];

/// The fallback line for turn `turn_index`.
pub fn fallback_line(turn_index: usize) -> &'static str {
    FALLBACK_LINES[turn_index % FALLBACK_LINES.len()]
}

/// A minimal persona used when synthesis fails.
pub fn fallback_persona(name: Option<&str>) -> String {
    let name = name.unwrap_or(DEFAULT_CHARACTER_NAME);
    format!(
        "角色名称：{name}\n\
         年龄：30岁\n\
         性别：未知\n\
         外貌特征：普通外表\n\
         性格特点：平和、友善\n\
         说话风格：平实、客观\n\
         背景故事：普通人的生活经历\n\
         行为方式：正常社交行为"
    )
}

/// Substitutes a fallback value for a failed generation.
pub trait FallbackExt<T> {
    /// The success value, or `fallback()` after logging the failure.
    /// `what` names the operation in the log line.
    fn or_fallback(self, what: &str, fallback: impl FnOnce() -> T) -> T;
}

impl<T> FallbackExt<T> for RolecastResult<T> {
    fn or_fallback(self, what: &str, fallback: impl FnOnce() -> T) -> T {
        match self {
            Ok(value) => value,
            Err(e) if e.is_generation_failure() => {
                warn!(what, error = %e, "Generation failed, using fallback");
                fallback()
            }
            Err(e) => {
                error!(what, error = %e, "Unexpected failure during generation, using fallback");
                fallback()
            }
        }
    }
}
