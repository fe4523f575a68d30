//! 心情枚举（封闭集合）
//!
//! 远端服务对 mood 字段大小写敏感，规范形式统一为小写。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::query::ValidationError;

/// 用户可选的心情，线上传输使用小写形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Energetic,
    Relaxed,
    Hungry,
}

impl Mood {
    /// 心情网格的展示顺序
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Energetic,
        Mood::Relaxed,
        Mood::Hungry,
    ];

    /// 规范（小写）令牌，即请求体中的 mood 值
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Energetic => "energetic",
            Mood::Relaxed => "relaxed",
            Mood::Hungry => "hungry",
        }
    }

    /// 界面展示用标签
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Energetic => "Energetic",
            Mood::Relaxed => "Relaxed",
            Mood::Hungry => "Hungry",
        }
    }

    /// 大小写不敏感地匹配令牌（忽略首尾空白）
    pub fn parse(token: &str) -> Option<Mood> {
        let token = token.trim();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::parse(s).ok_or_else(|| ValidationError::UnknownMood(s.to_string()))
    }
}
