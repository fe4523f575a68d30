//! 查询规范化层：坐标范围校验、心情枚举与规范大小写
//!
//! 纯函数，无状态；任何非法输入都在发起网络请求之前被拒绝。

pub mod mood;
pub mod normalizer;

pub use mood::Mood;
pub use normalizer::{normalize, CoordinateField, Query, RawQuery, ValidationError};
