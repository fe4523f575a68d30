//! 线上格式：请求体序列化与宽松的响应解码
//!
//! 请求体：`{latitude, longitude, mood}`（mood 为小写），饮食限制非空时追加 `dietary_restrictions`。
//! 成功响应：取 `recommendations` 数组；字段缺失、不是数组、或整个响应体不是 JSON 时一律视为空列表。
//! 失败响应：优先 `message`，其次 FastAPI 风格的 `detail`，都没有时使用兜底文案。

use serde::Serialize;
use serde_json::Value;

use crate::core::{RecommendationItem, DEFAULT_SERVER_MESSAGE};
use crate::query::Query;

/// POST 请求体
#[derive(Debug, Serialize)]
pub struct RecommendationRequest<'a> {
    pub latitude: f64,
    pub longitude: f64,
    pub mood: &'static str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub dietary_restrictions: &'a [String],
}

impl<'a> From<&'a Query> for RecommendationRequest<'a> {
    fn from(query: &'a Query) -> Self {
        Self {
            latitude: query.latitude(),
            longitude: query.longitude(),
            mood: query.mood().as_str(),
            dietary_restrictions: query.dietary_restrictions(),
        }
    }
}

/// 解码成功响应体；任何形状问题都退化为空列表而不是报错
pub fn decode_recommendations(body: &[u8]) -> Vec<RecommendationItem> {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(error = %e, "success body is not JSON, treating as empty list");
            return Vec::new();
        }
    };
    let Some(entries) = value.get("recommendations").and_then(Value::as_array) else {
        tracing::debug!("recommendations field missing or not a list, treating as empty list");
        return Vec::new();
    };

    let mut items: Vec<RecommendationItem> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match decode_item(entry) {
            Some(item) if items.iter().any(|seen| seen.id == item.id) => {
                tracing::warn!(index, id = %item.id, "duplicate recommendation id skipped");
            }
            Some(item) => items.push(item),
            None => tracing::warn!(index, "malformed recommendation entry skipped"),
        }
    }
    items
}

/// 单条推荐：必须是带 id 的对象（数字 id 转为字符串），name/description 缺失时为空串
fn decode_item(entry: &Value) -> Option<RecommendationItem> {
    let obj = entry.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(RecommendationItem {
        id,
        name: text("name"),
        description: text("description"),
    })
}

/// 从非 2xx 响应体提取面向用户的错误文案
pub fn extract_error_message(body: &[u8]) -> String {
    let value: Option<Value> = serde_json::from_slice(body).ok();
    ["message", "detail"]
        .iter()
        .find_map(|key| {
            value
                .as_ref()?
                .get(*key)?
                .as_str()
                .filter(|s| !s.is_empty())
                .map(String::from)
        })
        .unwrap_or_else(|| DEFAULT_SERVER_MESSAGE.to_string())
}
