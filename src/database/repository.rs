pub mod games_repository;
pub mod reviews_repository;

use serde::{Deserialize, Serialize};

/// 某个取值及其记录数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCount {
    pub name: String,
    pub count: u64,
}

/// `part` 占 `total` 的百分比（四舍五入取整），`total` 为 0 时返回 0
pub fn percentage(part: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

/// 将分组后的 `(value, count)` 行转换为分布，
/// 按数量降序、名称升序排列
pub(crate) fn into_distribution(rows: Vec<(String, i64)>) -> Vec<NameCount> {
    let mut counts: Vec<NameCount> = rows
        .into_iter()
        .map(|(name, count)| NameCount {
            name,
            count: count.max(0) as u64,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}
