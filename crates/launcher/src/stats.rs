//! 数据库诊断统计

use anyhow::Result;
use sqlx::PgPool;

/// 统计行数的表，按业务分组排列
pub const TABLES: &[&str] = &[
    "users",
    "password_reset_tokens",
    "otp_verifications",
    "categories",
    "brands",
    "products",
    "product_images",
    "product_reviews",
    "cart_items",
    "wishlist",
    "user_addresses",
    "notifications",
    "vouchers",
    "orders",
    "order_items",
];

#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub tables: Vec<(&'static str, i64)>,
    pub orders_by_status: Vec<(String, i64)>,
}

pub async fn collect(pool: &PgPool) -> Result<DatabaseStats> {
    let mut tables = Vec::with_capacity(TABLES.len());
    for &table in TABLES {
        // 表名来自上面的常量列表
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await?;
        tables.push((table, count));
    }

    let orders_by_status = sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM orders GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await?;

    Ok(DatabaseStats {
        tables,
        orders_by_status,
    })
}

/// 渲染为文本表格
pub fn render(stats: &DatabaseStats) -> String {
    let width = TABLES.iter().map(|t| t.len()).max().unwrap_or(0);
    let mut out = String::new();

    out.push_str(&format!("{:<width$}  {:>8}\n", "table", "rows"));
    out.push_str(&format!("{}\n", "-".repeat(width + 10)));
    for (table, count) in &stats.tables {
        out.push_str(&format!("{:<width$}  {:>8}\n", table, count));
    }

    if !stats.orders_by_status.is_empty() {
        out.push_str("\norders by status\n");
        for (status, count) in &stats.orders_by_status {
            out.push_str(&format!("  {:<12}{:>8}\n", status, count));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_columns() {
        let stats = DatabaseStats {
            tables: vec![("users", 3), ("password_reset_tokens", 12)],
            orders_by_status: vec![("pending".to_string(), 2)],
        };
        let text = render(&stats);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("table"));
        assert_eq!(lines[2].len(), lines[3].len());
        assert!(text.contains("pending"));
    }

    #[test]
    fn test_render_skips_empty_status_section() {
        let stats = DatabaseStats {
            tables: vec![("orders", 0)],
            orders_by_status: Vec::new(),
        };
        assert!(!render(&stats).contains("orders by status"));
    }
}
