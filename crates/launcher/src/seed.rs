//! 演示数据
//!
//! 所有写入都以唯一键或存在性检查保护，重复执行不会产生重复数据。

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use easybuy_shared::auth::{ROLE_ADMIN, ROLE_CUSTOMER, hash_password};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;

pub const DEMO_CUSTOMER_EMAIL: &str = "test@example.com";
pub const DEMO_CUSTOMER_PASSWORD: &str = "123456";
pub const DEMO_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";

const CATEGORIES: &[(&str, &str)] = &[
    ("Smartphones", "smartphones"),
    ("Laptops", "laptops"),
    ("Accessories", "accessories"),
];

const BRANDS: &[&str] = &["Apple", "Samsung", "Xiaomi", "Dell"];

struct DemoProduct {
    name: &'static str,
    description: &'static str,
    price: &'static str,
    stock: i32,
    category: &'static str,
    brand: &'static str,
    images: &'static [&'static str],
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "iPhone 15 128GB",
        description: "6.1-inch display, A16 Bionic chip",
        price: "19990000.00",
        stock: 25,
        category: "Smartphones",
        brand: "Apple",
        images: &[
            "https://cdn.easybuy.local/products/iphone-15-front.jpg",
            "https://cdn.easybuy.local/products/iphone-15-back.jpg",
        ],
    },
    DemoProduct {
        name: "Samsung Galaxy S24",
        description: "6.2-inch Dynamic AMOLED, 8GB RAM",
        price: "18490000.00",
        stock: 30,
        category: "Smartphones",
        brand: "Samsung",
        images: &["https://cdn.easybuy.local/products/galaxy-s24.jpg"],
    },
    DemoProduct {
        name: "Redmi Note 13",
        description: "6.67-inch AMOLED, 108MP camera",
        price: "4890000.00",
        stock: 60,
        category: "Smartphones",
        brand: "Xiaomi",
        images: &["https://cdn.easybuy.local/products/redmi-note-13.jpg"],
    },
    DemoProduct {
        name: "MacBook Air M3 13-inch",
        description: "8-core CPU, 16GB unified memory, 256GB SSD",
        price: "27990000.00",
        stock: 12,
        category: "Laptops",
        brand: "Apple",
        images: &["https://cdn.easybuy.local/products/macbook-air-m3.jpg"],
    },
    DemoProduct {
        name: "Dell XPS 13",
        description: "Intel Core Ultra 7, 16GB RAM, 512GB SSD",
        price: "32490000.00",
        stock: 8,
        category: "Laptops",
        brand: "Dell",
        images: &["https://cdn.easybuy.local/products/dell-xps-13.jpg"],
    },
    DemoProduct {
        name: "USB-C Fast Charger 20W",
        description: "Compact power adapter",
        price: "390000.00",
        stock: 200,
        category: "Accessories",
        brand: "Apple",
        images: &[],
    },
    DemoProduct {
        name: "Xiaomi Power Bank 10000mAh",
        description: "22.5W fast charging",
        price: "450000.00",
        stock: 150,
        category: "Accessories",
        brand: "Xiaomi",
        images: &["https://cdn.easybuy.local/products/mi-power-bank.jpg"],
    },
];

struct DemoVoucher {
    code: &'static str,
    description: &'static str,
    discount_type: &'static str,
    value: &'static str,
    min_order: &'static str,
    max_discount: Option<&'static str>,
    usage_limit: Option<i32>,
}

const VOUCHERS: &[DemoVoucher] = &[
    DemoVoucher {
        code: "WELCOME10",
        description: "10% off your order, up to 100,000",
        discount_type: "percentage",
        value: "10",
        min_order: "0",
        max_discount: Some("100000"),
        usage_limit: None,
    },
    DemoVoucher {
        code: "SAVE50K",
        description: "50,000 off orders from 300,000",
        discount_type: "fixed",
        value: "50000",
        min_order: "300000",
        max_discount: None,
        usage_limit: Some(100),
    },
];

/// 本次实际新增的行数
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: u64,
    pub brands: u64,
    pub products: u64,
    pub images: u64,
    pub users: u64,
    pub addresses: u64,
    pub vouchers: u64,
}

impl SeedReport {
    pub fn total(&self) -> u64 {
        self.categories
            + self.brands
            + self.products
            + self.images
            + self.users
            + self.addresses
            + self.vouchers
    }
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "categories={} brands={} products={} images={} users={} addresses={} vouchers={}",
            self.categories,
            self.brands,
            self.products,
            self.images,
            self.users,
            self.addresses,
            self.vouchers
        )
    }
}

fn money(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).with_context(|| format!("非法金额: {}", value))
}

/// 在单个事务中写入全部演示数据
pub async fn run(pool: &PgPool) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut tx = pool.begin().await?;

    for &(name, slug) in CATEGORIES {
        report.categories += sqlx::query(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(slug)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    for &name in BRANDS {
        report.brands += sqlx::query("INSERT INTO brands (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    for product in PRODUCTS {
        seed_product(&mut tx, product, &mut report).await?;
    }

    let customer_id = seed_user(
        &mut tx,
        DEMO_CUSTOMER_EMAIL,
        DEMO_CUSTOMER_PASSWORD,
        "Nguyen Van Test",
        ROLE_CUSTOMER,
        &mut report,
    )
    .await?;
    seed_user(
        &mut tx,
        DEMO_ADMIN_EMAIL,
        DEMO_ADMIN_PASSWORD,
        "EasyBuy Admin",
        ROLE_ADMIN,
        &mut report,
    )
    .await?;

    report.addresses += seed_addresses(&mut tx, customer_id).await?;

    let now = Utc::now();
    for v in VOUCHERS {
        let max_discount = v.max_discount.map(money).transpose()?;
        report.vouchers += sqlx::query(
            r#"
            INSERT INTO vouchers (code, description, discount_type, discount_value, min_order_value,
                                  max_discount, usage_limit, starts_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(v.code)
        .bind(v.description)
        .bind(v.discount_type)
        .bind(money(v.value)?)
        .bind(money(v.min_order)?)
        .bind(max_discount)
        .bind(v.usage_limit)
        .bind(now - Duration::days(1))
        .bind(now + Duration::days(365))
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;

    info!(%report, "Seed completed");
    Ok(report)
}

async fn seed_product(tx: &mut PgConnection, product: &DemoProduct, report: &mut SeedReport) -> Result<()> {
    let inserted: Option<(i64,)> = sqlx::query_as(
        r#"
        INSERT INTO products (name, description, price, stock, category_id, brand_id)
        SELECT $1, $2, $3, $4,
               (SELECT id FROM categories WHERE name = $5),
               (SELECT id FROM brands WHERE name = $6)
        WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)
        RETURNING id
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(money(product.price)?)
    .bind(product.stock)
    .bind(product.category)
    .bind(product.brand)
    .fetch_optional(&mut *tx)
    .await?;

    // 已存在的商品不补图
    let Some((product_id,)) = inserted else {
        return Ok(());
    };
    report.products += 1;

    for (index, url) in product.images.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO product_images (product_id, image_url, sort_order, is_primary)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product_id)
        .bind(*url)
        .bind(index as i32)
        .bind(index == 0)
        .execute(&mut *tx)
        .await?;
        report.images += 1;
    }

    Ok(())
}

/// 创建用户并返回 ID；已存在时直接返回已有 ID，不覆盖密码
async fn seed_user(
    tx: &mut PgConnection,
    email: &str,
    password: &str,
    full_name: &str,
    role: &str,
    report: &mut SeedReport,
) -> Result<i64> {
    if let Some((id,)) = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?
    {
        return Ok(id);
    }

    let password_hash = hash_password(password)?;
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .bind(role)
    .fetch_one(&mut *tx)
    .await?;

    report.users += 1;
    Ok(id)
}

/// 用户还没有地址时写入两条，第一条为默认地址
async fn seed_addresses(tx: &mut PgConnection, user_id: i64) -> Result<u64> {
    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_addresses WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        return Ok(0);
    }

    let result = sqlx::query(
        r#"
        INSERT INTO user_addresses
            (user_id, recipient_name, phone, address_line, ward, district, city, is_default)
        VALUES
            ($1, 'Nguyen Van Test', '0901234567', '123 Nguyen Hue', 'Ben Nghe', 'District 1', 'Ho Chi Minh City', TRUE),
            ($1, 'Nguyen Van Test', '0901234567', '45 Hang Bai', 'Hang Bai', 'Hoan Kiem', 'Ha Noi', FALSE)
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_prices_parse() {
        for product in PRODUCTS {
            assert!(money(product.price).is_ok(), "{}", product.name);
        }
        for v in VOUCHERS {
            assert!(money(v.value).is_ok());
            assert!(money(v.min_order).is_ok());
        }
    }

    #[test]
    fn test_products_reference_known_catalog() {
        let categories: HashSet<_> = CATEGORIES.iter().map(|(name, _)| *name).collect();
        let brands: HashSet<_> = BRANDS.iter().copied().collect();
        for product in PRODUCTS {
            assert!(categories.contains(product.category), "{}", product.name);
            assert!(brands.contains(product.brand), "{}", product.name);
        }
    }

    #[test]
    fn test_voucher_codes_are_uppercase() {
        for v in VOUCHERS {
            assert_eq!(v.code, v.code.to_uppercase());
        }
    }

    #[test]
    fn test_report_display() {
        let report = SeedReport {
            products: 2,
            users: 1,
            ..Default::default()
        };
        assert_eq!(report.total(), 3);
        assert!(report.to_string().contains("products=2"));
    }
}
