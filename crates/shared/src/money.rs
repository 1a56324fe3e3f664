//! 金额序列化
//!
//! 数据库 NUMERIC 解码后的小数位不固定（零值会丢失小数位），
//! 响应中的金额统一输出为两位小数的字符串

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

/// 金额保留的小数位
pub const MONEY_SCALE: u32 = 2;

/// 规整为两位小数
pub fn normalize(amount: Decimal) -> Decimal {
    let mut value = amount.round_dp(MONEY_SCALE);
    value.rescale(MONEY_SCALE);
    value
}

/// `#[serde(serialize_with = "easybuy_shared::money::serialize")]`
pub fn serialize<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    normalize(*amount).to_string().serialize(serializer)
}

/// 可选金额，`None` 输出为 null
pub fn serialize_option<S>(amount: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    amount
        .map(|value| normalize(value).to_string())
        .serialize(serializer)
}
