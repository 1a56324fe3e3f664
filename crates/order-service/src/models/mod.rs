//! 订单领域模型

mod checkout;
mod pricing;
mod status;
mod voucher;

pub use checkout::{AddressSnapshot, CartLine, checkout_subtotal};
pub use pricing::{OrderTotals, ShippingPolicy};
pub use status::{OrderStatus, PaymentMethod};
pub use voucher::{DiscountType, Voucher, VoucherRejection};
