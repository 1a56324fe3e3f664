//! order-service DTO 模块

pub mod request;
pub mod response;

pub use easybuy_shared::response::{ApiResponse, PageResponse, PaginationParams};

pub use request::{
    CreateVoucherRequest, OrderFilter, PlaceOrderRequest, UpdateOrderStatusRequest,
    UpdateVoucherRequest, ValidateVoucherRequest, normalize_code,
};
pub use response::{
    OrderDetailDto, OrderItemDto, OrderSummaryDto, VoucherDto, VoucherPreviewDto,
};
