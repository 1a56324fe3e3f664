//! user-service DTO 模块
//!
//! 包含所有请求和响应的数据传输对象

pub mod request;
pub mod response;

pub use easybuy_shared::response::{ApiResponse, PageResponse, PaginationParams};

pub use request::{
    AddProductImageRequest, AddToCartRequest, AddToWishlistRequest, AddressRequest,
    ChangePasswordRequest, CreateProductRequest, CreateReviewRequest, ForgotPasswordRequest,
    LoginRequest, ModerateReviewRequest, NotificationFilter, ProductQuery, RegisterRequest,
    ResetPasswordRequest, SendNotificationRequest, SendPhoneOtpRequest, UpdateCartItemRequest,
    UpdateProductRequest, UpdateProfileRequest, VerifyPhoneRequest,
};

pub use response::{
    AddressDto, BrandDto, CartDto, CartItemDto, CategoryDto, LoginResponse,
    NotificationDto, NotificationListDto, OtpIssuedResponse, ProductDetailDto, ProductImageDto,
    ProductListItemDto, RatingSummary, ReviewDto, UpdatedCountDto, UserDto, WishlistItemDto,
};
