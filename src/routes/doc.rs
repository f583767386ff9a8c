use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLineView, CartList, CartState, SetQuantityRequest},
        catalog::{CreateEventRequest, CreateServiceRequest, EventList, ServiceList},
        chat::{ChatReply, ChatRequest, ReplySource, Transcript},
        orders::{OrderList, OrderWithLines},
        profile::{UpdateEmailRequest, UpdatePasswordRequest, UpdateProfileRequest},
    },
    middleware::auth::Role,
    models::{CartLine, ChatMessage, ChatRole, Event, Order, OrderLine, Profile, Service},
    notify::{Notification, Variant},
    response::{ApiResponse, Meta},
    routes::{auth, cart, chat, events, health, notifications, orders, params, profile, services},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        profile::get_profile,
        profile::update_profile,
        profile::update_email,
        profile::update_password,
        events::list_events,
        events::create_event,
        events::delete_event,
        events::stream_events,
        services::list_services,
        services::create_service,
        services::delete_service,
        services::stream_services,
        cart::cart_list,
        cart::add_to_cart,
        cart::set_quantity,
        cart::remove_from_cart,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        chat::send_message,
        chat::history,
        chat::reset,
        notifications::stream_notifications
    ),
    components(
        schemas(
            Role,
            Profile,
            Event,
            Service,
            CartLine,
            Order,
            OrderLine,
            ChatRole,
            ChatMessage,
            Notification,
            Variant,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateProfileRequest,
            UpdateEmailRequest,
            UpdatePasswordRequest,
            CreateEventRequest,
            CreateServiceRequest,
            EventList,
            ServiceList,
            AddToCartRequest,
            SetQuantityRequest,
            CartState,
            CartLineView,
            CartList,
            OrderList,
            OrderWithLines,
            ChatRequest,
            ChatReply,
            ReplySource,
            Transcript,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<Profile>,
            ApiResponse<Event>,
            ApiResponse<Service>,
            ApiResponse<CartList>,
            ApiResponse<OrderWithLines>,
            ApiResponse<OrderList>,
            ApiResponse<ChatReply>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration and login"),
        (name = "Profile", description = "Profile settings"),
        (name = "Events", description = "Local events"),
        (name = "Services", description = "Local services"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Chat", description = "Chat assistant"),
        (name = "Notifications", description = "User notifications"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
