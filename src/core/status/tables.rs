//! Built-in status vocabularies
//!
//! Source tables map a marketplace's raw status to a canonical status name.
//! The general table lists, per canonical status, the raw aliases recognized
//! from any marketplace. Names are checked when the mapping is built.

/// Raw aliases per canonical status, in canonical declaration order
pub const GENERAL_ALIASES: &[(&str, &[&str])] = &[
    ("pending", &["pending", "pendiente", "created", "acknowledged"]),
    (
        "ready_to_ship",
        &["ready_to_ship", "lista para despacho", "handling"],
    ),
    // "shipped" also appears under in_transit; the earlier entry wins.
    ("dispatched", &["shipped", "enviado", "en tránsito"]),
    ("in_transit", &["shipped", "en tránsito", "transit", "in_transit"]),
    ("out_for_delivery", &["out_for_delivery", "en reparto"]),
    ("delivered", &["delivered", "entregada", "entregado"]),
    (
        "delivery_failed",
        &["not_delivered", "failed_delivery", "excepción", "delivery_failed"],
    ),
    ("cancelled", &["cancelled", "canceled", "cancelada", "cancelado"]),
    ("returned", &["returned", "devuelto"]),
];

/// Marketplace-specific raw → canonical tables
pub const SOURCE_TABLES: &[(&str, &[(&str, &str)])] = &[
    (
        "meli",
        &[
            ("pending", "pending"),
            ("handling", "ready_to_ship"),
            ("ready_to_ship", "ready_to_ship"),
            ("shipped", "dispatched"),
            ("delivered", "delivered"),
            ("not_delivered", "delivery_failed"),
            ("cancelled", "cancelled"),
        ],
    ),
    (
        "fala",
        &[
            ("pending", "pending"),
            ("ready_to_ship", "ready_to_ship"),
            ("shipped", "dispatched"),
            ("delivered", "delivered"),
            ("canceled", "cancelled"),
            ("returned", "returned"),
        ],
    ),
    (
        "walm",
        &[
            ("created", "pending"),
            ("acknowledged", "ready_to_ship"),
            ("shipped", "dispatched"),
            ("delivered", "delivered"),
            ("cancelled", "cancelled"),
        ],
    ),
    (
        "cenc",
        &[
            ("pendiente", "pending"),
            ("lista para despacho", "ready_to_ship"),
            ("enviado", "dispatched"),
            ("en tránsito", "in_transit"),
            ("entregada", "delivered"),
            ("entregado", "delivered"),
            ("cancelada", "cancelled"),
            ("cancelado", "cancelled"),
            ("devuelto", "returned"),
        ],
    ),
];
