/// Database models
///
/// All relational records and their CRUD operations, one module per
/// aggregate:
///
/// - `user`: platform accounts and authentication state
/// - `organizer`: tenant records with slug derivation
/// - `member`: user-organizer memberships with roles
/// - `event`: events and their ticket types
/// - `order`: orders, order items, and payments
/// - `ticket`: issued tickets and gate check-ins
/// - `payout`: organizer settlements
/// - `promo_code`: discount codes
pub mod event;
pub mod member;
pub mod order;
pub mod organizer;
pub mod payout;
pub mod promo_code;
pub mod ticket;
pub mod user;
