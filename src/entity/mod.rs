pub mod audit_logs;
pub mod cart_lines;
pub mod events;
pub mod order_lines;
pub mod orders;
pub mod services;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_lines::Entity as CartLines;
pub use events::Entity as Events;
pub use order_lines::Entity as OrderLines;
pub use orders::Entity as Orders;
pub use services::Entity as Services;
pub use users::Entity as Users;
