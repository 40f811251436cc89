pub mod disbursement;
pub mod order;
pub mod product;
pub mod setting;
pub mod user;
pub mod warehouse;

pub use disbursement::{Disbursement, DisbursementItem, DisbursementStatus};
pub use order::{Order, OrderItem, OrderStatus, ShippingAddress};
pub use product::{Category, Product, ProductFilter};
pub use setting::{HomeLayoutSection, SectionConfig, SiteTheme};
pub use user::{Role, User};
pub use warehouse::Warehouse;
