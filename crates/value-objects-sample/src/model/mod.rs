//! Customer records and the value objects they carry.

pub mod address;
pub mod customer;
pub mod payment;
pub mod tag;

pub use address::Address;
pub use customer::{customer_class, customer_config, customer_registry, COLUMNS, CUSTOMER};
pub use payment::{payment_class, CardPayment, InvoicePayment, PAYMENT_METHOD};
pub use tag::{tag_list, Tag};
