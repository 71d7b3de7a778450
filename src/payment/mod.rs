pub mod record;

pub use record::PaymentRecord;
