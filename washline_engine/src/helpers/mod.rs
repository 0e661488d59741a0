mod order_ids;

pub use order_ids::generate_order_id;
