pub mod group_orders;

pub use group_orders::GroupOrderService;
