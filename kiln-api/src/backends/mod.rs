pub mod soft;
