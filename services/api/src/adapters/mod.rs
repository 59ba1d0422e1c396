pub mod db;
pub mod relay;

pub use db::DbAdapter;
pub use relay::HttpRelayAdapter;
