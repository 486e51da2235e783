pub mod cat;
pub mod find;
pub mod get;
pub mod list;
pub mod mkdir;
pub mod put;
pub mod rm;
pub mod stat;

pub use cat::CatCommand;
pub use find::FindCommand;
pub use get::GetCommand;
pub use list::ListCommand;
pub use mkdir::MkdirCommand;
pub use put::PutCommand;
pub use rm::RmCommand;
pub use stat::StatCommand;
