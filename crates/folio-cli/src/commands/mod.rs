pub mod comments;
pub mod history;
pub mod page;
pub mod serve;
