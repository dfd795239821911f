//! Section commands

mod add;
mod delete;
mod mv;
mod update;

pub use add::AddSection;
pub use delete::DeleteSection;
pub use mv::MoveSection;
pub use update::UpdateSection;
