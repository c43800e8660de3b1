pub mod todo;
pub mod user;

pub use todo::{NewTodo, Todo, TodoInput, TodoStatus};
pub use user::{NewUser, User, UserInput};
