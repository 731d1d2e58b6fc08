pub mod task;
pub mod timestamp;
pub mod user;

pub use task::{DeleteTaskRequest, NewTask, Task, TaskSnapshot, DEFAULT_HEX_COLOR};
pub use timestamp::ClientTimestamp;
pub use user::User;
