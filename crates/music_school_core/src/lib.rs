pub mod catalog;
pub mod domain;
pub mod enrollment;
pub mod error;
pub mod memory;
pub mod navigation;
pub mod notifications;
pub mod ports;
pub mod progress;
pub mod users;

pub use domain::{
    AuthSession, Comment, Course, EmailMessage, Enrollment, Instrument, Lesson, LessonId,
    Notification, ProgressRecord, Role, Session, User, UserCredentials,
};
pub use error::{CoreError, CoreResult};
pub use memory::InMemoryDatabase;
pub use ports::{DatabaseService, EmailRelayService, PortError, PortResult, RelayError};
