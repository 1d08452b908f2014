mod auth;
mod dashboard;
mod files;
mod subjects;
mod types;
mod uploads;

pub use auth::LOGIN_PATH;
pub use dashboard::dashboard;
pub use files::delete_file;
pub use subjects::{
    add_subject, add_subject_page, delete_subject, rename_subject, rename_subject_page,
};
pub use types::FlashQuery;
pub use uploads::{process_upload, upload_page};
