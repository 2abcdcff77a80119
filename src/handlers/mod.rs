mod auth;
mod samples;
mod history;
mod workspace;

pub use auth::{handle_register, handle_login, handle_logout, directory_usage, serve_profile};
pub use samples::{
    list_samples, upload_samples, clear_samples, select_all_samples, delete_selected_samples,
    toggle_sample, delete_sample, crop_sample, analyze_samples,
};
pub use history::{list_history, get_record, get_record_image, delete_records, clear_history};
