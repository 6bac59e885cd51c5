mod chat_session_port;
mod image_fetch_port;
mod link_opener_port;
mod settings_port;

pub use chat_session_port::{ChatSessionPort, FetchMessagesOptions, MAX_PAGE_SIZE};
pub use image_fetch_port::{FetchedImage, ImageFetchPort};
pub use link_opener_port::LinkOpenerPort;
pub use settings_port::SettingsPort;
