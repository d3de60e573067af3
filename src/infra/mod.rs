// Concrete HTTP-backed collaborators for the pipeline ports

pub mod html_source;
pub mod http_client;
pub mod tracker_client;
