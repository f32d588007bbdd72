pub mod accept;
pub mod curl_parser;
pub mod file_size;
pub mod folder;
