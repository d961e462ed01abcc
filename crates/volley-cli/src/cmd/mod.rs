pub mod console;
pub mod history;
pub mod init;
pub mod inject;
pub mod light;
pub mod status;
