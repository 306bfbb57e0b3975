pub mod configure;
pub mod init;
pub mod login;
