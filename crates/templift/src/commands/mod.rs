pub mod init;
pub mod upgrade;
