pub mod grade;
pub mod init;
pub mod show;
pub mod speech;
pub mod validate;
