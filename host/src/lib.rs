pub mod demo;
pub mod dump;
pub mod init;
pub mod load;
