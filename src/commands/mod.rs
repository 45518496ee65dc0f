mod batch;
pub mod decode;
pub mod evaluate;
pub mod init;
