pub mod serial_link;
pub mod writer_link;
