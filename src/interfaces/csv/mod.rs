pub mod module_reader;
pub mod module_writer;
