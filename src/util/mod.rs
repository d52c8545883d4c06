pub use self::equal_reader::EqualReader;

mod equal_reader;
