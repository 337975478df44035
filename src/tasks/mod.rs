pub mod acquisition;
