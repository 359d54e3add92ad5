mod common;
mod package_store_tests;
