mod console_tests;
mod controller_tests;
