mod context_tests;
mod integration_tests;
