mod dispatcher_tests;
mod support;
