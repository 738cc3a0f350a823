mod tests_api;
