mod tests_concurrency;
mod tests_grammar;
mod tests_incremental;
mod tests_lexer;
mod tests_properties;
mod tests_recovery;
